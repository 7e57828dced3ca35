//! Axum app: shared state, router, and the `/chat` SSE handler.

use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;

use sift_event::write_sse_line;

use sift::{
    BasicAgent, ChatTurn, EventEmitter, ExpertAgent, HttpSearchProvider, LlmClient, OpenAiChat,
    SearchClient, Settings,
};

use super::request::ChatRequest;

/// Max events buffered between the agent task and the SSE body. Bounded so a
/// stalled client applies backpressure to the agent instead of growing memory.
const EVENT_QUEUE_CAPACITY: usize = 64;

/// Shared state: the immutable settings plus the injected clients.
///
/// Built once at startup and cloned per request via `Arc`; request handlers
/// never read configuration from the environment.
pub struct AppState {
    pub settings: Settings,
    pub llm: Arc<dyn LlmClient>,
    pub search: SearchClient,
}

impl AppState {
    /// Wires the real clients from settings.
    pub fn from_settings(settings: Settings) -> Self {
        let llm: Arc<dyn LlmClient> = Arc::new(OpenAiChat::new(&settings));
        let provider = Arc::new(HttpSearchProvider::new(&settings));
        let search = SearchClient::new(provider);
        Self {
            settings,
            llm,
            search,
        }
    }

    /// State with caller-supplied clients; used by tests to inject mocks.
    pub fn with_clients(settings: Settings, llm: Arc<dyn LlmClient>, search: SearchClient) -> Self {
        Self {
            settings,
            llm,
            search,
        }
    }
}

/// Routes: health probe at `/`, chat stream at `/chat`.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/chat", post(chat))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// `POST /chat`: resolves the model alias (400 when unsupported), spawns the
/// agent task, and bridges its event channel to the SSE body.
///
/// Client disconnect tears the request down twice over: dropping the body
/// drops the receiver (the agent's next emit fails) and fires the
/// cancellation token (the agent stops at its next phase boundary).
async fn chat(State(state): State<Arc<AppState>>, Json(request): Json<ChatRequest>) -> Response {
    let Some(model) = state.settings.resolve_model(&request.model) else {
        return (
            StatusCode::BAD_REQUEST,
            format!("unsupported model: {}", request.model),
        )
            .into_response();
    };

    let turn = ChatTurn {
        query: request.query,
        history: request.history,
        model: model.to_string(),
        thread_id: request.thread_id,
    };

    let (emitter, rx) = EventEmitter::channel(EVENT_QUEUE_CAPACITY);
    let cancel = CancellationToken::new();
    let guard = cancel.clone().drop_guard();

    let llm = Arc::clone(&state.llm);
    let search = state.search.clone();
    tokio::spawn(async move {
        let result = if request.pro_search {
            ExpertAgent::new(llm, search)
                .with_cancellation(cancel)
                .run(turn, &emitter)
                .await
        } else {
            BasicAgent::new(llm, search)
                .with_cancellation(cancel)
                .run(turn, &emitter)
                .await
        };
        if let Err(e) = result {
            tracing::warn!("chat request ended with error: {e}");
        }
    });

    let stream = ReceiverStream::new(rx).map(move |event| {
        // The guard lives as long as the body; dropping it cancels the agent.
        let _ = &guard;
        Ok::<String, Infallible>(write_sse_line(&event))
    });
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(stream),
    )
        .into_response()
}
