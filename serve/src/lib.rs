//! HTTP server for sift chat (axum + SSE).
//!
//! `POST /chat` streams chat events as `text/event-stream`; `GET /` is a
//! health probe. Model aliases are resolved (and unsupported ones rejected
//! with 400) before any orchestration starts.
//!
//! **Public API**: [`run_serve`], [`run_serve_on_listener`], [`router`],
//! [`AppState`], [`ChatRequest`].

mod app;
mod request;

pub use app::{router, AppState};
pub use request::ChatRequest;

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

const DEFAULT_ADDR: &str = "127.0.0.1:8000";

/// Runs the server on an existing listener. Used by tests (bind to
/// 127.0.0.1:0, then pass the listener in).
pub async fn run_serve_on_listener(
    listener: TcpListener,
    state: Arc<AppState>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr = listener.local_addr()?;
    info!("chat server listening on http://{}", addr);
    let app = router(state);
    axum::serve(listener, app).await?;
    Ok(())
}

/// Binds `addr` (default 127.0.0.1:8000) and serves until the process exits.
pub async fn run_serve(
    addr: Option<&str>,
    state: Arc<AppState>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr = addr.unwrap_or(DEFAULT_ADDR);
    let listener = TcpListener::bind(addr).await?;
    run_serve_on_listener(listener, state).await
}
