//! Chat stream event kinds (event + data payload).
//!
//! Wire shape is `{"event": <kind>, "data": {...}}`; kinds are kebab-case.
//! The enum is closed: emitters and consumers match exhaustively, so adding a
//! kind is a compile-visible change on both sides.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One text search hit: title, url, and summary text.
///
/// `url` is the dedup key wherever hits from different searches are merged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub content: String,
}

impl SearchResult {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            content: content.into(),
        }
    }
}

/// One chat stream event.
///
/// Emitted in strict temporal order over the lifetime of a request:
/// `BeginStream` first, then (expert mode) the plan and per-step progress
/// events, then the streamed answer, then `StreamEnd`. `Error` may replace
/// the tail of the sequence but never appears after `StreamEnd`.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ChatEvent {
    BeginStream {
        event_type: String,
        query: String,
    },
    AgentQueryPlan {
        steps: Vec<String>,
    },
    AgentSearchQueries {
        step_number: u32,
        queries: Vec<String>,
    },
    AgentReadResults {
        step_number: u32,
        results: Vec<SearchResult>,
    },
    SearchResults {
        results: Vec<SearchResult>,
        images: Vec<String>,
    },
    TextChunk {
        text: String,
    },
    FinalResponse {
        response: String,
    },
    RelatedQueries {
        related_queries: Vec<String>,
    },
    FinalMessage {
        message: String,
    },
    StreamEnd {
        thread_id: Option<i64>,
    },
    Error {
        detail: String,
    },
}

impl ChatEvent {
    /// Builds the opening event. The payload repeats the kind in `event_type`
    /// for clients that only look at the data object.
    pub fn begin_stream(query: impl Into<String>) -> Self {
        Self::BeginStream {
            event_type: "begin-stream".to_string(),
            query: query.into(),
        }
    }

    /// The wire name of this event kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BeginStream { .. } => "begin-stream",
            Self::AgentQueryPlan { .. } => "agent-query-plan",
            Self::AgentSearchQueries { .. } => "agent-search-queries",
            Self::AgentReadResults { .. } => "agent-read-results",
            Self::SearchResults { .. } => "search-results",
            Self::TextChunk { .. } => "text-chunk",
            Self::FinalResponse { .. } => "final-response",
            Self::RelatedQueries { .. } => "related-queries",
            Self::FinalMessage { .. } => "final-message",
            Self::StreamEnd { .. } => "stream-end",
            Self::Error { .. } => "error",
        }
    }

    /// Serializes this event to its `{event, data}` JSON object.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}
