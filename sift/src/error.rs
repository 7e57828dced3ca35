//! Request-level error taxonomy.

use thiserror::Error;

/// Errors that end a chat request.
///
/// Component-level failures (extraction, search, page fetch) are absorbed
/// into empty results where they happen and never reach this type. What
/// remains: LLM transport faults, the one fatal planning condition, and
/// client-side teardown.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Text-generation transport or protocol failure.
    #[error("llm request failed: {0}")]
    Llm(String),
    /// The planning call produced no usable steps; there is nothing to execute.
    #[error("no research plan could be built from the model output")]
    EmptyPlan,
    /// The event channel closed: the client went away mid-stream.
    #[error("event stream closed by client")]
    StreamClosed,
    /// The request was cancelled before completing.
    #[error("request cancelled")]
    Cancelled,
}
