//! Stream event protocol for sift chat responses.
//!
//! One crate, two concerns: the closed [`ChatEvent`] union (every event kind a
//! client can receive, with its payload) and the SSE line encoding used on the
//! wire ([`write_sse_line`]). Event order on a stream is append-only: events
//! are never revised or retracted after emission.

mod event;
mod sse;

pub use event::{ChatEvent, SearchResult};
pub use sse::write_sse_line;
