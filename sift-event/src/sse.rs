//! SSE encoding: one event per `data: <JSON>\n\n` unit.

use crate::event::ChatEvent;

/// Serializes a [`ChatEvent`] to a single SSE unit: `data: <JSON>\n\n`.
///
/// Transports that frame SSE themselves (e.g. axum's `Sse`) should serialize
/// the event and let the framework add the `data:` prefix instead.
pub fn write_sse_line(event: &ChatEvent) -> String {
    let json = serde_json::to_string(event).expect("event serialization is infallible");
    format!("data: {json}\n\n")
}
