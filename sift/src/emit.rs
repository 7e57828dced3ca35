//! Ordered event emission toward the transport.

use tokio::sync::mpsc;

use sift_event::ChatEvent;

use crate::error::ChatError;

/// Sends chat events to the transport in emission order.
///
/// The channel is bounded and every emit awaits the send, so an event is
/// handed to the transport before any further work runs; this is the flush-ordering
/// guarantee the client-visible log depends on. A closed channel means the
/// client disconnected; that surfaces as [`ChatError::StreamClosed`] and
/// stops the pipeline at its next emission.
#[derive(Clone)]
pub struct EventEmitter {
    tx: mpsc::Sender<ChatEvent>,
}

impl EventEmitter {
    pub fn new(tx: mpsc::Sender<ChatEvent>) -> Self {
        Self { tx }
    }

    /// Creates an emitter plus the receiving half, with a bounded queue.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<ChatEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }

    pub async fn emit(&self, event: ChatEvent) -> Result<(), ChatError> {
        self.tx
            .send(event)
            .await
            .map_err(|_| ChatError::StreamClosed)
    }
}
