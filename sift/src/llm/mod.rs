//! Text-generation client abstraction.
//!
//! The pipeline depends on one capability: given a prompt and a model id,
//! produce a lazily-delivered sequence of text deltas and the accumulated
//! result. [`OpenAiChat`] talks to an OpenAI-compatible Chat Completions
//! endpoint; [`MockLlm`] replays scripted outputs for tests.
//!
//! # Streaming
//!
//! `generate` accepts an optional `Sender<MessageChunk>`. When it is `Some`,
//! implementations send each delta through the channel as it arrives, in
//! generation order, and still return the full accumulated text at the end.
//! Callers that only need the final text pass `None`.

mod mock;
mod openai;

pub use mock::MockLlm;
pub use openai::OpenAiChat;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::ChatError;

/// One incremental text delta from a streaming completion.
#[derive(Clone, Debug)]
pub struct MessageChunk {
    pub text: String,
}

/// Text-generation client: one prompt in, streamed deltas out.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generates a completion for `prompt` with the given model id.
    ///
    /// When `chunk_tx` is `Some`, each delta is sent through the channel
    /// before the call returns. The returned string is the concatenation of
    /// every delta.
    async fn generate(
        &self,
        prompt: &str,
        model: &str,
        chunk_tx: Option<mpsc::Sender<MessageChunk>>,
    ) -> Result<String, ChatError>;
}
