//! Scripted LLM for tests: replays canned responses in call order.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{LlmClient, MessageChunk};
use crate::error::ChatError;

/// Mock [`LlmClient`]: each `generate` call pops the next scripted response;
/// when the script runs out, the fallback text is returned. Streaming sends
/// the full content as a single chunk, matching the minimal contract.
pub struct MockLlm {
    responses: Mutex<VecDeque<String>>,
    fallback: String,
}

impl MockLlm {
    /// Replays `responses` in order, then the empty string.
    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            fallback: String::new(),
        }
    }

    /// Returns the same text for every call.
    pub fn always(text: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            fallback: text.into(),
        }
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn generate(
        &self,
        _prompt: &str,
        _model: &str,
        chunk_tx: Option<mpsc::Sender<MessageChunk>>,
    ) -> Result<String, ChatError> {
        let text = self
            .responses
            .lock()
            .map_err(|_| ChatError::Llm("mock script lock poisoned".to_string()))?
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        if let Some(tx) = chunk_tx {
            if !text.is_empty() {
                let _ = tx
                    .send(MessageChunk {
                        text: text.clone(),
                    })
                    .await;
            }
        }
        Ok(text)
    }
}
