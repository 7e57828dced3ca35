//! OpenAI-compatible streaming Chat Completions client.
//!
//! Sends one user message with `stream: true` and reads the SSE response
//! line by line. The terminal sentinel (`data: [DONE]`, also accepted bare as
//! `data: DONE`) ends the delta stream and is never JSON-parsed; data lines
//! that fail to parse as a chunk are skipped rather than failing the call.

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::sync::mpsc;

use super::{LlmClient, MessageChunk};
use crate::error::ChatError;
use crate::settings::Settings;

/// Streaming client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiChat {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAiChat {
    /// Builds a client from settings. The base URL and key come from the
    /// injected [`Settings`]; nothing is read from the environment here.
    pub fn new(settings: &Settings) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: settings.llm_base_url.trim_end_matches('/').to_string(),
            api_key: settings.llm_api_key.clone(),
        }
    }
}

/// True when an SSE data payload is the end-of-stream sentinel.
fn is_sentinel(data: &str) -> bool {
    matches!(data.trim(), "DONE" | "[DONE]")
}

/// Extracts the delta text from one parsed chunk (`choices[0].delta.content`).
fn delta_text(chunk: &serde_json::Value) -> Option<&str> {
    chunk
        .get("choices")?
        .get(0)?
        .get("delta")?
        .get("content")?
        .as_str()
}

#[async_trait]
impl LlmClient for OpenAiChat {
    async fn generate(
        &self,
        prompt: &str,
        model: &str,
        chunk_tx: Option<mpsc::Sender<MessageChunk>>,
    ) -> Result<String, ChatError> {
        let body = serde_json::json!({
            "model": model,
            "messages": [{ "role": "user", "content": prompt }],
            "stream": true,
        });
        let res = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatError::Llm(e.to_string()))?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(ChatError::Llm(format!(
                "chat completions error {status}: {body}"
            )));
        }

        let mut full = String::new();
        let mut buf = String::new();
        let mut stream = res.bytes_stream();
        'read: while let Some(part) = stream.next().await {
            let part = part.map_err(|e| ChatError::Llm(e.to_string()))?;
            buf.push_str(&String::from_utf8_lossy(&part));
            while let Some(pos) = buf.find('\n') {
                let line = buf[..pos].trim_end_matches('\r').to_string();
                buf.drain(..=pos);
                let Some(data) = line.strip_prefix("data: ") else {
                    continue;
                };
                if is_sentinel(data) {
                    break 'read;
                }
                let Ok(chunk) = serde_json::from_str::<serde_json::Value>(data) else {
                    continue;
                };
                if let Some(text) = delta_text(&chunk) {
                    if text.is_empty() {
                        continue;
                    }
                    full.push_str(text);
                    if let Some(ref tx) = chunk_tx {
                        let _ = tx
                            .send(MessageChunk {
                                text: text.to_string(),
                            })
                            .await;
                    }
                }
            }
        }
        Ok(full)
    }
}
