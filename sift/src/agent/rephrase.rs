//! Collapse conversation history plus a follow-up into one standalone query.

use serde::{Deserialize, Serialize};

use crate::error::ChatError;
use crate::llm::LlmClient;
use crate::prompts;

/// One prior conversation turn as received from the client.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub role: String,
    pub content: String,
}

/// Renders history as `role: content` lines for the rephrase prompt.
fn render_history(history: &[HistoryMessage]) -> String {
    history
        .iter()
        .map(|m| format!("{}: {}", m.role, m.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Returns `query` unchanged when there is no history (no model call).
/// Otherwise issues one rephrase call and returns the trimmed result, falling
/// back to the original query when the model returns nothing. No retries.
pub async fn rephrase_query(
    llm: &dyn LlmClient,
    model: &str,
    query: &str,
    history: &[HistoryMessage],
) -> Result<String, ChatError> {
    if history.is_empty() {
        return Ok(query.to_string());
    }
    let chat_history = render_history(history);
    let prompt = prompts::render(
        prompts::HISTORY_REPHRASE,
        &[("chat_history", chat_history.as_str()), ("question", query)],
    );
    let raw = llm.generate(&prompt, model, None).await?;
    let rephrased = raw.trim();
    if rephrased.is_empty() {
        Ok(query.to_string())
    } else {
        Ok(rephrased.to_string())
    }
}
