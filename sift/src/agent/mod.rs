//! Chat agents: the expert (multi-step research) and basic (single search)
//! streaming pipelines, plus the single-call LLM helpers they share.

pub mod basic;
pub mod expert;
pub mod plan;
mod related;
mod rephrase;
mod subquery;

pub use basic::BasicAgent;
pub use expert::{ChatTurn, ExpertAgent};
pub use plan::{build_plan, Plan, PlanStep};
pub use related::{related_questions, RELATED_QUESTION_COUNT};
pub use rephrase::{rephrase_query, HistoryMessage};
pub use subquery::{queries_for_step, MAX_STEP_QUERIES};

use std::sync::Arc;

use sift_event::ChatEvent;
use tokio::sync::mpsc;

use crate::emit::EventEmitter;
use crate::error::ChatError;
use crate::llm::{LlmClient, MessageChunk};

/// Streams one completion, forwarding each non-empty delta as a `text-chunk`
/// event while accumulating the full answer. Used by both agents for the
/// final synthesis call.
///
/// When the emitter reports a closed stream the generation task is aborted:
/// there is no one left to read the rest of the answer.
pub(crate) async fn stream_completion(
    llm: &Arc<dyn LlmClient>,
    prompt: &str,
    model: &str,
    emitter: &EventEmitter,
) -> Result<String, ChatError> {
    let (tx, mut rx) = mpsc::channel::<MessageChunk>(32);
    let llm = Arc::clone(llm);
    let prompt = prompt.to_string();
    let model = model.to_string();
    let generation =
        tokio::spawn(async move { llm.generate(&prompt, &model, Some(tx)).await });

    let mut send_err: Option<ChatError> = None;
    while let Some(chunk) = rx.recv().await {
        if chunk.text.is_empty() {
            continue;
        }
        if let Err(e) = emitter.emit(ChatEvent::TextChunk { text: chunk.text }).await {
            send_err = Some(e);
            break;
        }
    }
    if let Some(e) = send_err {
        generation.abort();
        let _ = generation.await;
        return Err(e);
    }

    generation
        .await
        .map_err(|e| ChatError::Llm(e.to_string()))?
}
