//! Follow-up question generation for a finished answer.

use crate::extract;
use crate::llm::LlmClient;
use crate::prompts;

/// The related-questions call asks for exactly this many questions.
pub const RELATED_QUESTION_COUNT: usize = 3;

/// Generates follow-up questions from the final answer and original query.
///
/// Never blocks or fails the overall response: a transport error or an
/// unextractable reply both yield an empty list.
pub async fn related_questions(
    llm: &dyn LlmClient,
    model: &str,
    answer: &str,
    query: &str,
) -> Vec<String> {
    let prompt = prompts::render(
        prompts::RELATED_QUESTIONS,
        &[("context", answer), ("query", query)],
    );
    let raw = match llm.generate(&prompt, model, None).await {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!("related-questions call failed: {e}");
            return Vec::new();
        }
    };
    let mut questions = extract::string_list(&raw);
    questions.truncate(RELATED_QUESTION_COUNT);
    questions
}
