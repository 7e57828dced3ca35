//! Per-step search query generation.

use crate::error::ChatError;
use crate::extract;
use crate::llm::LlmClient;
use crate::prompts;

/// Upper bound on search queries per plan step.
pub const MAX_STEP_QUERIES: usize = 4;

/// Asks the model for search queries for one plan step, embedding the
/// original query, the step description, and the rendered dependency context.
///
/// Extraction failure degrades to an empty list: the step then proceeds with
/// no search results rather than failing the request.
pub async fn queries_for_step(
    llm: &dyn LlmClient,
    model: &str,
    original_query: &str,
    step_description: &str,
    prior_context: &str,
) -> Result<Vec<String>, ChatError> {
    let prompt = prompts::render(
        prompts::SEARCH_QUERIES,
        &[
            ("user_query", original_query),
            ("prev_steps_context", prior_context),
            ("current_step", step_description),
        ],
    );
    let raw = llm.generate(&prompt, model, None).await?;
    let mut queries = extract::string_list(&raw);
    queries.truncate(MAX_STEP_QUERIES);
    Ok(queries)
}
