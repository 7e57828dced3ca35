//! Expert mode: dependency-ordered research plan execution.
//!
//! Single forward pass per request: rephrase (when history exists) → plan →
//! per-step sub-queries and search fan-out → synthesis over the final step's
//! dependencies → follow-up questions → stream end. Steps run strictly
//! sequentially; the sub-query fan-out within a step is the only intra-step
//! concurrency. All per-request state lives in [`StepState`], owned here for
//! the lifetime of one request.

use std::collections::HashMap;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use sift_event::{ChatEvent, SearchResult};

use super::plan::{build_plan, Plan, PlanStep};
use super::related::related_questions;
use super::rephrase::{rephrase_query, HistoryMessage};
use super::stream_completion;
use super::subquery::queries_for_step;
use crate::emit::EventEmitter;
use crate::error::ChatError;
use crate::llm::LlmClient;
use crate::prompts;
use crate::search::{dedup_images, dedup_sources, format_context, SearchClient, AGENT_PROFILE};

/// Inputs for one chat request. `model` is the concrete model id, already
/// resolved from the request alias by the transport layer.
#[derive(Clone, Debug)]
pub struct ChatTurn {
    pub query: String,
    pub history: Vec<HistoryMessage>,
    pub model: String,
    pub thread_id: Option<i64>,
}

/// Per-step evidence accumulated while walking the plan. Each map is keyed by
/// step id and written exactly once, right after that step's fan-out
/// completes; never mutated afterward.
#[derive(Debug, Default)]
struct StepState {
    contexts: HashMap<u32, String>,
    sources: HashMap<u32, Vec<SearchResult>>,
    images: HashMap<u32, Vec<String>>,
}

/// Expert agent: drives the full research pipeline for one request.
pub struct ExpertAgent {
    llm: Arc<dyn LlmClient>,
    search: SearchClient,
    cancel: CancellationToken,
}

impl ExpertAgent {
    pub fn new(llm: Arc<dyn LlmClient>, search: SearchClient) -> Self {
        Self {
            llm,
            search,
            cancel: CancellationToken::new(),
        }
    }

    /// Ties this request to an external cancellation token (e.g. the
    /// connection's). Checked at every phase boundary.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Runs the request to completion, emitting the event stream.
    ///
    /// This is the outer fault boundary: any failure other than client-side
    /// teardown is reported as an `error` event before returning, so the
    /// client always sees a terminal signal mid-stream.
    pub async fn run(&self, turn: ChatTurn, emitter: &EventEmitter) -> Result<(), ChatError> {
        match self.run_inner(&turn, emitter).await {
            Ok(()) => Ok(()),
            Err(e @ (ChatError::StreamClosed | ChatError::Cancelled)) => Err(e),
            Err(e) => {
                tracing::warn!("expert request failed: {e}");
                let _ = emitter
                    .emit(ChatEvent::Error {
                        detail: e.to_string(),
                    })
                    .await;
                Err(e)
            }
        }
    }

    async fn run_inner(&self, turn: &ChatTurn, emitter: &EventEmitter) -> Result<(), ChatError> {
        emitter.emit(ChatEvent::begin_stream(&turn.query)).await?;

        let query =
            rephrase_query(self.llm.as_ref(), &turn.model, &turn.query, &turn.history).await?;

        self.ensure_live()?;
        let plan = build_plan(self.llm.as_ref(), &turn.model, &query).await?;
        emitter
            .emit(ChatEvent::AgentQueryPlan {
                steps: plan.descriptions(),
            })
            .await?;
        let Some(final_step) = plan.final_step().cloned() else {
            return Err(ChatError::EmptyPlan);
        };

        let mut state = StepState::default();
        for step in plan.research_steps() {
            self.ensure_live()?;
            self.execute_step(turn, &query, &plan, step, &mut state, emitter)
                .await?;
        }

        self.ensure_live()?;
        let answer = self
            .synthesize(turn, &query, &plan, &final_step, &state, emitter)
            .await?;

        let questions =
            related_questions(self.llm.as_ref(), &turn.model, &answer, &query).await;
        emitter
            .emit(ChatEvent::RelatedQueries {
                related_queries: questions,
            })
            .await?;

        emitter
            .emit(ChatEvent::StreamEnd {
                thread_id: turn.thread_id,
            })
            .await?;
        Ok(())
    }

    fn ensure_live(&self) -> Result<(), ChatError> {
        if self.cancel.is_cancelled() {
            Err(ChatError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Runs one non-final step: sub-queries, fan-out, evidence bookkeeping.
    /// Progress events go out after query generation and after aggregation.
    async fn execute_step(
        &self,
        turn: &ChatTurn,
        query: &str,
        plan: &Plan,
        step: &PlanStep,
        state: &mut StepState,
        emitter: &EventEmitter,
    ) -> Result<(), ChatError> {
        let prior = dependency_context(plan, &step.dependencies, &state.contexts, "\n");
        let queries = queries_for_step(
            self.llm.as_ref(),
            &turn.model,
            query,
            &step.step,
            prior.trim(),
        )
        .await?;
        emitter
            .emit(ChatEvent::AgentSearchQueries {
                step_number: step.id,
                queries: queries.clone(),
            })
            .await?;

        let outcome = self.search.fan_out(&queries, AGENT_PROFILE).await;
        state
            .contexts
            .insert(step.id, format_context(&outcome.results));
        state.sources.insert(step.id, outcome.sources);
        state.images.insert(step.id, outcome.images);

        emitter
            .emit(ChatEvent::AgentReadResults {
                step_number: step.id,
                results: outcome.results,
            })
            .await?;
        Ok(())
    }

    /// Aggregates the final step's dependency evidence, announces the merged
    /// sources, and streams the synthesized answer.
    async fn synthesize(
        &self,
        turn: &ChatTurn,
        query: &str,
        plan: &Plan,
        final_step: &PlanStep,
        state: &StepState,
        emitter: &EventEmitter,
    ) -> Result<String, ChatError> {
        let combined =
            dependency_context(plan, &final_step.dependencies, &state.contexts, "\n\n");
        let sources = merge_sources(&final_step.dependencies, &state.sources);
        let images = merge_images(&final_step.dependencies, &state.images);
        emitter
            .emit(ChatEvent::SearchResults {
                results: sources,
                images,
            })
            .await?;

        let prompt = prompts::render(
            prompts::SYNTHESIS,
            &[
                ("query", query),
                ("final_step", final_step.step.as_str()),
                ("context", combined.as_str()),
            ],
        );
        let answer = stream_completion(&self.llm, &prompt, &turn.model, emitter).await?;
        emitter
            .emit(ChatEvent::FinalResponse {
                response: answer.clone(),
            })
            .await?;
        Ok(answer)
    }
}

/// Concatenates `Step: <description>\nContext: <evidence>` blocks for the
/// dependency ids that already have populated context. Unknown, forward, or
/// unpopulated ids are silently omitted, never an error. Order follows the
/// dependency list, not id order.
fn dependency_context(
    plan: &Plan,
    dependencies: &[u32],
    contexts: &HashMap<u32, String>,
    separator: &str,
) -> String {
    dependencies
        .iter()
        .filter_map(|id| {
            let step = plan.step_by_id(*id)?;
            let context = contexts.get(id)?;
            Some(format!("Step: {}\nContext: {}", step.step, context))
        })
        .collect::<Vec<_>>()
        .join(separator)
}

/// Flattens per-step sources across `dependencies` in dependency-list order,
/// deduplicating by url across step boundaries.
fn merge_sources(
    dependencies: &[u32],
    sources: &HashMap<u32, Vec<SearchResult>>,
) -> Vec<SearchResult> {
    let flat: Vec<SearchResult> = dependencies
        .iter()
        .flat_map(|id| sources.get(id).cloned().unwrap_or_default())
        .collect();
    dedup_sources(&flat)
}

/// Flattens per-step image lists across `dependencies`, deduplicating exact
/// urls across step boundaries.
fn merge_images(dependencies: &[u32], images: &HashMap<u32, Vec<String>>) -> Vec<String> {
    let flat: Vec<String> = dependencies
        .iter()
        .flat_map(|id| images.get(id).cloned().unwrap_or_default())
        .collect();
    dedup_images(&flat)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(id: u32, description: &str, dependencies: &[u32]) -> PlanStep {
        PlanStep {
            id,
            step: description.to_string(),
            dependencies: dependencies.to_vec(),
        }
    }

    #[test]
    fn dependency_context_skips_unpopulated_and_unknown_ids() {
        let plan = Plan::from_steps(vec![
            step(0, "a", &[]),
            step(1, "b", &[0]),
            step(2, "final", &[0, 1]),
        ]);
        let mut contexts = HashMap::new();
        contexts.insert(0, "evidence-a".to_string());
        // id 1 unpopulated, id 7 unknown: both silently omitted.
        let rendered = dependency_context(&plan, &[0, 1, 7], &contexts, "\n");
        assert_eq!(rendered, "Step: a\nContext: evidence-a");
    }

    #[test]
    fn dependency_context_follows_dependency_list_order() {
        let plan = Plan::from_steps(vec![
            step(0, "a", &[]),
            step(1, "b", &[]),
            step(2, "final", &[1, 0]),
        ]);
        let mut contexts = HashMap::new();
        contexts.insert(0, "ctx-a".to_string());
        contexts.insert(1, "ctx-b".to_string());
        let rendered = dependency_context(&plan, &[1, 0], &contexts, "\n\n");
        let first = rendered.find("ctx-b").unwrap();
        let second = rendered.find("ctx-a").unwrap();
        assert!(first < second);
    }

    #[test]
    fn merged_sources_dedup_across_step_boundaries() {
        let mut sources = HashMap::new();
        sources.insert(
            0,
            vec![
                SearchResult::new("A", "u1", "a"),
                SearchResult::new("B", "u2", "b"),
            ],
        );
        sources.insert(
            1,
            vec![
                SearchResult::new("A again", "u1", "a2"),
                SearchResult::new("C", "u3", "c"),
            ],
        );
        let merged = merge_sources(&[0, 1], &sources);
        let urls: Vec<&str> = merged.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(urls, vec!["u1", "u2", "u3"]);
        // First occurrence wins: step 0's record for u1 survives.
        assert_eq!(merged[0].title, "A");
    }

    #[test]
    fn merged_images_dedup_exact_strings() {
        let mut images = HashMap::new();
        images.insert(0, vec!["i1".to_string(), "i2".to_string()]);
        images.insert(1, vec!["i2".to_string(), "i3".to_string()]);
        assert_eq!(merge_images(&[0, 1], &images), vec!["i1", "i2", "i3"]);
    }
}
