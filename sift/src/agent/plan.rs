//! Research plan: the step list produced once per request by the planning call.

use serde::{Deserialize, Serialize};

use crate::error::ChatError;
use crate::extract;
use crate::llm::LlmClient;
use crate::prompts;

/// One research step: id, description, and the ids of earlier steps whose
/// evidence this step builds on. Immutable after plan construction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStep {
    pub id: u32,
    pub step: String,
    #[serde(default)]
    pub dependencies: Vec<u32>,
}

/// Ordered research plan. The last step is the designated synthesis step: it
/// is never searched itself, only composed from its dependencies' evidence.
#[derive(Clone, Debug, Default)]
pub struct Plan {
    steps: Vec<PlanStep>,
}

impl Plan {
    pub fn from_steps(steps: Vec<PlanStep>) -> Self {
        Self { steps }
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    /// Step descriptions in plan order, for the agent-query-plan event.
    pub fn descriptions(&self) -> Vec<String> {
        self.steps.iter().map(|s| s.step.clone()).collect()
    }

    /// The designated final (synthesis) step: the last element.
    pub fn final_step(&self) -> Option<&PlanStep> {
        self.steps.last()
    }

    /// Non-final steps in ascending id order, which is the execution order.
    pub fn research_steps(&self) -> Vec<&PlanStep> {
        let Some(final_id) = self.final_step().map(|s| s.id) else {
            return Vec::new();
        };
        let mut steps: Vec<&PlanStep> = self.steps.iter().filter(|s| s.id != final_id).collect();
        steps.sort_by_key(|s| s.id);
        steps
    }

    /// Looks a step up by id.
    pub fn step_by_id(&self, id: u32) -> Option<&PlanStep> {
        self.steps.iter().find(|s| s.id == id)
    }
}

/// Builds the research plan for one query: one planning call, one extraction.
///
/// An empty result means the plan is unbuildable; the orchestrator treats
/// that as fatal for the request. This function itself only reports what the
/// extraction produced.
pub async fn build_plan(llm: &dyn LlmClient, model: &str, query: &str) -> Result<Plan, ChatError> {
    let prompt = prompts::render(prompts::QUERY_PLAN, &[("query", query)]);
    let raw = llm.generate(&prompt, model, None).await?;
    Ok(Plan::from_steps(extract::plan_steps(&raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlm;

    fn step(id: u32, description: &str, dependencies: &[u32]) -> PlanStep {
        PlanStep {
            id,
            step: description.to_string(),
            dependencies: dependencies.to_vec(),
        }
    }

    #[test]
    fn research_steps_skip_the_final_step_and_sort_by_id() {
        let plan = Plan::from_steps(vec![
            step(1, "b", &[]),
            step(0, "a", &[]),
            step(2, "final", &[0, 1]),
        ]);
        let ids: Vec<u32> = plan.research_steps().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![0, 1]);
        assert_eq!(plan.final_step().unwrap().id, 2);
    }

    #[test]
    fn empty_plan_has_no_final_or_research_steps() {
        let plan = Plan::default();
        assert!(plan.is_empty());
        assert!(plan.final_step().is_none());
        assert!(plan.research_steps().is_empty());
    }

    #[tokio::test]
    async fn build_plan_extracts_steps_from_model_output() {
        let llm = MockLlm::always(
            r#"```json
[{"id": 0, "step": "Research X", "dependencies": []},
 {"id": 1, "step": "Summarize X", "dependencies": [0]}]
```"#,
        );
        let plan = build_plan(&llm, "m", "tell me about X").await.unwrap();
        assert_eq!(plan.steps().len(), 2);
        assert_eq!(plan.descriptions(), vec!["Research X", "Summarize X"]);
    }

    #[tokio::test]
    async fn build_plan_degrades_to_empty_on_garbage() {
        let llm = MockLlm::always("I cannot produce a plan right now.");
        let plan = build_plan(&llm, "m", "q").await.unwrap();
        assert!(plan.is_empty());
    }
}
