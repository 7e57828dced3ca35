//! # sift
//!
//! Core of a retrieval-augmented chat backend. Given a user query, sift
//! optionally breaks the task into a dependency-ordered research plan, fans
//! out web searches per plan step, accumulates per-step evidence, and streams
//! an incrementally generated, citation-formatted answer as an ordered event
//! stream.
//!
//! ## Design
//!
//! - **Two agents**: [`ExpertAgent`] walks a research plan (plan → per-step
//!   sub-queries → concurrent search fan-out → synthesis over aggregated
//!   evidence); [`BasicAgent`] is the single-search subset of the same
//!   streaming logic.
//! - **Injected collaborators**: the text-generation client ([`LlmClient`])
//!   and search provider ([`SearchProvider`]) are traits constructed from an
//!   immutable [`Settings`] value at startup; mocks ([`MockLlm`],
//!   [`MockSearchProvider`]) ship with the library for tests.
//! - **Fail-soft components**: structured-output extraction ([`extract`]),
//!   search, and page fetches degrade to empty results. The one fatal
//!   condition is an unbuildable plan, reported as an `error` event.
//! - **Ordered events**: everything the client sees flows through
//!   [`EventEmitter`] into the closed `ChatEvent` union (re-exported from
//!   `sift-event`), emitted in strict temporal order.
//!
//! ## Main modules
//!
//! - [`agent`]: [`ExpertAgent`], [`BasicAgent`], [`ChatTurn`], plan types,
//!   and the single-call helpers (rephrase, sub-queries, follow-ups).
//! - [`extract`]: resilient structured-output extraction as named pure
//!   repair stages.
//! - [`search`]: [`SearchClient`] fan-out, dedup, context formatting, page
//!   enrichment.
//! - [`llm`]: [`LlmClient`] trait, [`OpenAiChat`], [`MockLlm`].
//! - [`emit`]: [`EventEmitter`] over a bounded channel.
//! - [`settings`]: [`Settings`] built once from the environment.

pub mod agent;
pub mod emit;
pub mod error;
pub mod extract;
pub mod llm;
pub mod prompts;
pub mod search;
pub mod settings;

pub use agent::{
    build_plan, queries_for_step, related_questions, rephrase_query, BasicAgent, ChatTurn,
    ExpertAgent, HistoryMessage, Plan, PlanStep, MAX_STEP_QUERIES, RELATED_QUESTION_COUNT,
};
pub use emit::EventEmitter;
pub use error::ChatError;
pub use llm::{LlmClient, MessageChunk, MockLlm, OpenAiChat};
pub use search::{
    dedup_images, dedup_sources, format_context, FanOutResult, HttpSearchProvider,
    MockSearchProvider, PageFetcher, SearchClient, SearchError, SearchProfile, SearchProvider,
    SearchResponse, SearchResult, AGENT_PROFILE, FULL_PROFILE,
};
pub use settings::Settings;

pub use sift_event::ChatEvent;
