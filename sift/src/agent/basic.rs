//! Basic mode: one full-profile search, one synthesis, no plan.
//!
//! A strict subset of the expert streaming logic: rephrase (when history
//! exists), search, answer, follow-ups. Emits `final-message` before
//! `stream-end`, which expert mode does not.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use sift_event::ChatEvent;

use super::expert::ChatTurn;
use super::related::related_questions;
use super::rephrase::rephrase_query;
use super::stream_completion;
use crate::emit::EventEmitter;
use crate::error::ChatError;
use crate::llm::LlmClient;
use crate::prompts;
use crate::search::{format_context, SearchClient, FULL_PROFILE};

/// Basic agent: single-search chat for one request.
pub struct BasicAgent {
    llm: Arc<dyn LlmClient>,
    search: SearchClient,
    cancel: CancellationToken,
}

impl BasicAgent {
    pub fn new(llm: Arc<dyn LlmClient>, search: SearchClient) -> Self {
        Self {
            llm,
            search,
            cancel: CancellationToken::new(),
        }
    }

    /// Ties this request to an external cancellation token.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Runs the request; same outer fault boundary as the expert agent.
    pub async fn run(&self, turn: ChatTurn, emitter: &EventEmitter) -> Result<(), ChatError> {
        match self.run_inner(&turn, emitter).await {
            Ok(()) => Ok(()),
            Err(e @ (ChatError::StreamClosed | ChatError::Cancelled)) => Err(e),
            Err(e) => {
                tracing::warn!("basic request failed: {e}");
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

        if self.cancel.is_cancelled() {
            return Err(ChatError::Cancelled);
        }
        let response = self.search.search(&query, FULL_PROFILE).await;
        emitter
            .emit(ChatEvent::SearchResults {
                results: response.results.clone(),
                images: response.images.clone(),
            })
            .await?;

        let prompt = prompts::render(
            prompts::CHAT,
            &[
                ("context", format_context(&response.results).as_str()),
                ("query", query.as_str()),
            ],
        );
        let answer = stream_completion(&self.llm, &prompt, &turn.model, emitter).await?;
        emitter
            .emit(ChatEvent::FinalResponse {
                response: answer.clone(),
            })
            .await?;

        let questions =
            related_questions(self.llm.as_ref(), &turn.model, &answer, &query).await;
        emitter
            .emit(ChatEvent::RelatedQueries {
                related_queries: questions,
            })
            .await?;

        emitter
            .emit(ChatEvent::FinalMessage { message: answer })
            .await?;
        emitter
            .emit(ChatEvent::StreamEnd {
                thread_id: turn.thread_id,
            })
            .await?;
        Ok(())
    }
}
