//! Web search fan-out: provider abstraction, page enrichment, ordered
//! concurrent sub-query search, and context formatting.
//!
//! [`SearchClient`] is the piece the agents use. One call profile exists per
//! mode: [`FULL_PROFILE`] for single-turn chat, [`AGENT_PROFILE`] for each
//! plan step. `fan_out` runs every sub-query concurrently, waits for all of
//! them, and merges in submission order so repeated runs over the same query
//! list dedup identically.

mod fetch;
mod provider;

pub use fetch::{extract_text, PageFetcher};
pub use provider::{HttpSearchProvider, MockSearchProvider};
pub use sift_event::SearchResult;

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use serde::Deserialize;
use thiserror::Error;

/// Search provider failure. Always absorbed into empty results by
/// [`SearchClient`]; it never aborts a request.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search transport failed: {0}")]
    Transport(String),
    #[error("search provider error {status}: {body}")]
    Status { status: u16, body: String },
}

/// Ranked text hits plus image urls for one query.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchResult>,
    #[serde(default)]
    pub images: Vec<String>,
}

/// How many text and image results one search call asks for.
#[derive(Clone, Copy, Debug)]
pub struct SearchProfile {
    pub max_text_results: usize,
    pub max_image_results: usize,
}

/// Single-turn profile: one search carries the whole answer.
pub const FULL_PROFILE: SearchProfile = SearchProfile {
    max_text_results: 7,
    max_image_results: 6,
};

/// Per-plan-step profile: several lighter searches per request.
pub const AGENT_PROFILE: SearchProfile = SearchProfile {
    max_text_results: 4,
    max_image_results: 2,
};

/// External search capability: ranked text results and image urls for a query.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(
        &self,
        query: &str,
        profile: SearchProfile,
    ) -> Result<SearchResponse, SearchError>;
}

/// Merged outcome of one fan-out: raw hits in submission order (these feed
/// the context blocks and the read-results event) plus the url-deduplicated
/// sources and deduplicated image urls.
#[derive(Clone, Debug, Default)]
pub struct FanOutResult {
    pub results: Vec<SearchResult>,
    pub sources: Vec<SearchResult>,
    pub images: Vec<String>,
}

/// Search client: provider + page enrichment + concurrent fan-out.
#[derive(Clone)]
pub struct SearchClient {
    provider: Arc<dyn SearchProvider>,
    fetcher: Option<PageFetcher>,
}

impl SearchClient {
    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        Self {
            provider,
            fetcher: Some(PageFetcher::new()),
        }
    }

    pub fn with_fetcher(provider: Arc<dyn SearchProvider>, fetcher: PageFetcher) -> Self {
        Self {
            provider,
            fetcher: Some(fetcher),
        }
    }

    /// A client that skips page enrichment and uses provider summaries as-is.
    pub fn without_enrichment(provider: Arc<dyn SearchProvider>) -> Self {
        Self {
            provider,
            fetcher: None,
        }
    }

    /// One enriched search. Provider failure yields an empty response; a fetch
    /// failure for any result url leaves that hit unenriched. Fetches for the
    /// hits of one search run concurrently, result order unchanged.
    pub async fn search(&self, query: &str, profile: SearchProfile) -> SearchResponse {
        let mut response = match self.provider.search(query, profile).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("search failed for {query:?}: {e}");
                return SearchResponse::default();
            }
        };
        let Some(fetcher) = &self.fetcher else {
            return response;
        };
        let fetched = join_all(
            response
                .results
                .iter()
                .map(|hit| fetcher.fetch_text(&hit.url)),
        )
        .await;
        for (hit, extra) in response.results.iter_mut().zip(fetched) {
            if let Some(text) = extra {
                hit.content.push_str("\n\n");
                hit.content.push_str(&text);
            }
        }
        response
    }

    /// Issues one search per sub-query concurrently and merges when all have
    /// completed. No call is cancelled on another's failure; a failed query
    /// contributes nothing. Merge order is the submission order of `queries`,
    /// not completion order, so the output is deterministic for a fixed list.
    pub async fn fan_out(&self, queries: &[String], profile: SearchProfile) -> FanOutResult {
        let responses = join_all(queries.iter().map(|q| self.search(q, profile))).await;
        let mut results = Vec::new();
        let mut images = Vec::new();
        for response in responses {
            results.extend(response.results);
            images.extend(response.images);
        }
        let sources = dedup_sources(&results);
        let images = dedup_images(&images);
        FanOutResult {
            results,
            sources,
            images,
        }
    }
}

/// Drops hits whose url was already seen. First occurrence wins; insertion
/// order is preserved.
pub fn dedup_sources(results: &[SearchResult]) -> Vec<SearchResult> {
    let mut seen = HashSet::new();
    results
        .iter()
        .filter(|hit| seen.insert(hit.url.as_str()))
        .cloned()
        .collect()
}

/// Drops repeated image urls. First occurrence wins; order preserved.
pub fn dedup_images(images: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    images
        .iter()
        .filter(|url| seen.insert(url.as_str()))
        .cloned()
        .collect()
}

/// Renders hits as numbered context blocks for the model.
///
/// The `[i]` indices (1-based) are what the synthesis prompt's citation
/// contract refers to; this exact shape is embedded into downstream prompts
/// and must stay stable.
pub fn format_context(results: &[SearchResult]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, hit)| {
            format!(
                "[{}]\nTitle: {}\nURL: {}\nSummary: {}",
                i + 1,
                hit.title,
                hit.url,
                hit.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n---\n")
}
