//! Search providers: the HTTP-backed implementation and a scripted mock.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;

use super::{SearchError, SearchProfile, SearchProvider, SearchResponse};
use crate::settings::Settings;

/// HTTP search provider: POSTs `{query, numResults, numImages}` to the
/// configured endpoint with an `x-api-key` header and expects
/// `{results: [{title, url, content}], images: [url]}` back.
pub struct HttpSearchProvider {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

impl HttpSearchProvider {
    pub fn new(settings: &Settings) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: settings.search_api_url.clone(),
            api_key: settings.search_api_key.clone(),
        }
    }
}

#[async_trait]
impl SearchProvider for HttpSearchProvider {
    async fn search(
        &self,
        query: &str,
        profile: SearchProfile,
    ) -> Result<SearchResponse, SearchError> {
        if self.url.is_empty() {
            return Err(SearchError::Transport(
                "SEARCH_API_URL is not configured".to_string(),
            ));
        }
        let body = serde_json::json!({
            "query": query,
            "numResults": profile.max_text_results,
            "numImages": profile.max_image_results,
        });
        let res = self
            .client
            .post(&self.url)
            .header("x-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| SearchError::Transport(e.to_string()))?;
        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(SearchError::Status { status, body });
        }
        let mut response: SearchResponse = res
            .json()
            .await
            .map_err(|e| SearchError::Transport(e.to_string()))?;
        // The provider is asked for bounded counts but may over-deliver.
        response.results.truncate(profile.max_text_results);
        response.images.truncate(profile.max_image_results);
        Ok(response)
    }
}

/// Scripted provider for tests: responses keyed by query, with optional
/// per-query delays (to exercise completion-order jitter) and failures.
#[derive(Default)]
pub struct MockSearchProvider {
    responses: HashMap<String, SearchResponse>,
    delays_ms: HashMap<String, u64>,
    failures: HashSet<String>,
}

impl MockSearchProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the response for `query`. Unknown queries return empty.
    pub fn with_response(mut self, query: impl Into<String>, response: SearchResponse) -> Self {
        self.responses.insert(query.into(), response);
        self
    }

    /// Delays the response for `query`, simulating out-of-order completion.
    pub fn with_delay_ms(mut self, query: impl Into<String>, ms: u64) -> Self {
        self.delays_ms.insert(query.into(), ms);
        self
    }

    /// Makes `query` fail with a transport error.
    pub fn with_failure(mut self, query: impl Into<String>) -> Self {
        self.failures.insert(query.into());
        self
    }
}

#[async_trait]
impl SearchProvider for MockSearchProvider {
    async fn search(
        &self,
        query: &str,
        _profile: SearchProfile,
    ) -> Result<SearchResponse, SearchError> {
        if let Some(&ms) = self.delays_ms.get(query) {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
        if self.failures.contains(query) {
            return Err(SearchError::Transport(format!(
                "scripted failure for {query:?}"
            )));
        }
        Ok(self.responses.get(query).cloned().unwrap_or_default())
    }
}
