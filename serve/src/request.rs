//! Chat request surface.

use serde::Deserialize;

use sift::HistoryMessage;

/// Body of `POST /chat`.
///
/// `model` is an alias (`fast` / `powerful` / `hyper`) resolved against the
/// configured model table; `pro_search` selects the expert (plan-driven)
/// pipeline over the basic single-search one.
#[derive(Clone, Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub thread_id: Option<i64>,
    pub query: String,
    #[serde(default)]
    pub history: Vec<HistoryMessage>,
    pub model: String,
    #[serde(default)]
    pub pro_search: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_request_defaults_optional_fields() {
        let request: ChatRequest =
            serde_json::from_str(r#"{"query": "q", "model": "fast"}"#).unwrap();
        assert_eq!(request.query, "q");
        assert_eq!(request.model, "fast");
        assert!(request.history.is_empty());
        assert!(!request.pro_search);
        assert!(request.thread_id.is_none());
    }

    #[test]
    fn full_request_parses_history_and_flags() {
        let request: ChatRequest = serde_json::from_str(
            r#"{
                "thread_id": 12,
                "query": "next question",
                "history": [{"role": "user", "content": "hi"}],
                "model": "powerful",
                "pro_search": true
            }"#,
        )
        .unwrap();
        assert_eq!(request.thread_id, Some(12));
        assert_eq!(request.history.len(), 1);
        assert!(request.pro_search);
    }
}
