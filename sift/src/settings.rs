//! Immutable process configuration.
//!
//! Built once at startup (after the binary has applied `.env`) and injected
//! into the client constructors. Nothing in the library reads the environment
//! at call time.

use std::env;

/// Default OpenAI-compatible endpoint when `LLM_BASE_URL` is unset.
const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";
/// Default bind address for the HTTP server.
const DEFAULT_ADDR: &str = "127.0.0.1:8000";

/// Configuration for one process: endpoints, keys, and the model alias table.
#[derive(Clone, Debug)]
pub struct Settings {
    /// OpenAI-compatible chat completions base URL (no trailing `/chat/completions`).
    pub llm_base_url: String,
    pub llm_api_key: String,
    /// Concrete model ids behind the `fast` / `powerful` / `hyper` aliases.
    pub model_fast: String,
    pub model_powerful: String,
    pub model_hyper: String,
    /// Search provider endpoint; empty means search degrades to no results.
    pub search_api_url: String,
    pub search_api_key: String,
    /// Bind address for the HTTP server.
    pub addr: String,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).ok().unwrap_or_else(|| default.to_string())
}

impl Settings {
    /// Reads settings from the environment, falling back to defaults for
    /// unset values. Call once at startup.
    pub fn from_env() -> Self {
        Self {
            llm_base_url: var_or("LLM_BASE_URL", DEFAULT_LLM_BASE_URL),
            llm_api_key: var_or("LLM_API_KEY", ""),
            model_fast: var_or("MODEL_FAST", "gpt-3.5-turbo"),
            model_powerful: var_or("MODEL_POWERFUL", "gpt-4"),
            model_hyper: var_or("MODEL_HYPER", "gpt-3.5-turbo"),
            search_api_url: var_or("SEARCH_API_URL", ""),
            search_api_key: var_or("SEARCH_API_KEY", ""),
            addr: var_or("SIFT_ADDR", DEFAULT_ADDR),
        }
    }

    /// Resolves a request model alias to the configured model id.
    /// `None` means the alias is unsupported and the request must be rejected
    /// before any orchestration starts.
    pub fn resolve_model(&self, alias: &str) -> Option<&str> {
        match alias {
            "fast" => Some(&self.model_fast),
            "powerful" => Some(&self.model_powerful),
            "hyper" => Some(&self.model_hyper),
            _ => None,
        }
    }
}

impl Default for Settings {
    /// Defaults without touching the environment; used by tests.
    fn default() -> Self {
        Self {
            llm_base_url: DEFAULT_LLM_BASE_URL.to_string(),
            llm_api_key: String::new(),
            model_fast: "gpt-3.5-turbo".to_string(),
            model_powerful: "gpt-4".to_string(),
            model_hyper: "gpt-3.5-turbo".to_string(),
            search_api_url: String::new(),
            search_api_key: String::new(),
            addr: DEFAULT_ADDR.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_model_knows_the_three_aliases() {
        let settings = Settings {
            model_fast: "m-fast".to_string(),
            model_powerful: "m-powerful".to_string(),
            model_hyper: "m-hyper".to_string(),
            ..Settings::default()
        };
        assert_eq!(settings.resolve_model("fast"), Some("m-fast"));
        assert_eq!(settings.resolve_model("powerful"), Some("m-powerful"));
        assert_eq!(settings.resolve_model("hyper"), Some("m-hyper"));
        assert_eq!(settings.resolve_model("turbo"), None);
        assert_eq!(settings.resolve_model(""), None);
    }
}
