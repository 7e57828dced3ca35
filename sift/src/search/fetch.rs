//! Page fetch and plain-text extraction for search-result enrichment.
//!
//! Each text hit's url is fetched with a bounded timeout and the page body is
//! reduced to readable text (markup, scripts, and page chrome stripped,
//! whitespace collapsed, length bounded). Any failure yields `None` and the
//! hit keeps its provider summary unenriched.

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;

/// Elements whose text never belongs in evidence.
const SKIP_TAGS: &[&str] = &[
    "script", "style", "noscript", "header", "footer", "nav", "head", "template",
];

const FETCH_TIMEOUT: Duration = Duration::from_secs(6);
const MAX_TEXT_CHARS: usize = 4000;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Fetches pages with a bounded timeout and extracts readable text.
#[derive(Clone)]
pub struct PageFetcher {
    client: reqwest::Client,
    max_chars: usize,
}

impl PageFetcher {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            max_chars: MAX_TEXT_CHARS,
        }
    }

    /// Fetches `url` and returns extracted page text. Every failure mode
    /// (empty url, transport error, timeout, non-success status, unreadable
    /// body, no visible text) yields `None`.
    pub async fn fetch_text(&self, url: &str) -> Option<String> {
        if url.is_empty() {
            return None;
        }
        let res = self.client.get(url).send().await.ok()?;
        if !res.status().is_success() {
            return None;
        }
        let body = res.text().await.ok()?;
        let text = extract_text(&body, self.max_chars);
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

impl Default for PageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Reduces an HTML document to visible text: drops script/style/nav and
/// similar subtrees, collapses whitespace runs to single spaces, and bounds
/// the result to `max_chars` characters.
pub fn extract_text(html: &str, max_chars: usize) -> String {
    let doc = Html::parse_document(html);
    let mut raw = String::new();
    for node in doc.tree.nodes() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let skipped = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|e| SKIP_TAGS.contains(&e.name()))
        });
        if skipped {
            continue;
        }
        raw.push_str(text);
        raw.push(' ');
    }
    let collapsed = WHITESPACE.replace_all(raw.trim(), " ");
    collapsed.chars().take(max_chars).collect()
}
