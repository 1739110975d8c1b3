use crate::process::{ProcessRunner, Tool};
use crate::Result;
use log::debug;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::path::PathBuf;

/// Prefix of the result-count directive understood by yt-dlp
pub const SEARCH_PREFIX: &str = "ytsearch";

/// Label shown next to the liveness indicator while searching
pub const SEARCH_LABEL: &str = "Searching";

/// One catalog entry as reported by yt-dlp.
///
/// A field of an unexpected JSON type counts as absent instead of failing
/// the whole payload.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchResult {
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub uploader: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub channel: Option<String>,
    /// Whole seconds; unknown when absent, negative or not numeric
    #[serde(default, deserialize_with = "lenient_seconds")]
    pub duration: Option<u64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub webpage_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub url: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

impl SearchResult {
    pub fn title(&self) -> &str {
        non_empty(&self.title).unwrap_or("(no title)")
    }

    pub fn uploader(&self) -> &str {
        non_empty(&self.uploader)
            .or_else(|| non_empty(&self.channel))
            .unwrap_or("?")
    }

    /// Canonical page URL, falling back to the raw URL
    pub fn playable_url(&self) -> Option<&str> {
        non_empty(&self.webpage_url).or_else(|| non_empty(&self.url))
    }
}

/// Accepts strings as-is and renders numbers and booleans as text.
fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(v @ (Value::Number(_) | Value::Bool(_))) => Some(v.to_string()),
        _ => None,
    })
}

/// Accepts integers, floats (truncated) and numeric strings.
fn lenient_seconds<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<u64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(seconds_from_value))
}

fn seconds_from_value(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f.trunc() as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

/// Top-level document printed by `--dump-single-json` for a search
#[derive(Debug, Default, Deserialize)]
pub struct SearchPayload {
    #[serde(default)]
    pub entries: Option<Vec<SearchResult>>,
}

impl SearchPayload {
    /// A missing or null entry list is an empty result set
    pub fn into_entries(self) -> Vec<SearchResult> {
        self.entries.unwrap_or_default()
    }
}

/// Build the search target passed to yt-dlp, e.g. `ytsearch10:lofi beats`
pub fn search_target(query: &str, limit: u32) -> String {
    format!("{}{}:{}", SEARCH_PREFIX, limit, query)
}

/// Source of search results
#[allow(async_fn_in_trait)]
pub trait Catalog {
    /// Search for `query`, returning at most `limit` results in catalog order
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<SearchResult>>;

    /// Resolve a query to its single best match
    async fn resolve(&self, query: &str) -> Result<Option<SearchResult>> {
        Ok(self.search(query, 1).await?.into_iter().next())
    }
}

/// yt-dlp backed catalog
#[derive(Debug, Clone)]
pub struct YtDlp {
    binary: PathBuf,
    runner: ProcessRunner,
}

impl YtDlp {
    pub fn new(runner: ProcessRunner) -> Self {
        Self::with_binary(Tool::YtDlp.binary(), runner)
    }

    pub fn with_binary(path: impl Into<PathBuf>, runner: ProcessRunner) -> Self {
        Self {
            binary: path.into(),
            runner,
        }
    }

    pub fn search_args(query: &str, limit: u32) -> Vec<String> {
        vec!["--dump-single-json".to_string(), search_target(query, limit)]
    }
}

impl Catalog for YtDlp {
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<SearchResult>> {
        let args = Self::search_args(query, limit);
        let payload: SearchPayload = self
            .runner
            .run_json(Tool::YtDlp, &self.binary, &args, Some(SEARCH_LABEL))
            .await?;
        let entries = payload.into_entries();
        debug!("Search '{}' returned {} entries", query, entries.len());
        Ok(entries)
    }
}
