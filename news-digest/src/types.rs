use serde::Deserialize;

/// Feed name used whenever an entry's feed cannot be resolved.
pub const UNKNOWN_FEED: &str = "Unknown Feed";

/// Title used when the provider omits one.
pub const NO_TITLE: &str = "No Title";

/// A single entry as returned by `entries.json`. Every field is nullable on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedbinEntry {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub published: Option<String>,
    #[serde(default)]
    pub feed_id: Option<i64>,
}

/// A subscription as returned by `subscriptions.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct Subscription {
    #[serde(default)]
    pub feed_id: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub site_url: Option<String>,
}

/// An article ready for summarization. Built once per run and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub url: String,
    pub summary: String,
    pub content: String,
    pub published: String,
    pub feed_id: Option<i64>,
    pub feed_name: String,
}

impl Article {
    pub fn from_entry(entry: FeedbinEntry, feed_name: String) -> Self {
        Self {
            title: entry.title.unwrap_or_else(|| NO_TITLE.to_string()),
            url: entry.url.unwrap_or_default(),
            summary: entry.summary.unwrap_or_default(),
            content: entry.content.unwrap_or_default(),
            published: entry.published.unwrap_or_default(),
            feed_id: entry.feed_id,
            feed_name,
        }
    }

    /// Text to embed in the prompt: the summary, or the full content when the summary is empty.
    pub fn body(&self) -> &str {
        if self.summary.is_empty() {
            &self.content
        } else {
            &self.summary
        }
    }
}

/// Token counters reported by the completion API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

/// The generated digest and the number of articles it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    pub text: String,
    pub article_count: usize,
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub base_url: String,
    pub email: String,
    pub password: String,
    pub user_agent: String,
    pub per_page: u32,
    pub fallback_per_page: u32,
}

impl FetchConfig {
    pub fn new(base_url: impl Into<String>, email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            email: email.into(),
            password: password.into(),
            user_agent: "News-Digest/1.0".to_string(),
            per_page: 50,
            fallback_per_page: 20,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {status} from {endpoint}")]
    Status { endpoint: String, status: u16 },

    #[error("Missing required environment variables: {}", .0.join(", "))]
    MissingConfig(Vec<String>),

    #[error("Invalid configuration value for {name}: {reason}")]
    InvalidConfig { name: String, reason: String },

    #[error("Lookback window of {hours} hours is outside 1..={max}", max = crate::fetcher::MAX_HOURS_BACK)]
    InvalidLookback { hours: i64 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Failed to build email: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("Completion response had no content")]
    EmptyCompletion,
}

pub type Result<T> = std::result::Result<T, DigestError>;
