use crate::types::{Article, DigestError, FeedbinEntry, FetchConfig, Result, Subscription, UNKNOWN_FEED};
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use tracing::{debug, error, info, warn};

/// Format of the `since` filter accepted by `entries.json`.
pub const SINCE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Longest accepted lookback window, one year.
pub const MAX_HOURS_BACK: i64 = 24 * 365;

/// Cutoff timestamp for a lookback window ending at `now`.
///
/// The window must be between 1 and [`MAX_HOURS_BACK`] hours.
pub fn since_param(now: DateTime<Utc>, hours_back: i64) -> Result<String> {
    if !(1..=MAX_HOURS_BACK).contains(&hours_back) {
        return Err(DigestError::InvalidLookback { hours: hours_back });
    }
    let cutoff = Duration::try_hours(hours_back)
        .and_then(|window| now.checked_sub_signed(window))
        .ok_or(DigestError::InvalidLookback { hours: hours_back })?;
    Ok(cutoff.format(SINCE_FORMAT).to_string())
}

/// Feed id to display title, built from one `subscriptions.json` response.
#[derive(Debug, Clone, Default)]
pub struct FeedDirectory {
    names: HashMap<i64, String>,
}

impl FeedDirectory {
    pub fn from_subscriptions(subscriptions: Vec<Subscription>) -> Self {
        let names = subscriptions
            .into_iter()
            .filter_map(|sub| {
                let feed_id = sub.feed_id?;
                let title = sub.title.unwrap_or_else(|| UNKNOWN_FEED.to_string());
                Some((feed_id, title))
            })
            .collect();
        Self { names }
    }

    pub fn resolve(&self, feed_id: Option<i64>) -> String {
        feed_id
            .filter(|id| *id > 0)
            .and_then(|id| self.names.get(&id))
            .cloned()
            .unwrap_or_else(|| UNKNOWN_FEED.to_string())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Client for the feed reader's entries and subscriptions endpoints.
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .build()?;

        Ok(Self { client, config })
    }

    /// Articles published in the last `hours_back` hours.
    ///
    /// If the time-filtered query comes back empty, one unfiltered query is
    /// issued and its entries are used instead. Any failure yields an empty list.
    pub async fn fetch_recent_articles(&self, hours_back: i64) -> Vec<Article> {
        let since = match since_param(Utc::now(), hours_back) {
            Ok(since) => since,
            Err(e) => {
                error!("Cannot build entries filter: {}", e);
                return Vec::new();
            }
        };
        info!("Fetching entries since {}", since);

        let mut entries = match self.fetch_entries(Some(&since), self.config.per_page).await {
            Ok(entries) => entries,
            Err(e) => {
                error!("Error fetching articles: {}", e);
                return Vec::new();
            }
        };

        if entries.is_empty() {
            warn!(
                "No entries since {}, falling back to the latest {} entries",
                since, self.config.fallback_per_page
            );
            entries = match self.fetch_entries(None, self.config.fallback_per_page).await {
                Ok(entries) => entries,
                Err(e) => {
                    error!("Error fetching fallback articles: {}", e);
                    return Vec::new();
                }
            };
        }

        if entries.is_empty() {
            return Vec::new();
        }

        let directory = if entries.iter().any(|e| e.feed_id.is_some()) {
            self.feed_directory().await
        } else {
            FeedDirectory::default()
        };

        entries
            .into_iter()
            .map(|entry| {
                let feed_name = directory.resolve(entry.feed_id);
                Article::from_entry(entry, feed_name)
            })
            .collect()
    }

    /// One page of entries, optionally filtered to those published after `since`.
    pub async fn fetch_entries(&self, since: Option<&str>, per_page: u32) -> Result<Vec<FeedbinEntry>> {
        let mut query: Vec<(&str, String)> = Vec::with_capacity(2);
        if let Some(since) = since {
            query.push(("since", since.to_string()));
        }
        query.push(("per_page", per_page.to_string()));

        let entries: Vec<FeedbinEntry> = self.get_json("entries.json", &query).await?;
        debug!("entries.json returned {} entries", entries.len());
        Ok(entries)
    }

    pub async fn fetch_subscriptions(&self) -> Result<Vec<Subscription>> {
        self.get_json("subscriptions.json", &[]).await
    }

    /// Lookup table for the whole run. A failed lookup leaves every feed unresolved.
    pub async fn feed_directory(&self) -> FeedDirectory {
        match self.fetch_subscriptions().await {
            Ok(subscriptions) => {
                let directory = FeedDirectory::from_subscriptions(subscriptions);
                debug!("Loaded {} subscriptions", directory.len());
                directory
            }
            Err(e) => {
                warn!("Could not load subscriptions, feed names will be unknown: {}", e);
                FeedDirectory::default()
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), endpoint);

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.config.email, Some(&self.config.password))
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DigestError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.json().await?)
    }
}
