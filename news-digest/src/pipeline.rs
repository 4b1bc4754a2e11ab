use crate::cost::UsageTracker;
use crate::delivery::DigestDelivery;
use crate::digest::Summarizer;
use crate::fetcher::Fetcher;
use crate::types::Digest;
use tracing::info;

pub const NO_ARTICLES_MESSAGE: &str = "No new articles found in your feeds today.";

/// Outcome of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub digest: Digest,
    pub email_sent: bool,
}

/// Fetch, summarize and deliver, one stage after another.
///
/// Every stage degrades to fallback content instead of failing, so a run
/// always ends with exactly one email attempt.
pub struct DigestPipeline {
    fetcher: Fetcher,
    summarizer: Summarizer,
    delivery: DigestDelivery,
    usage: UsageTracker,
}

impl DigestPipeline {
    pub fn new(fetcher: Fetcher, summarizer: Summarizer, delivery: DigestDelivery) -> Self {
        Self {
            fetcher,
            summarizer,
            delivery,
            usage: UsageTracker::new(),
        }
    }

    pub fn usage(&self) -> &UsageTracker {
        &self.usage
    }

    pub async fn run(&mut self, hours_back: i64) -> RunReport {
        info!("Fetching articles from the last {} hours...", hours_back);
        let articles = self.fetcher.fetch_recent_articles(hours_back).await;
        info!("Found {} articles", articles.len());

        if articles.is_empty() {
            info!("No articles found. Sending notification email.");
            let digest = Digest {
                text: NO_ARTICLES_MESSAGE.to_string(),
                article_count: 0,
            };
            let email_sent = self.delivery.deliver(&digest.text, digest.article_count).await;
            return RunReport { digest, email_sent };
        }

        info!("Generating summary with {}...", self.summarizer.adapter_name());
        let text = self.summarizer.summarize(&articles, &mut self.usage).await;
        let digest = Digest {
            text,
            article_count: articles.len(),
        };

        info!("Sending summary email...");
        let email_sent = self.delivery.deliver(&digest.text, digest.article_count).await;

        self.usage.log_summary();
        info!("Daily summary complete!");

        RunReport { digest, email_sent }
    }
}
