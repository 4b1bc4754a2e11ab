use crate::cost::UsageTracker;
use crate::llm_adapter::LlmAdapter;
use crate::normalize::{clean_text, truncate_chars};
use crate::types::Article;
use tracing::{error, info};

/// Most articles embedded in one prompt. The rest are dropped.
pub const MAX_ARTICLES: usize = 20;

/// Longest cleaned article body, in characters, before truncation.
pub const MAX_BODY_CHARS: usize = 500;

pub const NO_ARTICLES_PLACEHOLDER: &str = "No new articles found in the specified time period.";

const INSTRUCTIONS: &str = "Format the summary as follows:
1. Start with a brief overview paragraph
2. Group similar stories together
3. For each story/topic, provide:
   - A clear headline
   - A 2-3 sentence summary
   - Key sources mentioned
4. End with any notable trends or patterns";

/// Digest text returned when the completion request fails.
pub fn fallback_summary(article_count: usize) -> String {
    format!("Error generating summary. Found {} articles.", article_count)
}

/// Numbered article blocks for at most [`MAX_ARTICLES`] articles.
pub fn format_articles(articles: &[Article]) -> String {
    let mut text = String::new();
    for (i, article) in articles.iter().take(MAX_ARTICLES).enumerate() {
        let body = truncate_chars(&clean_text(article.body()), MAX_BODY_CHARS);
        text.push_str(&format!(
            "\nArticle {}:\nTitle: {}\nSource: {}\nSummary: {}\nURL: {}\n\n",
            i + 1,
            article.title,
            article.feed_name,
            body,
            article.url
        ));
    }
    text
}

pub fn build_prompt(articles: &[Article]) -> String {
    format!(
        "Please create a concise daily news summary from the following articles.\n\n\
         {}\n\n\
         Here are today's articles:\n{}\n\
         Please focus on the most important and interesting stories, and make the summary engaging and easy to read.",
        INSTRUCTIONS,
        format_articles(articles)
    )
}

/// Turns a batch of articles into one digest through an [`LlmAdapter`].
pub struct Summarizer {
    adapter: Box<dyn LlmAdapter>,
}

impl Summarizer {
    pub fn new(adapter: Box<dyn LlmAdapter>) -> Self {
        Self { adapter }
    }

    pub fn adapter_name(&self) -> String {
        self.adapter.adapter_name()
    }

    /// Summarize `articles`, recording token usage in `usage`.
    ///
    /// Never fails: an empty batch gets a placeholder without calling the
    /// backend, and a failed request gets a fallback naming the article count.
    pub async fn summarize(&self, articles: &[Article], usage: &mut UsageTracker) -> String {
        if articles.is_empty() {
            return NO_ARTICLES_PLACEHOLDER.to_string();
        }

        if articles.len() > MAX_ARTICLES {
            info!(
                "Summarizing the first {} of {} articles",
                MAX_ARTICLES,
                articles.len()
            );
        }

        let prompt = build_prompt(articles);

        match self.adapter.complete(&prompt).await {
            Ok(completion) => {
                let cost = usage.record(self.adapter.model(), &completion.usage);
                info!(
                    "Completion used {} prompt + {} completion tokens (~${:.4})",
                    completion.usage.prompt_tokens, completion.usage.completion_tokens, cost
                );
                completion.text
            }
            Err(e) => {
                error!("Error with {}: {}", self.adapter.adapter_name(), e);
                fallback_summary(articles.len())
            }
        }
    }
}
