mod common;

use common::*;
use news_digest::pipeline::NO_ARTICLES_MESSAGE;
use news_digest::{
    DigestDelivery, DigestPipeline, FetchConfig, Fetcher, Mailer, OpenAiAdapter, OpenAiConfig, Summarizer,
};
use serde_json::{json, Value};
use tracing::info;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    feeds: MockServer,
    llm: MockServer,
    mailer: RecordingMailer,
}

impl Harness {
    async fn start() -> Self {
        init_tracing();
        Self {
            feeds: MockServer::start().await,
            llm: MockServer::start().await,
            mailer: RecordingMailer::new(),
        }
    }

    fn pipeline(&self) -> DigestPipeline {
        self.pipeline_with_mailer(Box::new(self.mailer.clone()))
    }

    fn pipeline_with_mailer(&self, mailer: Box<dyn Mailer>) -> DigestPipeline {
        let fetcher = Fetcher::new(FetchConfig::new(self.feeds.uri(), FEEDBIN_EMAIL, FEEDBIN_PASSWORD)).unwrap();
        let adapter = OpenAiAdapter::new(OpenAiConfig::new(self.llm.uri(), OPENAI_KEY)).unwrap();
        let delivery = DigestDelivery::new(mailer, "digest@example.com", "reader@example.com");
        DigestPipeline::new(fetcher, Summarizer::new(Box::new(adapter)), delivery)
    }

    async fn mount_entries(&self, per_page: &str, body: Value) {
        Mock::given(method("GET"))
            .and(path("/entries.json"))
            .and(query_param("per_page", per_page))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.feeds)
            .await;
    }

    async fn mount_subscriptions(&self) {
        Mock::given(method("GET"))
            .and(path("/subscriptions.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(subscriptions_json()))
            .mount(&self.feeds)
            .await;
    }

    async fn llm_prompts(&self) -> Vec<String> {
        self.llm
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|request| {
                let body: Value = serde_json::from_slice(&request.body).unwrap();
                body["messages"][0]["content"].as_str().unwrap().to_string()
            })
            .collect()
    }
}

#[tokio::test]
async fn test_three_articles_end_to_end() {
    let harness = Harness::start().await;
    harness.mount_entries("50", entries_json(3, 42)).await;
    harness.mount_subscriptions().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_json("Big news today.")))
        .expect(1)
        .mount(&harness.llm)
        .await;

    let mut pipeline = harness.pipeline();
    let report = pipeline.run(24).await;
    info!("Report: {:?}", report);

    assert_eq!(report.digest.article_count, 3);
    assert_eq!(report.digest.text, "Big news today.");
    assert!(report.email_sent);
    assert_eq!(pipeline.usage().requests(), 1);

    let prompts = harness.llm_prompts().await;
    assert_eq!(prompts.len(), 1);
    assert_eq!(prompts[0].matches("\nArticle ").count(), 3);
    assert!(prompts[0].contains("Source: Example News"));
    assert!(prompts[0].contains("Summary: Summary of story 2 & more."));

    let sent = harness.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].subject.contains("(3 articles)"));
    assert!(sent[0].body.contains("Big news today."));
}

#[tokio::test]
async fn test_no_articles_skips_generation() {
    let harness = Harness::start().await;
    harness.mount_entries("50", json!([])).await;
    harness.mount_entries("20", json!([])).await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_json("should not happen")))
        .expect(0)
        .mount(&harness.llm)
        .await;

    let mut pipeline = harness.pipeline();
    let report = pipeline.run(24).await;

    assert_eq!(report.digest.article_count, 0);
    assert_eq!(report.digest.text, NO_ARTICLES_MESSAGE);
    assert!(harness.llm_prompts().await.is_empty());

    let sent = harness.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].subject.contains("(0 articles)"));
    assert!(sent[0].body.contains("No new articles found"));
}

#[tokio::test]
async fn test_generation_failure_still_sends_email() {
    let harness = Harness::start().await;
    harness.mount_entries("50", entries_json(3, 42)).await;
    harness.mount_subscriptions().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": { "message": "boom" } })))
        .expect(1)
        .mount(&harness.llm)
        .await;

    let mut pipeline = harness.pipeline();
    let report = pipeline.run(24).await;

    assert_eq!(report.digest.text, "Error generating summary. Found 3 articles.");
    assert_eq!(pipeline.usage().requests(), 0);

    let sent = harness.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].subject.contains("(3 articles)"));
    assert!(sent[0].body.contains("Error generating summary. Found 3 articles."));
    assert!(!sent[0].body.contains("boom"));
}

#[tokio::test]
async fn test_fallback_entries_flow_through_pipeline() {
    let harness = Harness::start().await;
    harness.mount_entries("50", json!([])).await;
    harness.mount_entries("20", entries_json(2, 7)).await;
    harness.mount_subscriptions().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_json("Older news.")))
        .expect(1)
        .mount(&harness.llm)
        .await;

    let report = harness.pipeline().run(1).await;

    assert_eq!(report.digest.article_count, 2);
    assert!(harness.llm_prompts().await[0].contains("Source: Other Blog"));
    assert!(harness.mailer.sent()[0].subject.contains("(2 articles)"));
}

#[tokio::test]
async fn test_feed_provider_failure_sends_no_articles_email() {
    let harness = Harness::start().await;
    Mock::given(method("GET"))
        .and(path("/entries.json"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&harness.feeds)
        .await;

    let report = harness.pipeline().run(24).await;

    assert_eq!(report.digest.article_count, 0);
    assert!(harness.llm_prompts().await.is_empty());
    assert_eq!(harness.mailer.sent().len(), 1);
}

#[tokio::test]
async fn test_mail_failure_still_completes_run() {
    let harness = Harness::start().await;
    harness.mount_entries("50", entries_json(3, 42)).await;
    harness.mount_subscriptions().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_json("Big news today.")))
        .expect(1)
        .mount(&harness.llm)
        .await;

    let mailer = FailingMailer::default();
    let mut pipeline = harness.pipeline_with_mailer(Box::new(mailer.clone()));
    let report = pipeline.run(24).await;

    assert!(!report.email_sent);
    assert_eq!(report.digest.article_count, 3);
    assert_eq!(report.digest.text, "Big news today.");
    assert_eq!(pipeline.usage().requests(), 1);
    assert_eq!(mailer.attempts(), 1);
}
