#![allow(dead_code)]

use async_trait::async_trait;
use news_digest::{Completion, DigestError, LlmAdapter, Mailer, OutgoingEmail, TokenUsage};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub const FEEDBIN_EMAIL: &str = "reader@example.com";
pub const FEEDBIN_PASSWORD: &str = "feedbin-secret";
pub const OPENAI_KEY: &str = "sk-test";

/// Mailer that keeps every email it is asked to send.
#[derive(Clone, Default)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<OutgoingEmail>>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> news_digest::Result<()> {
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

/// Mailer whose every send fails like an SMTP auth rejection.
#[derive(Clone, Default)]
pub struct FailingMailer {
    attempts: Arc<AtomicUsize>,
}

impl FailingMailer {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _email: &OutgoingEmail) -> news_digest::Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(DigestError::Status {
            endpoint: "smtp".to_string(),
            status: 535,
        })
    }
}

/// Adapter that records prompts and answers with a canned completion.
#[derive(Clone)]
pub struct CannedAdapter {
    prompts: Arc<Mutex<Vec<String>>>,
    reply: String,
    usage: TokenUsage,
}

impl CannedAdapter {
    pub fn new(reply: &str) -> Self {
        Self {
            prompts: Arc::new(Mutex::new(Vec::new())),
            reply: reply.to_string(),
            usage: TokenUsage {
                prompt_tokens: 1000,
                completion_tokens: 500,
                total_tokens: 1500,
            },
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmAdapter for CannedAdapter {
    fn adapter_name(&self) -> String {
        "Canned".to_string()
    }

    fn model(&self) -> &str {
        "gpt-4"
    }

    async fn complete(&self, prompt: &str) -> news_digest::Result<Completion> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(Completion {
            text: self.reply.clone(),
            usage: self.usage,
        })
    }
}

pub fn entry_json(n: usize, feed_id: i64) -> Value {
    json!({
        "id": 1000 + n,
        "feed_id": feed_id,
        "title": format!("Story {}", n),
        "url": format!("https://news.example.com/story-{}", n),
        "summary": format!("<p>Summary of story {} &amp; more.</p>", n),
        "content": format!("<div>Full content of story {}</div>", n),
        "published": "2026-10-19T06:00:00.000000Z"
    })
}

pub fn entries_json(count: usize, feed_id: i64) -> Value {
    Value::Array((1..=count).map(|n| entry_json(n, feed_id)).collect())
}

pub fn subscriptions_json() -> Value {
    json!([
        { "id": 1, "feed_id": 42, "title": "Example News", "site_url": "https://news.example.com" },
        { "id": 2, "feed_id": 7, "title": "Other Blog", "site_url": "https://blog.example.org" }
    ])
}

pub fn completion_json(content: &str) -> Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "model": "gpt-4",
        "choices": [
            { "index": 0, "message": { "role": "assistant", "content": content }, "finish_reason": "stop" }
        ],
        "usage": { "prompt_tokens": 1200, "completion_tokens": 300, "total_tokens": 1500 }
    })
}
