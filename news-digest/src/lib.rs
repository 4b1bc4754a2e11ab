pub mod types;
pub mod config;
pub mod fetcher;
pub mod normalize;
pub mod llm_adapter;
pub mod digest;
pub mod cost;
pub mod delivery;
pub mod pipeline;

pub use types::*;
pub use config::Config;
pub use fetcher::{FeedDirectory, Fetcher};
pub use llm_adapter::{Completion, LlmAdapter, OpenAiAdapter, OpenAiConfig};
pub use digest::Summarizer;
pub use cost::UsageTracker;
pub use delivery::{DigestDelivery, Mailer, OutgoingEmail, SmtpMailer, StdoutMailer};
pub use pipeline::{DigestPipeline, RunReport};
