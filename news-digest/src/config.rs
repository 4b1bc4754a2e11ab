//! Environment-driven configuration.

use crate::delivery::{SmtpConfig, DEFAULT_SMTP_HOST, DEFAULT_SMTP_PORT};
use crate::llm_adapter::{OpenAiConfig, DEFAULT_MODEL};
use crate::types::{DigestError, FetchConfig, Result};
use url::Url;

pub const DEFAULT_FEEDBIN_BASE_URL: &str = "https://api.feedbin.com/v2";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Variables that must be set (and non-empty) before a run starts.
pub const REQUIRED_VARS: &[&str] = &[
    "FEEDBIN_EMAIL",
    "FEEDBIN_PASSWORD",
    "OPENAI_API_KEY",
    "EMAIL_USER",
    "EMAIL_PASSWORD",
    "RECIPIENT_EMAIL",
];

#[derive(Debug, Clone)]
pub struct Config {
    pub feedbin_base_url: String,
    pub feedbin_email: String,
    pub feedbin_password: String,
    pub openai_base_url: String,
    pub openai_api_key: String,
    pub openai_model: String,
    pub smtp_server: String,
    pub smtp_port: u16,
    pub email_user: String,
    pub email_password: String,
    pub recipient_email: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    ///
    /// Every required variable is checked before returning, so the error
    /// lists all missing names at once.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let missing: Vec<String> = REQUIRED_VARS
            .iter()
            .filter(|name| get(**name).is_none())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(DigestError::MissingConfig(missing));
        }

        let required = |name: &str| get(name).unwrap_or_default();

        let feedbin_base_url = get("FEEDBIN_BASE_URL").unwrap_or_else(|| DEFAULT_FEEDBIN_BASE_URL.to_string());
        let openai_base_url = get("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string());
        Url::parse(&feedbin_base_url)?;
        Url::parse(&openai_base_url)?;

        let smtp_port = match get("SMTP_PORT") {
            Some(port) => port.parse().map_err(|_| DigestError::InvalidConfig {
                name: "SMTP_PORT".to_string(),
                reason: format!("'{}' is not a valid port", port),
            })?,
            None => DEFAULT_SMTP_PORT,
        };

        Ok(Self {
            feedbin_base_url,
            feedbin_email: required("FEEDBIN_EMAIL"),
            feedbin_password: required("FEEDBIN_PASSWORD"),
            openai_base_url,
            openai_api_key: required("OPENAI_API_KEY"),
            openai_model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            smtp_server: get("SMTP_SERVER").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
            smtp_port,
            email_user: required("EMAIL_USER"),
            email_password: required("EMAIL_PASSWORD"),
            recipient_email: required("RECIPIENT_EMAIL"),
        })
    }

    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig::new(&self.feedbin_base_url, &self.feedbin_email, &self.feedbin_password)
    }

    pub fn openai_config(&self) -> OpenAiConfig {
        OpenAiConfig::new(&self.openai_base_url, &self.openai_api_key).with_model(&self.openai_model)
    }

    pub fn smtp_config(&self) -> SmtpConfig {
        SmtpConfig {
            host: self.smtp_server.clone(),
            port: self.smtp_port,
            username: self.email_user.clone(),
            password: self.email_password.clone(),
        }
    }
}
