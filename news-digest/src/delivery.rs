//! Email delivery for the generated digest.

use crate::types::Result;
use async_trait::async_trait;
use chrono::{DateTime, Local};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{error, info};

pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// A composed plain-text email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Sink for outgoing email.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

/// SMTP submission with STARTTLS and login.
pub struct SmtpMailer {
    config: SmtpConfig,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<()> {
        let from: Mailbox = email.from.parse()?;
        let to: Mailbox = email.to.parse()?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(email.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(email.body.clone())?;

        let creds = Credentials::new(self.config.username.clone(), self.config.password.clone());

        // Built without connection pooling, so the session is closed as part of every send.
        let mailer: AsyncSmtpTransport<Tokio1Executor> =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.host)?
                .port(self.config.port)
                .credentials(creds)
                .build();

        mailer.send(message).await?;
        Ok(())
    }
}

/// Prints the email instead of sending it.
pub struct StdoutMailer;

#[async_trait]
impl Mailer for StdoutMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<()> {
        println!("From: {}\nTo: {}\nSubject: {}\n{}", email.from, email.to, email.subject, email.body);
        Ok(())
    }
}

pub fn compose_subject(now: DateTime<Local>, article_count: usize) -> String {
    format!(
        "Daily News Summary - {} ({} articles)",
        now.format("%B %d, %Y"),
        article_count
    )
}

pub fn compose_body(summary: &str, article_count: usize, now: DateTime<Local>) -> String {
    format!(
        "\nGood morning!\n\n\
         Here's your daily news summary based on {} articles from your Feedbin subscriptions:\n\n\
         {}\n\n\
         ---\n\
         This summary was automatically generated from your Feedbin feeds.\n\
         Generated on {}\n",
        article_count,
        summary,
        now.format("%Y-%m-%d at %I:%M %p")
    )
}

/// Composes the digest email and hands it to a [`Mailer`].
pub struct DigestDelivery {
    mailer: Box<dyn Mailer>,
    from: String,
    to: String,
}

impl DigestDelivery {
    pub fn new(mailer: Box<dyn Mailer>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            mailer,
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn compose(&self, summary: &str, article_count: usize) -> OutgoingEmail {
        let now = Local::now();
        OutgoingEmail {
            from: self.from.clone(),
            to: self.to.clone(),
            subject: compose_subject(now, article_count),
            body: compose_body(summary, article_count, now),
        }
    }

    /// Send one digest email. Failures are logged and reported as `false`, never returned.
    pub async fn deliver(&self, summary: &str, article_count: usize) -> bool {
        let email = self.compose(summary, article_count);

        match self.mailer.send(&email).await {
            Ok(()) => {
                info!(to = %email.to, subject = %email.subject, "Summary email sent successfully");
                true
            }
            Err(e) => {
                error!("Error sending email: {}", e);
                false
            }
        }
    }
}
