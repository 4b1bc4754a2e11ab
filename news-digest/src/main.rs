use clap::Parser;
use news_digest::fetcher::MAX_HOURS_BACK;
use news_digest::{
    Config, DigestDelivery, DigestError, DigestPipeline, Fetcher, Mailer, OpenAiAdapter, SmtpMailer,
    StdoutMailer, Summarizer,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Summarize recent Feedbin articles and email the digest.
#[derive(Debug, Parser)]
#[command(name = "news-digest", version)]
struct Cli {
    /// Lookback window in hours
    #[arg(long, default_value_t = 24, value_parser = clap::value_parser!(i64).range(1..=MAX_HOURS_BACK))]
    hours_back: i64,

    /// Print the email to stdout instead of sending it
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(DigestError::MissingConfig(missing)) => {
            error!("Missing required environment variables:");
            for name in &missing {
                error!("  - {}", name);
            }
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    let fetcher = Fetcher::new(config.fetch_config())?;
    let summarizer = Summarizer::new(Box::new(OpenAiAdapter::new(config.openai_config())?));
    let mailer: Box<dyn Mailer> = if cli.dry_run {
        info!("Dry run: the digest will be printed, not emailed");
        Box::new(StdoutMailer)
    } else {
        Box::new(SmtpMailer::new(config.smtp_config()))
    };
    let delivery = DigestDelivery::new(mailer, &config.email_user, &config.recipient_email);

    let mut pipeline = DigestPipeline::new(fetcher, summarizer, delivery);
    let report = pipeline.run(cli.hours_back).await;

    info!(
        articles = report.digest.article_count,
        email_sent = report.email_sent,
        "Run finished"
    );
    Ok(())
}
