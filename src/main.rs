use std::process::ExitCode;

use mail_merge::config::{SmtpConfig, recipients_path_from_env};
use mail_merge::error::{ConfigError, Error};
use mail_merge::transport::{DisabledTransport, SmtpRelay, Transport};
use mail_merge::{Campaign, CampaignConfig, Mode};

const USAGE: &str = "usage: mail-merge [--send | --test] [--html]";

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Install rustls crypto provider before any TLS usage
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        tracing::debug!("rustls crypto provider already installed");
    }

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let mut send = false;
    let mut test = false;
    let mut html = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--send" => send = true,
            "--test" => test = true,
            "--html" => html = true,
            "-h" | "--help" => {
                eprintln!("{USAGE}");
                return Ok(ExitCode::SUCCESS);
            }
            other => {
                eprintln!("Error: unknown argument {other:?}\n{USAGE}");
                return Ok(ExitCode::from(2));
            }
        }
    }

    match run(send, test, html).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) if e.is_config() => {
            eprintln!("Error: {e}");
            Ok(ExitCode::from(2))
        }
        Err(e) => Err(e.into()),
    }
}

async fn run(send: bool, test: bool, html: bool) -> Result<(), Error> {
    let config = CampaignConfig::from_env(send, test, html)?;
    let recipients = recipients_path_from_env()?;
    let campaign = Campaign::new(config)?;

    eprintln!("📨 Mail Merge v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Mode: {}", campaign.mode().label());
    eprintln!("   Sender: {}", campaign.config().sender.mailbox());
    eprintln!("   Recipients: {}", recipients.display());
    if let Some(test_address) = &campaign.config().test_address {
        eprintln!("   Test address: {test_address}");
    }
    eprintln!();

    let transport: Box<dyn Transport> = match campaign.mode() {
        Mode::Preview => Box::new(DisabledTransport),
        Mode::Send | Mode::Test => {
            let smtp = SmtpConfig::from_env().ok_or_else(|| ConfigError::MissingRequired {
                key: "SMTP_HOST".into(),
                hint: "SMTP settings are required for --send and --test".into(),
            })?;
            Box::new(SmtpRelay::new(&smtp)?)
        }
    };

    let mut stdout = std::io::stdout().lock();
    let summary = campaign
        .run_file(&recipients, transport.as_ref(), &mut stdout)
        .await?;

    eprintln!(
        "\n   {} accepted, {} dispatched, {} skipped",
        summary.accepted,
        summary.dispatched,
        summary.skipped_invalid + summary.skipped_duplicate
    );
    Ok(())
}
