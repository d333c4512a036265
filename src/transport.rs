//! Message transport: the seam between the engine and a mail system.
//!
//! [`SmtpRelay`] delivers through lettre's blocking SMTP client; the call runs
//! on tokio's blocking pool and is awaited before the next row is read, so
//! delivery stays strictly sequential.

use async_trait::async_trait;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport as LettreTransport};
use secrecy::ExposeSecret;

use crate::config::{SmtpConfig, SmtpTls};
use crate::error::TransportError;

/// Delivers one assembled message. A failure aborts the run.
#[async_trait]
pub trait Transport: Send + Sync {
    fn name(&self) -> &str;

    async fn send(&self, message: &Message) -> Result<(), TransportError>;
}

/// Comma-separated envelope recipients, for logs and errors.
pub fn envelope_recipients(message: &Message) -> String {
    message
        .envelope()
        .to()
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

// ── SMTP ────────────────────────────────────────────────────────────

/// SMTP relay transport.
pub struct SmtpRelay {
    host: String,
    transport: SmtpTransport,
}

impl SmtpRelay {
    pub fn new(config: &SmtpConfig) -> Result<Self, TransportError> {
        let builder = match config.tls {
            SmtpTls::StartTls => SmtpTransport::starttls_relay(&config.host),
            SmtpTls::Tls => SmtpTransport::relay(&config.host),
            SmtpTls::None => Ok(SmtpTransport::builder_dangerous(&config.host)),
        }
        .map_err(|e| TransportError::Setup(format!("SMTP relay error: {e}")))?;

        let mut builder = builder.port(config.port).timeout(Some(config.timeout));

        if !config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.username.clone(),
                config.password.expose_secret().to_string(),
            ));
        }

        tracing::info!(
            "SMTP relay {}:{} ({:?}, timeout {:?})",
            config.host,
            config.port,
            config.tls,
            config.timeout
        );

        Ok(Self {
            host: config.host.clone(),
            transport: builder.build(),
        })
    }
}

#[async_trait]
impl Transport for SmtpRelay {
    fn name(&self) -> &str {
        &self.host
    }

    async fn send(&self, message: &Message) -> Result<(), TransportError> {
        let recipient = envelope_recipients(message);
        let transport = self.transport.clone();
        let message = message.clone();

        tokio::task::spawn_blocking(move || transport.send(&message))
            .await
            .map_err(|e| TransportError::SendFailed {
                recipient: recipient.clone(),
                reason: format!("send task failed: {e}"),
            })?
            .map_err(|e| TransportError::SendFailed {
                recipient: recipient.clone(),
                reason: format!("SMTP send failed: {e}"),
            })?;

        tracing::info!("Email sent to {recipient}");
        Ok(())
    }
}

// ── Disabled ────────────────────────────────────────────────────────

/// Transport for preview runs. Any use is an error.
#[derive(Debug, Default)]
pub struct DisabledTransport;

#[async_trait]
impl Transport for DisabledTransport {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn send(&self, _message: &Message) -> Result<(), TransportError> {
        Err(TransportError::Disabled)
    }
}
