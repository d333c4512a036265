//! Campaign configuration.
//!
//! A [`CampaignConfig`] is validated once at construction and never mutated
//! afterwards. The binary builds it from environment variables and command
//! line flags; tests build it directly.

use std::path::PathBuf;
use std::time::Duration;

use encoding_rs::WINDOWS_1252;
use lettre::message::Mailbox;
use secrecy::SecretString;

use crate::error::ConfigError;

// ── Sender ──────────────────────────────────────────────────────────

/// Sender identity. Always carries a non-empty display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender(Mailbox);

impl Sender {
    /// Parse `"Display Name <address@domain>"`.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let mailbox = raw.trim().parse::<Mailbox>().map_err(|e| ConfigError::InvalidSender {
            sender: raw.to_string(),
            reason: format!("{e}"),
        })?;

        match mailbox.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Ok(Self(mailbox)),
            _ => Err(ConfigError::MissingDisplayName(raw.to_string())),
        }
    }

    pub fn mailbox(&self) -> &Mailbox {
        &self.0
    }

    pub fn display_name(&self) -> &str {
        self.0.name.as_deref().unwrap_or_default()
    }

    /// Domain part of the sender address, used for Message-ID generation.
    pub fn domain(&self) -> &str {
        self.0.email.domain()
    }
}

// ── Mode ────────────────────────────────────────────────────────────

/// Dispatch mode, fixed for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Render and log only; never transmit.
    #[default]
    Preview,
    /// Transmit every message to its real recipient.
    Send,
    /// Transmit one message to the test address, then stop.
    Test,
}

impl Mode {
    /// Resolve the mode from the `send`/`test` flags.
    pub fn from_flags(send: bool, test: bool) -> Result<Self, ConfigError> {
        match (send, test) {
            (true, true) => Err(ConfigError::ConflictingModes),
            (true, false) => Ok(Mode::Send),
            (false, true) => Ok(Mode::Test),
            (false, false) => Ok(Mode::Preview),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Mode::Preview => "preview",
            Mode::Send => "send",
            Mode::Test => "test",
        }
    }

    pub fn transmits(&self) -> bool {
        !matches!(self, Mode::Preview)
    }
}

// ── Body source ─────────────────────────────────────────────────────

/// Where the raw body template comes from.
#[derive(Debug, Clone)]
pub enum BodySource {
    Inline(String),
    File(PathBuf),
}

impl BodySource {
    /// Load the raw (unsanitized) body text.
    ///
    /// Files that are not valid UTF-8 are decoded as Windows-1252.
    pub fn load(&self) -> Result<String, ConfigError> {
        match self {
            BodySource::Inline(text) => Ok(text.clone()),
            BodySource::File(path) => {
                let bytes = std::fs::read(path).map_err(|source| ConfigError::BodyUnreadable {
                    path: path.display().to_string(),
                    source,
                })?;
                Ok(decode_body(bytes, &path.display().to_string()))
            }
        }
    }
}

fn decode_body(bytes: Vec<u8>, origin: &str) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("Body template {origin} is not UTF-8, decoding as Windows-1252");
            let (text, _, _) = WINDOWS_1252.decode(e.as_bytes());
            text.into_owned()
        }
    }
}

// ── Campaign ────────────────────────────────────────────────────────

/// Immutable campaign configuration.
#[derive(Debug, Clone)]
pub struct CampaignConfig {
    pub sender: Sender,
    pub subject: String,
    pub body: BodySource,
    pub mode: Mode,
    /// Fixed operator address that receives the single TEST message.
    pub test_address: Option<Mailbox>,
    /// Attach an HTML alternative rendered from the plain body.
    pub html: bool,
    /// Field delimiter of the recipient source.
    pub delimiter: u8,
}

impl CampaignConfig {
    pub fn new(
        sender: &str,
        subject: impl Into<String>,
        body: BodySource,
        send: bool,
        test: bool,
    ) -> Result<Self, ConfigError> {
        let sender = Sender::parse(sender)?;
        let mode = Mode::from_flags(send, test)?;
        Ok(Self {
            sender,
            subject: subject.into(),
            body,
            mode,
            test_address: None,
            html: false,
            delimiter: b',',
        })
    }

    pub fn with_test_address(mut self, address: &str) -> Result<Self, ConfigError> {
        let mailbox = address
            .trim()
            .parse::<Mailbox>()
            .map_err(|e| ConfigError::InvalidTestAddress {
                address: address.to_string(),
                reason: format!("{e}"),
            })?;
        self.test_address = Some(mailbox);
        Ok(self)
    }

    pub fn with_html(mut self, html: bool) -> Self {
        self.html = html;
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Build config from `MERGE_*` environment variables plus mode flags.
    pub fn from_env(send: bool, test: bool, html: bool) -> Result<Self, ConfigError> {
        let sender = required_env("MERGE_SENDER", "e.g. MERGE_SENDER=\"Jane Doe <jane@example.com>\"")?;
        let subject = required_env("MERGE_SUBJECT", "subject template, may use {{ column }}")?;

        let body = match (std::env::var("MERGE_BODY_FILE"), std::env::var("MERGE_BODY")) {
            (Ok(path), _) => BodySource::File(PathBuf::from(path)),
            (Err(_), Ok(text)) => BodySource::Inline(text),
            _ => {
                return Err(ConfigError::MissingRequired {
                    key: "MERGE_BODY_FILE".into(),
                    hint: "set MERGE_BODY_FILE to a template file or MERGE_BODY to inline text".into(),
                });
            }
        };

        let mut config = Self::new(&sender, subject, body, send, test)?.with_html(html);

        if let Ok(address) = std::env::var("MERGE_TEST_ADDRESS") {
            config = config.with_test_address(&address)?;
        }

        if let Ok(delimiter) = std::env::var("MERGE_DELIMITER") {
            config = config.with_delimiter(parse_delimiter(&delimiter)?);
        }

        Ok(config)
    }
}

/// Path of the recipient source, from `MERGE_RECIPIENTS`.
pub fn recipients_path_from_env() -> Result<PathBuf, ConfigError> {
    required_env("MERGE_RECIPIENTS", "path to a CSV file with an \"email\" column").map(PathBuf::from)
}

fn parse_delimiter(raw: &str) -> Result<u8, ConfigError> {
    match raw {
        "\\t" | "tab" => Ok(b'\t'),
        _ if raw.len() == 1 && raw.is_ascii() => Ok(raw.as_bytes()[0]),
        _ => Err(ConfigError::InvalidValue {
            key: "MERGE_DELIMITER".into(),
            message: format!("expected a single ASCII character, got {raw:?}"),
        }),
    }
}

fn required_env(key: &str, hint: &str) -> Result<String, ConfigError> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingRequired {
            key: key.to_string(),
            hint: hint.to_string(),
        })
}

// ── SMTP ────────────────────────────────────────────────────────────

/// How the SMTP connection is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SmtpTls {
    #[default]
    StartTls,
    Tls,
    None,
}

impl SmtpTls {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "starttls" => Some(SmtpTls::StartTls),
            "tls" => Some(SmtpTls::Tls),
            "none" => Some(SmtpTls::None),
            _ => None,
        }
    }
}

/// SMTP relay configuration, built from environment variables.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    pub tls: SmtpTls,
    pub timeout: Duration,
}

impl SmtpConfig {
    /// Build config from `SMTP_*` environment variables.
    /// Returns `None` if `SMTP_HOST` is not set.
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("SMTP_HOST").ok()?;

        let port: u16 = std::env::var("SMTP_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(587);

        let username = std::env::var("SMTP_USERNAME").unwrap_or_default();
        let password = SecretString::from(std::env::var("SMTP_PASSWORD").unwrap_or_default());

        let tls = match std::env::var("SMTP_TLS") {
            Ok(raw) => SmtpTls::parse(&raw).unwrap_or_else(|| {
                tracing::warn!("Unknown SMTP_TLS value {raw:?}, using starttls");
                SmtpTls::StartTls
            }),
            Err(_) => SmtpTls::default(),
        };

        let timeout_secs: u64 = std::env::var("SMTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        Some(Self {
            host,
            port,
            username,
            password,
            tls,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}
