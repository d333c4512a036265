//! Error types for the mail-merge engine.

/// Top-level error type for a campaign run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Recipient source error: {0}")]
    Source(#[from] SourceError),

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Message error: {0}")]
    Message(#[from] MessageError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

impl Error {
    /// True for failures raised before any recipient row is processed.
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}

/// Configuration-related errors. All of these are fatal and pre-run.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Sender {0:?} has no display name (expected \"Name <address>\")")]
    MissingDisplayName(String),

    #[error("Invalid sender {sender:?}: {reason}")]
    InvalidSender { sender: String, reason: String },

    #[error("The send and test modes are mutually exclusive")]
    ConflictingModes,

    #[error("Recipient source header has no \"email\" column")]
    MissingEmailColumn,

    #[error("Body template is empty")]
    EmptyBody,

    #[error("Body template {path} could not be read: {source}")]
    BodyUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Test mode requires a test address")]
    MissingTestAddress,

    #[error("Invalid test address {address:?}: {reason}")]
    InvalidTestAddress { address: String, reason: String },

    #[error("Missing required configuration: {key}. {hint}")]
    MissingRequired { key: String, hint: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("{0}")]
    Template(#[from] TemplateError),
}

/// Errors reading the tabular recipient source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed row at line {line}: {reason}")]
    Malformed { line: u64, reason: String },
}

/// Template compile and render errors.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Failed to compile {slot} template: {reason}")]
    Compile { slot: String, reason: String },

    #[error("Failed to render {slot} template: {reason}")]
    Render { slot: String, reason: String },
}

/// Message assembly errors.
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("Invalid address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Failed to build message: {0}")]
    Build(String),

    #[error("HTML conversion failed: {0}")]
    Html(String),
}

/// Transport (delivery) errors. Any of these aborts the run.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Failed to send message to {recipient}: {reason}")]
    SendFailed { recipient: String, reason: String },

    #[error("Transport is disabled in preview mode")]
    Disabled,

    #[error("Transport setup failed: {0}")]
    Setup(String),
}

/// Result type alias for the engine.
pub type Result<T> = std::result::Result<T, Error>;
