//! Mail Merge — templated campaign mailer.

pub mod campaign;
pub mod config;
pub mod dedup;
pub mod dispatch;
pub mod error;
pub mod message;
pub mod recipients;
pub mod sanitize;
pub mod template;
pub mod transport;

pub use campaign::{Campaign, RowOutcome, RunSummary};
pub use config::{BodySource, CampaignConfig, Mode};
pub use error::{Error, Result};
