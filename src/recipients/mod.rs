//! Recipient ingestion: streaming CSV reader, row records, address checks.

pub mod address;
pub mod reader;
pub mod record;

pub use address::normalize_address;
pub use reader::RecipientReader;
pub use record::RecipientRecord;

/// Name of the mandatory address column.
pub const EMAIL_COLUMN: &str = "email";
