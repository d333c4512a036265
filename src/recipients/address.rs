//! Address normalization and syntactic validation.

use email_address::EmailAddress;
use lettre::Address;

/// Trim the raw `email` field and validate it.
///
/// Returns `None` for a missing, empty or syntactically invalid address.
/// The address must satisfy RFC 5322 (`email_address`) and be accepted by
/// the message builder, so a valid row can never fail at assembly time.
pub fn normalize_address(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() || !is_valid_address(trimmed) {
        return None;
    }
    Some(trimmed.to_string())
}

pub fn is_valid_address(address: &str) -> bool {
    EmailAddress::is_valid(address) && address.parse::<Address>().is_ok()
}
