//! Per-run seen-address tracking.

use std::collections::HashSet;

/// Addresses already processed in the current run.
///
/// Comparison is on the exact trimmed string, so `Bob@x.com` and
/// `bob@x.com` are different entries. Create one per run and drop it when
/// the run ends.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<String>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seen(&self, address: &str) -> bool {
        self.seen.contains(address)
    }

    /// Record an address. Returns `true` if it was not seen before.
    pub fn record_seen(&mut self, address: &str) -> bool {
        if self.seen.contains(address) {
            return false;
        }
        self.seen.insert(address.to_string())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_then_seen() {
        let mut dedup = Deduplicator::new();
        assert!(!dedup.seen("bob@x.com"));
        assert!(dedup.record_seen("bob@x.com"));
        assert!(dedup.seen("bob@x.com"));
        assert_eq!(dedup.len(), 1);
    }

    #[test]
    fn record_is_idempotent() {
        let mut dedup = Deduplicator::new();
        dedup.record_seen("bob@x.com");
        assert!(!dedup.record_seen("bob@x.com"));
        assert_eq!(dedup.len(), 1);
    }

    #[test]
    fn comparison_is_case_sensitive() {
        let mut dedup = Deduplicator::new();
        dedup.record_seen("bob@x.com");
        assert!(!dedup.seen("Bob@x.com"));
    }
}
