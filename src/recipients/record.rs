//! One recipient row as an ordered column → value map.

use super::EMAIL_COLUMN;

/// Ordered mapping of column name to value for a single data row.
///
/// Columns keep header order. Lookups are linear, which is fine for the
/// handful of columns a recipient sheet has.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipientRecord {
    fields: Vec<(String, String)>,
}

impl RecipientRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from `(column, value)` pairs, in order.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut record = Self::new();
        for (column, value) in pairs {
            record.insert(column, value);
        }
        record
    }

    /// Set a column. A repeated column name overwrites the earlier value in place.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(c, _)| *c == column) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_str())
    }

    /// Raw (untrimmed) value of the `email` column.
    pub fn email(&self) -> Option<&str> {
        self.get(EMAIL_COLUMN)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(c, v)| (c.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
