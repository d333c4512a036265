//! Subject and body templates.
//!
//! Each slot is compiled once, up front, into an immutable
//! [`CompiledTemplate`] and then rendered against every recipient row.
//! Templates use tera syntax. Placeholders are `{{ column }}`; a column whose
//! header is not an identifier is also bound under an alias with every other
//! character replaced by `_` (`First Name` → `{{ First_Name }}`), and the whole
//! row is available as a map (`{{ row["First Name"] }}`). Referencing a column
//! the row does not have is a render error, never an empty substitution.
//!
//! Because the body is a tera template, literal `{{`, `{%` or `{#` must be
//! wrapped in `{% raw %}...{% endraw %}`.

use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt;

use tera::{Context, Tera};

use crate::error::TemplateError;
use crate::recipients::RecipientRecord;

/// Which template a [`CompiledTemplate`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Subject,
    Body,
}

impl Slot {
    fn name(&self) -> &'static str {
        match self {
            Slot::Subject => "subject",
            Slot::Body => "body",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A compiled template for one slot.
pub struct CompiledTemplate {
    slot: Slot,
    tera: Tera,
}

impl CompiledTemplate {
    pub fn compile(slot: Slot, source: &str) -> Result<Self, TemplateError> {
        let mut tera = Tera::default();
        tera.add_raw_template(slot.name(), source)
            .map_err(|e| TemplateError::Compile {
                slot: slot.to_string(),
                reason: error_chain(&e),
            })?;
        Ok(Self { slot, tera })
    }

    /// Render against one recipient row.
    pub fn render(&self, record: &RecipientRecord) -> Result<String, TemplateError> {
        self.tera
            .render(self.slot.name(), &context(record))
            .map_err(|e| TemplateError::Render {
                slot: self.slot.to_string(),
                reason: error_chain(&e),
            })
    }
}

impl fmt::Debug for CompiledTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledTemplate")
            .field("slot", &self.slot)
            .finish_non_exhaustive()
    }
}

/// Name under which the whole row is bound as a map.
const ROW: &str = "row";

/// Bind every column of the row as a template variable.
///
/// Exact column names win over aliases, and a column named `row` wins over
/// the row map.
fn context(record: &RecipientRecord) -> Context {
    let mut ctx = Context::new();
    let row: HashMap<&str, &str> = record.iter().collect();
    ctx.insert(ROW, &row);

    for (column, value) in record.iter() {
        if let Some(key) = alias(column).filter(|key| record.get(key).is_none()) {
            ctx.insert(key, value);
        }
    }
    for (column, value) in record.iter() {
        ctx.insert(column, value);
    }
    ctx
}

/// Identifier form of a column header, if it differs from the header.
fn alias(column: &str) -> Option<String> {
    let mut alias: String = column
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if alias.starts_with(|c: char| c.is_ascii_digit()) {
        alias.insert(0, '_');
    }
    (!alias.is_empty() && alias != column).then_some(alias)
}

/// Flatten tera's nested errors: the useful detail is usually in `source()`.
fn error_chain(e: &tera::Error) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}
