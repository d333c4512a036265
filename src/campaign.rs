//! Campaign: validated configuration plus the row-processing loop.
//!
//! Construction does every pre-run check (sender, modes, body template,
//! test address) so a bad configuration fails before the recipient source
//! is opened. [`Campaign::run`] then walks the rows strictly in order:
//! validate → dedup → render → assemble → dispatch, one row at a time.

use std::io::{Read, Write};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::config::{CampaignConfig, Mode};
use crate::dedup::Deduplicator;
use crate::dispatch::{Dispatch, DispatchController};
use crate::error::{ConfigError, Result};
use crate::message::{BasicHtmlRenderer, EmailAssembler, RenderedMessage};
use crate::recipients::{RecipientReader, RecipientRecord, normalize_address};
use crate::sanitize::sanitize;
use crate::template::{CompiledTemplate, Slot};
use crate::transport::Transport;

/// Outcome of the validation and dedup gates for one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Accepted { address: String },
    SkippedDuplicate,
    SkippedInvalid,
}

/// Counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub rows: u64,
    pub accepted: u64,
    pub dispatched: u64,
    pub skipped_invalid: u64,
    pub skipped_duplicate: u64,
    /// The run ended early after a test dispatch.
    pub stopped: bool,
}

/// A ready-to-run campaign. Immutable once built.
pub struct Campaign {
    config: CampaignConfig,
    subject: CompiledTemplate,
    body: CompiledTemplate,
    assembler: EmailAssembler,
    controller: DispatchController,
}

impl Campaign {
    pub fn new(config: CampaignConfig) -> Result<Self> {
        let body_source = sanitize(&config.body.load()?);
        if body_source.trim().is_empty() {
            return Err(ConfigError::EmptyBody.into());
        }

        let subject = CompiledTemplate::compile(Slot::Subject, &config.subject)
            .map_err(ConfigError::from)?;
        let body = CompiledTemplate::compile(Slot::Body, &body_source).map_err(ConfigError::from)?;

        let controller = DispatchController::new(config.mode, config.test_address.clone())?;

        let mut assembler = EmailAssembler::new(config.sender.clone());
        if config.html {
            assembler = assembler.with_html(Box::new(BasicHtmlRenderer::new()?));
        }

        debug!(
            "Campaign ready: mode={}, sender={}, html={}",
            config.mode.label(),
            config.sender.mailbox(),
            config.html
        );

        Ok(Self {
            config,
            subject,
            body,
            assembler,
            controller,
        })
    }

    pub fn config(&self) -> &CampaignConfig {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.config.mode
    }

    /// Open the recipient file at `path` and run over it.
    pub async fn run_file<W: Write>(
        &self,
        path: &Path,
        transport: &dyn Transport,
        console: &mut W,
    ) -> Result<RunSummary> {
        let reader = RecipientReader::open(path, self.config.delimiter)?;
        self.run(reader, transport, console).await
    }

    /// Process every row of `reader`.
    ///
    /// Stops at the first fatal error (malformed row, unknown placeholder,
    /// transport failure) or after the single test-mode dispatch.
    pub async fn run<R: Read, W: Write>(
        &self,
        reader: RecipientReader<R>,
        transport: &dyn Transport,
        console: &mut W,
    ) -> Result<RunSummary> {
        let mut dedup = Deduplicator::new();
        let mut summary = RunSummary::default();

        info!("Starting {} run via {}", self.mode().label(), transport.name());

        for row in reader {
            let record = row?;
            summary.rows += 1;

            let address = match gate(&record, &mut dedup) {
                RowOutcome::Accepted { address } => address,
                RowOutcome::SkippedInvalid => {
                    debug!("Row {}: missing or invalid email, skipped", summary.rows);
                    summary.skipped_invalid += 1;
                    continue;
                }
                RowOutcome::SkippedDuplicate => {
                    debug!("Row {}: duplicate address, skipped", summary.rows);
                    summary.skipped_duplicate += 1;
                    continue;
                }
            };
            summary.accepted += 1;

            let rendered = self.render(&record, address)?;
            if let Err(e) = writeln!(console, "{}", self.controller.notice(&rendered.recipient)) {
                warn!("Console write failed for row {}: {e}", summary.rows);
            }

            let next = self
                .controller
                .dispatch(rendered, &self.assembler, transport)
                .await?;
            if self.mode().transmits() {
                summary.dispatched += 1;
            }

            if next == Dispatch::Stop {
                summary.stopped = true;
                break;
            }
        }

        info!(
            "Run finished: {} rows, {} accepted, {} dispatched, {} invalid, {} duplicate{}",
            summary.rows,
            summary.accepted,
            summary.dispatched,
            summary.skipped_invalid,
            summary.skipped_duplicate,
            if summary.stopped { " (stopped after test)" } else { "" }
        );
        Ok(summary)
    }

    fn render(&self, record: &RecipientRecord, recipient: String) -> Result<RenderedMessage> {
        Ok(RenderedMessage {
            recipient,
            subject: self.subject.render(record)?,
            body: self.body.render(record)?,
        })
    }
}

/// Address validation and dedup for one row.
///
/// Invalid rows never touch the seen set; accepted rows are recorded.
pub fn gate(record: &RecipientRecord, dedup: &mut Deduplicator) -> RowOutcome {
    let Some(address) = normalize_address(record.email()) else {
        return RowOutcome::SkippedInvalid;
    };
    if dedup.seen(&address) {
        return RowOutcome::SkippedDuplicate;
    }
    dedup.record_seen(&address);
    RowOutcome::Accepted { address }
}
