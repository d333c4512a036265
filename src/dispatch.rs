//! Dispatch controller: what happens to each assembled message.
//!
//! The mode is fixed at construction:
//! - `Preview` assembles and logs, never transmits
//! - `Send` transmits to the real recipient
//! - `Test` transmits one message to the operator's test address and
//!   returns [`Dispatch::Stop`], ending the run

use lettre::message::Mailbox;
use tracing::{debug, info};

use crate::config::Mode;
use crate::error::{ConfigError, Result};
use crate::message::{EmailAssembler, RenderedMessage};
use crate::transport::Transport;

/// What the row loop should do after a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Continue,
    Stop,
}

pub struct DispatchController {
    mode: Mode,
    test_address: Option<Mailbox>,
}

impl DispatchController {
    /// Test mode requires a test address.
    pub fn new(mode: Mode, test_address: Option<Mailbox>) -> std::result::Result<Self, ConfigError> {
        if mode == Mode::Test && test_address.is_none() {
            return Err(ConfigError::MissingTestAddress);
        }
        Ok(Self { mode, test_address })
    }

    /// One console line for an accepted row.
    pub fn notice(&self, recipient: &str) -> String {
        match (&self.mode, &self.test_address) {
            (Mode::Test, Some(test)) => format!("test: {recipient} (redirected to {test})"),
            (Mode::Send, _) => format!("sending: {recipient}"),
            _ => format!("preview: {recipient}"),
        }
    }

    /// Assemble `rendered` and act on it according to the mode.
    pub async fn dispatch(
        &self,
        mut rendered: RenderedMessage,
        assembler: &EmailAssembler,
        transport: &dyn Transport,
    ) -> Result<Dispatch> {
        if let (Mode::Test, Some(test)) = (self.mode, &self.test_address) {
            debug!("Redirecting {} to test address {test}", rendered.recipient);
            rendered.recipient = test.to_string();
        }

        let message = assembler.assemble(&rendered)?;

        match self.mode {
            Mode::Preview => {
                info!("[preview] To: {} | Subject: {}", rendered.recipient, rendered.subject);
                debug!("[preview] Body:\n{}", rendered.body);
                Ok(Dispatch::Continue)
            }
            Mode::Send => {
                transport.send(&message).await?;
                Ok(Dispatch::Continue)
            }
            Mode::Test => {
                transport.send(&message).await?;
                info!("Test message sent to {}, stopping", rendered.recipient);
                Ok(Dispatch::Stop)
            }
        }
    }
}
