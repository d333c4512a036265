//! Email assembly: rendered content + sender identity → deliverable message.

use std::time::SystemTime;

use chrono::{DateTime, Utc};
use lettre::Message;
use lettre::message::{Mailbox, MultiPart, SinglePart};
use uuid::Uuid;

use super::HtmlRenderer;
use crate::config::Sender;
use crate::error::MessageError;

/// Per-row rendered content, consumed by the assembler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

/// Builds lettre messages for one sender.
pub struct EmailAssembler {
    sender: Sender,
    html: Option<Box<dyn HtmlRenderer>>,
}

impl EmailAssembler {
    /// Plain-text only assembler.
    pub fn new(sender: Sender) -> Self {
        Self { sender, html: None }
    }

    /// Also attach an HTML alternative produced by `renderer`.
    pub fn with_html(mut self, renderer: Box<dyn HtmlRenderer>) -> Self {
        self.html = Some(renderer);
        self
    }

    pub fn assemble(&self, rendered: &RenderedMessage) -> Result<Message, MessageError> {
        self.assemble_at(rendered, Utc::now())
    }

    /// Assemble with an explicit Date header.
    pub fn assemble_at(
        &self,
        rendered: &RenderedMessage,
        date: DateTime<Utc>,
    ) -> Result<Message, MessageError> {
        let to = rendered
            .recipient
            .parse::<Mailbox>()
            .map_err(|e| MessageError::InvalidAddress {
                address: rendered.recipient.clone(),
                reason: format!("{e}"),
            })?;

        let builder = Message::builder()
            .from(self.sender.mailbox().clone())
            .to(to)
            .subject(rendered.subject.as_str())
            .date(SystemTime::from(date))
            .message_id(Some(self.message_id()));

        let message = match &self.html {
            Some(renderer) => {
                let html = renderer.render(&rendered.body, &rendered.subject)?;
                builder.multipart(MultiPart::alternative_plain_html(
                    rendered.body.clone(),
                    html,
                ))
            }
            None => builder.singlepart(SinglePart::plain(rendered.body.clone())),
        }
        .map_err(|e| MessageError::Build(e.to_string()))?;

        Ok(message)
    }

    fn message_id(&self) -> String {
        format!("<{}@{}>", Uuid::new_v4(), self.sender.domain())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use mail_parser::MessageParser;

    use super::*;
    use crate::message::BasicHtmlRenderer;

    fn sender() -> Sender {
        Sender::parse("Jane Doe <jane@example.com>").unwrap()
    }

    fn rendered() -> RenderedMessage {
        RenderedMessage {
            recipient: "bob@x.com".into(),
            subject: "Hello Bob".into(),
            body: "Hi Bob,\n\nSee you soon.".into(),
        }
    }

    #[test]
    fn plain_message_headers() {
        let date = Utc.with_ymd_and_hms(2024, 3, 5, 10, 30, 0).unwrap();
        let message = EmailAssembler::new(sender()).assemble_at(&rendered(), date).unwrap();
        let raw = message.formatted();
        let text = String::from_utf8_lossy(&raw);

        assert!(text.contains("Content-Type: text/plain"));
        assert!(!text.contains("multipart/alternative"));

        let parsed = MessageParser::default().parse(&raw[..]).unwrap();
        assert_eq!(parsed.subject(), Some("Hello Bob"));
        let from = parsed.from().and_then(|a| a.first()).unwrap();
        assert_eq!(from.address(), Some("jane@example.com"));
        assert_eq!(from.name(), Some("Jane Doe"));
        let to = parsed.to().and_then(|a| a.first()).and_then(|a| a.address());
        assert_eq!(to, Some("bob@x.com"));
        assert_eq!(parsed.date().map(|d| d.year), Some(2024));
        assert_eq!(
            parsed.body_text(0).map(|b| b.trim_end().replace("\r\n", "\n")),
            Some("Hi Bob,\n\nSee you soon.".to_string())
        );
    }

    #[test]
    fn message_id_is_unique_and_uses_sender_domain() {
        let assembler = EmailAssembler::new(sender());
        let a = MessageParser::default()
            .parse(&assembler.assemble(&rendered()).unwrap().formatted()[..])
            .and_then(|m| m.message_id().map(str::to_string))
            .unwrap();
        let b = MessageParser::default()
            .parse(&assembler.assemble(&rendered()).unwrap().formatted()[..])
            .and_then(|m| m.message_id().map(str::to_string))
            .unwrap();
        assert_ne!(a, b);
        assert!(a.ends_with("@example.com"), "message id was {a}");
    }

    #[test]
    fn envelope_targets_recipient() {
        let message = EmailAssembler::new(sender()).assemble(&rendered()).unwrap();
        let to: Vec<String> = message.envelope().to().iter().map(|a| a.to_string()).collect();
        assert_eq!(to, vec!["bob@x.com".to_string()]);
    }

    #[test]
    fn html_alternative() {
        let assembler =
            EmailAssembler::new(sender()).with_html(Box::new(BasicHtmlRenderer::new().unwrap()));
        let raw = assembler.assemble(&rendered()).unwrap().formatted();
        let text = String::from_utf8_lossy(&raw);
        assert!(text.contains("multipart/alternative"));
        assert!(text.contains("text/html"));

        let parsed = MessageParser::default().parse(&raw[..]).unwrap();
        let html = parsed.body_html(0).unwrap();
        assert!(html.contains("<title>Hello Bob</title>"));
        assert!(html.contains("<p>See you soon.</p>"));
    }

    #[test]
    fn invalid_recipient_rejected() {
        let mut bad = rendered();
        bad.recipient = "not an address".into();
        let err = EmailAssembler::new(sender()).assemble(&bad).unwrap_err();
        assert!(matches!(err, MessageError::InvalidAddress { .. }));
    }
}
