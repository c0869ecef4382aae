//! Email channel: Gmail push relay.
//!
//! The relay posts `{text, from, subject?}`. Gmail's watch registration and
//! push-subscription pings arrive at the same URL with no content, so a
//! body without both text and sender is acknowledged rather than rejected.

use serde::Deserialize;

use super::{Adapted, ChannelAdapter, decode, non_empty};
use crate::error::ValidationError;
use crate::pipeline::types::{InboundMessage, MessageChannel};

const VERIFICATION_NOTE: &str = "Verification request received (no email content)";

#[derive(Debug, Deserialize)]
struct EmailPayload {
    text: Option<String>,
    from: Option<String>,
    subject: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EmailAdapter;

impl ChannelAdapter for EmailAdapter {
    fn channel(&self) -> MessageChannel {
        MessageChannel::Email
    }

    fn adapt(&self, payload: serde_json::Value) -> Result<Adapted, ValidationError> {
        let payload: EmailPayload = match decode(self.channel(), payload) {
            Ok(p) => p,
            Err(skip) => return Ok(Adapted::Skip(skip)),
        };

        let (Some(body), Some(from)) = (non_empty(payload.text), non_empty(payload.from)) else {
            return Ok(Adapted::skip(VERIFICATION_NOTE));
        };

        let text = match non_empty(payload.subject) {
            Some(subject) => format!("Subject: {subject}\n{body}"),
            None => body,
        };

        Ok(Adapted::Message(InboundMessage::new(
            text,
            from,
            MessageChannel::Email,
        )))
    }
}
