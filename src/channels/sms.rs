//! SMS channel: OpenPhone message webhooks.
//!
//! Payload: `{ body, from: { phoneNumber } | "+1555…", direction }`.
//! Only `direction == "incoming"` is categorized; OpenPhone also reports the
//! messages we send, and those are acknowledged and dropped.

use serde::Deserialize;

use super::{Adapted, ChannelAdapter, decode, non_empty};
use crate::error::ValidationError;
use crate::pipeline::types::{InboundMessage, MessageChannel};

const INCOMING: &str = "incoming";

#[derive(Debug, Deserialize)]
struct SmsPayload {
    body: Option<String>,
    from: Option<SmsSender>,
    direction: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SmsSender {
    Number(String),
    Contact {
        #[serde(rename = "phoneNumber")]
        phone_number: Option<String>,
    },
}

impl SmsSender {
    fn into_number(self) -> Option<String> {
        match self {
            Self::Number(n) => Some(n),
            Self::Contact { phone_number } => phone_number,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SmsAdapter;

impl ChannelAdapter for SmsAdapter {
    fn channel(&self) -> MessageChannel {
        MessageChannel::Sms
    }

    fn adapt(&self, payload: serde_json::Value) -> Result<Adapted, ValidationError> {
        let payload: SmsPayload = match decode(self.channel(), payload) {
            Ok(p) => p,
            Err(skip) => return Ok(Adapted::Skip(skip)),
        };

        let direction = payload.direction.unwrap_or_default();
        if !direction.eq_ignore_ascii_case(INCOMING) {
            let shown = if direction.is_empty() { "unknown" } else { direction.as_str() };
            return Ok(Adapted::skip(format!(
                "Ignored {shown} message (only incoming messages are categorized)"
            )));
        }

        let Some(text) = non_empty(payload.body) else {
            return Ok(Adapted::skip("Incoming message has no body"));
        };
        let Some(from) = non_empty(payload.from.and_then(SmsSender::into_number)) else {
            return Ok(Adapted::skip("Incoming message has no sender phone number"));
        };

        Ok(Adapted::Message(InboundMessage::new(
            text,
            from,
            MessageChannel::Sms,
        )))
    }
}
