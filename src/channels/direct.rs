//! Direct test channel: `{text, from, propertyName?, tenantName?}`.
//!
//! The one channel where missing fields are the caller's mistake (400),
//! since nobody but a developer or test script posts here.

use serde::Deserialize;

use super::{Adapted, ChannelAdapter, non_empty};
use crate::error::ValidationError;
use crate::pipeline::types::{InboundMessage, MessageChannel};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DirectPayload {
    text: Option<String>,
    from: Option<String>,
    property_name: Option<String>,
    tenant_name: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DirectAdapter;

impl ChannelAdapter for DirectAdapter {
    fn channel(&self) -> MessageChannel {
        MessageChannel::Test
    }

    fn adapt(&self, payload: serde_json::Value) -> Result<Adapted, ValidationError> {
        let payload: DirectPayload = serde_json::from_value(payload)
            .map_err(|e| ValidationError::InvalidPayload(e.to_string()))?;

        let text = non_empty(payload.text);
        let from = non_empty(payload.from);
        let (text, from) = match (text, from) {
            (Some(text), Some(from)) => (text, from),
            (None, Some(_)) => return Err(ValidationError::MissingField("text")),
            (Some(_), None) => return Err(ValidationError::MissingField("from")),
            (None, None) => return Err(ValidationError::MissingFields(vec!["text", "from"])),
        };

        Ok(Adapted::Message(InboundMessage {
            text,
            from,
            channel: MessageChannel::Test,
            property_name: non_empty(payload.property_name),
            tenant_name: non_empty(payload.tenant_name),
        }))
    }
}
