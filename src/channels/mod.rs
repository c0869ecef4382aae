//! Channel adapters: webhook payload → [`InboundMessage`].
//!
//! Adapters are pure transformations: no I/O, no LLM, no state.
//! A payload that carries nothing to categorize (outgoing SMS, provider
//! handshake, status callback) becomes a [`SkipSignal`], not an error.
//! Only the direct test channel can reject input outright.

pub mod direct;
pub mod email;
pub mod sms;
pub mod whatsapp;

pub use direct::DirectAdapter;
pub use email::EmailAdapter;
pub use sms::SmsAdapter;
pub use whatsapp::{Verification, WhatsAppAdapter, verify_subscription};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::ValidationError;
use crate::pipeline::types::{InboundMessage, MessageChannel};

/// A valid event that needs no categorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkipSignal {
    /// Human-readable note returned to the webhook caller.
    pub reason: String,
}

impl SkipSignal {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// What an adapter made of a payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Adapted {
    Message(InboundMessage),
    Skip(SkipSignal),
}

impl Adapted {
    pub fn skip(reason: impl Into<String>) -> Self {
        Self::Skip(SkipSignal::new(reason))
    }
}

/// Per-channel webhook mapping.
pub trait ChannelAdapter: Send + Sync {
    fn channel(&self) -> MessageChannel;

    fn adapt(&self, payload: serde_json::Value) -> Result<Adapted, ValidationError>;
}

/// Decode a payload into the channel's shape; a mismatch is a skip.
fn decode<T: DeserializeOwned>(
    channel: MessageChannel,
    payload: serde_json::Value,
) -> Result<T, SkipSignal> {
    serde_json::from_value(payload).map_err(|e| {
        tracing::debug!(%channel, error = %e, "Unrecognized webhook payload");
        SkipSignal::new(format!("Unrecognized {channel} payload"))
    })
}

/// Drop blank strings; anything else is kept exactly as received.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_keeps_text_verbatim() {
        assert_eq!(non_empty(Some("  hi \n".into())), Some("  hi \n".into()));
        assert_eq!(non_empty(Some("   ".into())), None);
        assert_eq!(non_empty(None), None);
    }

    #[test]
    fn skip_signal_serializes_reason() {
        let json = serde_json::to_value(SkipSignal::new("Outgoing message ignored")).unwrap();
        assert_eq!(json["reason"], "Outgoing message ignored");
    }
}
