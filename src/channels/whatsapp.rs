//! Chat channel: WhatsApp Cloud API webhooks.
//!
//! Meta wraps each delivery as
//! `entry[0].changes[0].value.{messages[0], contacts[0].profile.name}`.
//! Status callbacks (sent/delivered/read) share the endpoint but carry no
//! `messages`, so they come out as skips.
//!
//! Subscription setup is a separate GET handshake, see [`verify_subscription`].

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::{Adapted, ChannelAdapter, decode, non_empty};
use crate::error::ValidationError;
use crate::pipeline::types::{InboundMessage, MessageChannel};

/// Placeholder text for media, location and other non-text messages.
pub const NO_TEXT_CONTENT: &str = "No text content";

const SUBSCRIBE_MODE: &str = "subscribe";

#[derive(Debug, Default, Deserialize)]
struct WebhookPayload {
    #[serde(default)]
    entry: Vec<Entry>,
}

#[derive(Debug, Default, Deserialize)]
struct Entry {
    #[serde(default)]
    changes: Vec<Change>,
}

#[derive(Debug, Default, Deserialize)]
struct Change {
    #[serde(default)]
    value: Option<ChangeValue>,
}

#[derive(Debug, Default, Deserialize)]
struct ChangeValue {
    #[serde(default)]
    messages: Vec<ChatMessage>,
    #[serde(default)]
    contacts: Vec<Contact>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    from: Option<String>,
    text: Option<TextBody>,
}

#[derive(Debug, Deserialize)]
struct TextBody {
    body: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Contact {
    wa_id: Option<String>,
    profile: Option<Profile>,
}

#[derive(Debug, Deserialize)]
struct Profile {
    name: Option<String>,
}

impl ChangeValue {
    /// Profile name of the contact who sent `from`, or of the only contact.
    fn sender_name(&self, from: &str) -> Option<String> {
        let contact = self
            .contacts
            .iter()
            .find(|c| c.wa_id.as_deref() == Some(from))
            .or_else(|| self.contacts.first())?;
        non_empty(contact.profile.as_ref()?.name.clone())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WhatsAppAdapter;

impl ChannelAdapter for WhatsAppAdapter {
    fn channel(&self) -> MessageChannel {
        MessageChannel::Whatsapp
    }

    fn adapt(&self, payload: serde_json::Value) -> Result<Adapted, ValidationError> {
        let payload: WebhookPayload = match decode(self.channel(), payload) {
            Ok(p) => p,
            Err(skip) => return Ok(Adapted::Skip(skip)),
        };

        let value = payload
            .entry
            .into_iter()
            .next()
            .and_then(|e| e.changes.into_iter().next())
            .and_then(|c| c.value);
        let Some(mut value) = value else {
            return Ok(Adapted::skip("No message in WhatsApp payload"));
        };
        if value.messages.is_empty() {
            return Ok(Adapted::skip("No message in WhatsApp payload"));
        }
        let message = value.messages.swap_remove(0);

        let Some(from) = non_empty(message.from) else {
            return Ok(Adapted::skip("WhatsApp message has no sender"));
        };
        let text = non_empty(message.text.and_then(|t| t.body))
            .unwrap_or_else(|| NO_TEXT_CONTENT.to_string());

        let mut inbound = InboundMessage::new(text, from, MessageChannel::Whatsapp);
        inbound.tenant_name = value.sender_name(&inbound.from);
        Ok(Adapted::Message(inbound))
    }
}

/// Query string of Meta's subscription handshake.
#[derive(Debug, Default, Deserialize)]
pub struct VerifyParams {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// Echo this challenge back with 200.
    Accepted(String),
    Forbidden,
}

/// Answer the subscription handshake.
///
/// Accepted only when mode is `subscribe` and the token matches the
/// configured secret. With no secret configured nothing is accepted.
pub fn verify_subscription(params: &VerifyParams, secret: Option<&SecretString>) -> Verification {
    let Some(secret) = secret else {
        return Verification::Forbidden;
    };
    match (&params.mode, &params.verify_token, &params.challenge) {
        (Some(mode), Some(token), Some(challenge))
            if mode == SUBSCRIBE_MODE && token == secret.expose_secret() =>
        {
            Verification::Accepted(challenge.clone())
        }
        _ => Verification::Forbidden,
    }
}
