//! Shared types for the categorization pipeline.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ── Inbound message ─────────────────────────────────────────────────

/// Source channel of an inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageChannel {
    Sms,
    Email,
    Whatsapp,
    Test,
}

impl MessageChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sms => "sms",
            Self::Email => "email",
            Self::Whatsapp => "whatsapp",
            Self::Test => "test",
        }
    }
}

impl fmt::Display for MessageChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unified inbound message from any channel.
///
/// Channel adapters convert their native webhook payloads into this struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundMessage {
    /// Message body.
    pub text: String,
    /// Sender identifier (phone number, email address, WhatsApp id).
    pub from: String,
    pub channel: MessageChannel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_name: Option<String>,
}

impl InboundMessage {
    pub fn new(text: impl Into<String>, from: impl Into<String>, channel: MessageChannel) -> Self {
        Self {
            text: text.into(),
            from: from.into(),
            channel,
            property_name: None,
            tenant_name: None,
        }
    }

    pub fn with_property(mut self, property_name: impl Into<String>) -> Self {
        self.property_name = Some(property_name.into());
        self
    }

    pub fn with_tenant(mut self, tenant_name: impl Into<String>) -> Self {
        self.tenant_name = Some(tenant_name.into());
        self
    }
}

// ── Context ─────────────────────────────────────────────────────────

/// Optional lines merged into the categorization prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorizationContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_channel: Option<String>,
}

impl CategorizationContext {
    /// Context derived from the message itself, with `overrides` layered on top.
    pub fn for_message(message: &InboundMessage, overrides: &CategorizationContext) -> Self {
        Self {
            property_name: overrides
                .property_name
                .clone()
                .or_else(|| message.property_name.clone()),
            tenant_name: overrides
                .tenant_name
                .clone()
                .or_else(|| message.tenant_name.clone()),
            message_channel: overrides
                .message_channel
                .clone()
                .or_else(|| Some(message.channel.to_string())),
        }
    }
}

// ── Verdict ─────────────────────────────────────────────────────────

/// Message category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Emergency,
    Maintenance,
    Payment,
    Inquiry,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Self::Emergency,
        Self::Maintenance,
        Self::Payment,
        Self::Inquiry,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Emergency => "emergency",
            Self::Maintenance => "maintenance",
            Self::Payment => "payment",
            Self::Inquiry => "inquiry",
            Self::Other => "other",
        }
    }
}

/// How quickly the owner must respond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Urgency {
    /// Owner must be notified immediately.
    Critical,
    /// Response within 4 hours.
    High,
    /// Response within 24 hours.
    Medium,
    /// Response within 2-3 days.
    Low,
}

impl Urgency {
    pub const ALL: [Urgency; 4] = [Self::Critical, Self::High, Self::Medium, Self::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// Models are not consistent about case, so both enums parse leniently
/// and always serialize lowercase.
macro_rules! lenient_enum_serde {
    ($ty:ident, $what:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_ascii_lowercase();
                Self::ALL
                    .into_iter()
                    .find(|v| v.as_str() == wanted)
                    .ok_or_else(|| format!("unknown {} '{}'", $what, s))
            }
        }

        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

lenient_enum_serde!(Category, "category");
lenient_enum_serde!(Urgency, "urgency");

/// Suggested action on the fallback path.
pub const MANUAL_REVIEW_ACTION: &str = "Manual review required";

/// Structured categorization of one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub category: Category,
    pub urgency: Urgency,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub suggested_action: String,
    #[serde(default)]
    pub requires_owner_alert: bool,
    /// Set only on the fallback path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Verdict {
    /// Safe default when the model's answer can't be used.
    pub fn fallback(error: impl Into<String>) -> Self {
        Self {
            category: Category::Other,
            urgency: Urgency::Medium,
            keywords: Vec::new(),
            suggested_action: MANUAL_REVIEW_ACTION.to_string(),
            requires_owner_alert: false,
            error: Some(error.into()),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.error.is_some()
    }
}

// ── Results ─────────────────────────────────────────────────────────

/// A verdict together with the message it was produced for.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorizedMessage {
    #[serde(flatten)]
    pub verdict: Verdict,
    pub original_message: InboundMessage,
    #[serde(serialize_with = "serialize_iso8601")]
    pub timestamp: DateTime<Utc>,
}

impl CategorizedMessage {
    pub fn new(verdict: Verdict, original_message: InboundMessage) -> Self {
        Self {
            verdict,
            original_message,
            timestamp: Utc::now(),
        }
    }
}

fn serialize_iso8601<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Aggregate of one batch call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    /// In completion order.
    pub successful: Vec<CategorizedMessage>,
    pub failed: usize,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("Emergency".parse::<Category>().unwrap(), Category::Emergency);
        assert_eq!(" PAYMENT ".parse::<Category>().unwrap(), Category::Payment);
        assert!("plumbing".parse::<Category>().is_err());
    }

    #[test]
    fn urgency_round_trips_through_json() {
        for urgency in Urgency::ALL {
            let json = serde_json::to_value(urgency).unwrap();
            assert_eq!(json, urgency.as_str());
            let back: Urgency = serde_json::from_value(json).unwrap();
            assert_eq!(back, urgency);
        }
    }

    #[test]
    fn verdict_uses_camel_case_and_omits_missing_error() {
        let verdict = Verdict {
            category: Category::Maintenance,
            urgency: Urgency::High,
            keywords: vec!["ac".into()],
            suggested_action: "Send HVAC tech".into(),
            requires_owner_alert: false,
            error: None,
        };
        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(json["category"], "maintenance");
        assert_eq!(json["suggestedAction"], "Send HVAC tech");
        assert_eq!(json["requiresOwnerAlert"], false);
        assert!(json.get("error").is_none());
    }

    #[test]
    fn fallback_verdict_shape() {
        let verdict = Verdict::fallback("Could not extract JSON from AI response");
        assert_eq!(verdict.category, Category::Other);
        assert_eq!(verdict.urgency, Urgency::Medium);
        assert!(verdict.keywords.is_empty());
        assert_eq!(verdict.suggested_action, "Manual review required");
        assert!(!verdict.requires_owner_alert);
        assert!(verdict.is_fallback());
    }

    #[test]
    fn categorized_message_flattens_verdict() {
        let msg = InboundMessage::new("Rent question", "+1555", MessageChannel::Sms);
        let result = CategorizedMessage::new(Verdict::fallback("boom"), msg);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["category"], "other");
        assert_eq!(json["error"], "boom");
        assert_eq!(json["originalMessage"]["from"], "+1555");
        assert_eq!(json["originalMessage"]["channel"], "sms");
        let ts = json["timestamp"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(ts).is_ok());
        assert!(ts.ends_with('Z'));
    }

    #[test]
    fn context_overrides_message_fields() {
        let msg = InboundMessage::new("hi", "a@b.c", MessageChannel::Email)
            .with_property("Apartment 101")
            .with_tenant("John Doe");

        let merged = CategorizationContext::for_message(&msg, &CategorizationContext::default());
        assert_eq!(merged.property_name.as_deref(), Some("Apartment 101"));
        assert_eq!(merged.tenant_name.as_deref(), Some("John Doe"));
        assert_eq!(merged.message_channel.as_deref(), Some("email"));

        let overrides = CategorizationContext {
            property_name: Some("Unit 7".into()),
            message_channel: Some("SMS".into()),
            ..Default::default()
        };
        let merged = CategorizationContext::for_message(&msg, &overrides);
        assert_eq!(merged.property_name.as_deref(), Some("Unit 7"));
        assert_eq!(merged.tenant_name.as_deref(), Some("John Doe"));
        assert_eq!(merged.message_channel.as_deref(), Some("SMS"));
    }
}
