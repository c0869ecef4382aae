//! Prompt construction for categorization and daily summaries.
//!
//! Both prompts are pure functions of their inputs so the same message
//! always produces the same prompt.

use crate::pipeline::types::{CategorizationContext, CategorizedMessage};

/// Characters of each message quoted in the summary prompt.
const SUMMARY_PREVIEW_CHARS: usize = 100;

const RESPONSE_SCHEMA: &str = r#"Respond in JSON format only:
{
  "category": "emergency|maintenance|payment|inquiry|other",
  "urgency": "critical|high|medium|low",
  "keywords": ["keyword1", "keyword2"],
  "suggestedAction": "brief action recommendation",
  "requiresOwnerAlert": true|false
}"#;

const TAXONOMY: &str = "Important:
- emergency: immediate danger (fire, flood, gas leak, break-in, medical)
- maintenance: repairs needed (broken appliance, leak, AC not working)
- payment: rent, deposits, fees
- inquiry: questions, requests for information
- other: anything that fits none of the above
- critical urgency = owner must be notified immediately
- high urgency = needs response within 4 hours
- medium = respond within 24 hours
- low = respond within 2-3 days";

/// Build the categorization prompt.
///
/// Context lines appear in a fixed order (property, tenant, channel) and
/// only when present; with no context at all the section is left out.
pub fn build_categorization_prompt(text: &str, context: &CategorizationContext) -> String {
    let mut prompt = String::with_capacity(1024);

    prompt.push_str(
        "You are a property management assistant. Categorize this tenant message.\n\n",
    );
    prompt.push_str(&format!("Message: \"{text}\"\n\n"));

    let lines: Vec<String> = [
        ("Property", &context.property_name),
        ("Tenant", &context.tenant_name),
        ("Channel", &context.message_channel),
    ]
    .into_iter()
    .filter_map(|(label, value)| value.as_ref().map(|v| format!("- {label}: {v}")))
    .collect();

    if !lines.is_empty() {
        prompt.push_str("Property context:\n");
        prompt.push_str(&lines.join("\n"));
        prompt.push_str("\n\n");
    }

    prompt.push_str(RESPONSE_SCHEMA);
    prompt.push_str("\n\n");
    prompt.push_str(TAXONOMY);
    prompt
}

/// Build the daily digest prompt from already-categorized messages.
pub fn build_summary_prompt(entries: &[CategorizedMessage], date: &str) -> String {
    let mut prompt = String::with_capacity(256 + entries.len() * 128);

    prompt.push_str("Generate a concise daily summary for property management communications.\n\n");
    prompt.push_str(&format!("Date: {date}\n"));
    prompt.push_str(&format!("Total messages: {}\n\n", entries.len()));
    prompt.push_str("Messages:\n");

    for (i, entry) in entries.iter().enumerate() {
        let preview: String = entry
            .original_message
            .text
            .chars()
            .take(SUMMARY_PREVIEW_CHARS)
            .collect();
        prompt.push_str(&format!(
            "{}. [{}] {}: {}...\n",
            i + 1,
            entry.verdict.category,
            entry.original_message.from,
            preview
        ));
    }

    prompt.push_str(
        "\nCreate a professional summary including:\n\
         1. Key highlights (2-3 sentences)\n\
         2. Urgent items requiring attention\n\
         3. Maintenance requests summary\n\
         4. Payment-related items\n\
         5. General inquiries\n\n\
         Format as a brief email-ready report (200-300 words max).",
    );
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::{Category, InboundMessage, MessageChannel, Urgency, Verdict};

    #[test]
    fn prompt_embeds_message_verbatim() {
        let prompt = build_categorization_prompt(
            "Help! The toilet is overflowing!",
            &CategorizationContext::default(),
        );
        assert!(prompt.contains("Message: \"Help! The toilet is overflowing!\""));
        assert!(prompt.contains("Respond in JSON format only"));
        assert!(prompt.contains("within 4 hours"));
        assert!(prompt.contains("2-3 days"));
        assert!(!prompt.contains("Property context"));
    }

    #[test]
    fn context_lines_in_fixed_order() {
        let context = CategorizationContext {
            property_name: Some("Apartment 101".into()),
            tenant_name: Some("John Doe".into()),
            message_channel: Some("sms".into()),
        };
        let prompt = build_categorization_prompt("hi", &context);
        let property = prompt.find("- Property: Apartment 101").unwrap();
        let tenant = prompt.find("- Tenant: John Doe").unwrap();
        let channel = prompt.find("- Channel: sms").unwrap();
        assert!(property < tenant && tenant < channel);
    }

    #[test]
    fn absent_context_lines_are_omitted() {
        let context = CategorizationContext {
            tenant_name: Some("Jane".into()),
            ..Default::default()
        };
        let prompt = build_categorization_prompt("hi", &context);
        assert!(prompt.contains("Property context:\n- Tenant: Jane\n\n"));
        assert!(!prompt.contains("- Property:"));
        assert!(!prompt.contains("- Channel:"));
    }

    #[test]
    fn prompt_is_deterministic() {
        let context = CategorizationContext {
            property_name: Some("Unit 4".into()),
            ..Default::default()
        };
        assert_eq!(
            build_categorization_prompt("same", &context),
            build_categorization_prompt("same", &context)
        );
    }

    #[test]
    fn summary_prompt_lists_entries() {
        let long_text = "a".repeat(250);
        let entries = vec![
            CategorizedMessage::new(
                Verdict {
                    category: Category::Emergency,
                    urgency: Urgency::Critical,
                    keywords: vec![],
                    suggested_action: "Call plumber".into(),
                    requires_owner_alert: true,
                    error: None,
                },
                InboundMessage::new("Water everywhere", "+1555", MessageChannel::Sms),
            ),
            CategorizedMessage::new(
                Verdict::fallback("x"),
                InboundMessage::new(long_text, "b@x.com", MessageChannel::Email),
            ),
        ];
        let prompt = build_summary_prompt(&entries, "2025-01-15");
        assert!(prompt.contains("Date: 2025-01-15"));
        assert!(prompt.contains("Total messages: 2"));
        assert!(prompt.contains("1. [emergency] +1555: Water everywhere..."));
        assert!(prompt.contains(&format!("2. [other] b@x.com: {}...", "a".repeat(100))));
        assert!(!prompt.contains(&"a".repeat(101)));
        assert!(prompt.contains("200-300 words"));
    }
}
