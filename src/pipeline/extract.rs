//! Turns a free-text model reply into a [`Verdict`].
//!
//! Two stages, tried in order:
//! 1. a JSON object inside a markdown code fence
//! 2. the first balanced `{...}` span anywhere in the text
//!
//! Whichever stage matches first is decoded; a decode failure is an error,
//! never a partial verdict.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ExtractionError;
use crate::pipeline::types::Verdict;

static FENCED_JSON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json|JSON)?\s*(\{.*?\})\s*```").expect("fence pattern is valid")
});

/// Stage 1: the object inside a ```` ```json ```` (or bare ```` ``` ````) fence.
pub fn fenced_block(text: &str) -> Option<&str> {
    FENCED_JSON
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Stage 2: the first top-level `{...}` span, matching braces and
/// ignoring any that appear inside JSON string literals.
///
/// An opening brace that never closes (stray prose) is skipped and the
/// scan restarts at the next one.
pub fn first_balanced_object(text: &str) -> Option<&str> {
    let mut from = 0;
    while let Some(found) = text[from..].find('{') {
        let start = from + found;
        if let Some(end) = balanced_end(&text[start..]) {
            return Some(&text[start..=start + end]);
        }
        from = start + 1;
    }
    None
}

/// Byte offset of the brace closing the one at offset 0, if any.
fn balanced_end(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(offset);
                }
            }
            _ => {}
        }
    }

    None
}

/// Locate the JSON object in a model reply.
pub fn extract_json(text: &str) -> Result<&str, ExtractionError> {
    fenced_block(text)
        .or_else(|| first_balanced_object(text))
        .ok_or(ExtractionError::NoJson)
}

/// Parse a model reply into a verdict.
pub fn extract_verdict(raw: &str) -> Result<Verdict, ExtractionError> {
    let json = extract_json(raw)?;
    let mut verdict: Verdict = serde_json::from_str(json)?;
    // `error` is reserved for the fallback path.
    verdict.error = None;
    Ok(verdict)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::types::{Category, Urgency};

    const EMERGENCY_JSON: &str = r#"{"category":"emergency","urgency":"critical","keywords":["flood"],"suggestedAction":"Call plumber","requiresOwnerAlert":true}"#;

    // ── Stage 1: fenced blocks ──────────────────────────────────────

    #[test]
    fn fenced_json_block() {
        let reply = format!("Here you go:\n```json\n{EMERGENCY_JSON}\n```\nLet me know!");
        assert_eq!(fenced_block(&reply), Some(EMERGENCY_JSON));
    }

    #[test]
    fn bare_fence_without_language() {
        let reply = "```\n{\"a\": 1}\n```";
        assert_eq!(fenced_block(reply), Some("{\"a\": 1}"));
    }

    #[test]
    fn fence_with_nested_object() {
        let reply = "```json\n{\"a\": {\"b\": 2}}\n```";
        assert_eq!(fenced_block(reply), Some("{\"a\": {\"b\": 2}}"));
    }

    #[test]
    fn no_fence_yields_none() {
        assert_eq!(fenced_block("just {\"a\":1} inline"), None);
    }

    // ── Stage 2: balanced braces ────────────────────────────────────

    #[test]
    fn balanced_object_in_prose() {
        let reply = "Based on the content: {\"category\": \"inquiry\"} that's my assessment.";
        assert_eq!(first_balanced_object(reply), Some("{\"category\": \"inquiry\"}"));
    }

    #[test]
    fn balanced_object_stops_at_first_top_level_close() {
        let reply = "{\"a\": {\"b\": 1}} and later {\"c\": 2}";
        assert_eq!(first_balanced_object(reply), Some("{\"a\": {\"b\": 1}}"));
    }

    #[test]
    fn braces_inside_strings_are_ignored() {
        let reply = r#"result: {"suggestedAction": "reply with } or { \" quoted"} end"#;
        assert_eq!(
            first_balanced_object(reply),
            Some(r#"{"suggestedAction": "reply with } or { \" quoted"}"#)
        );
    }

    #[test]
    fn unclosed_object_yields_none() {
        assert_eq!(first_balanced_object("{\"category\": \"other\""), None);
        assert_eq!(first_balanced_object("no braces here"), None);
    }

    #[test]
    fn stray_open_brace_in_prose_is_skipped() {
        let reply = "I would file this under {maintenance. Final answer: {\"a\": {\"b\": 1}}";
        assert_eq!(first_balanced_object(reply), Some("{\"a\": {\"b\": 1}}"));
    }

    #[test]
    fn verdict_after_unclosed_brace() {
        let reply =
            format!("I would file this under {{maintenance. Final answer: {EMERGENCY_JSON}");
        let verdict = extract_verdict(&reply).unwrap();
        assert_eq!(verdict.category, Category::Emergency);
        assert_eq!(verdict.urgency, Urgency::Critical);
    }

    // ── Verdict extraction ──────────────────────────────────────────

    #[test]
    fn extract_plain_json_reply() {
        let verdict = extract_verdict(EMERGENCY_JSON).unwrap();
        assert_eq!(verdict.category, Category::Emergency);
        assert_eq!(verdict.urgency, Urgency::Critical);
        assert_eq!(verdict.keywords, vec!["flood"]);
        assert_eq!(verdict.suggested_action, "Call plumber");
        assert!(verdict.requires_owner_alert);
        assert!(verdict.error.is_none());
    }

    #[test]
    fn fenced_verdict_reproduces_original_fields() {
        let original = Verdict {
            category: Category::Payment,
            urgency: Urgency::Medium,
            keywords: vec!["rent".into(), "due date".into()],
            suggested_action: "Confirm the rent due date".into(),
            requires_owner_alert: false,
            error: None,
        };
        let reply = format!(
            "```json\n{}\n```",
            serde_json::to_string_pretty(&original).unwrap()
        );
        assert_eq!(extract_verdict(&reply).unwrap(), original);
    }

    #[test]
    fn lenient_enum_case() {
        let reply = r#"{"category":"Maintenance","urgency":"HIGH","suggestedAction":"Fix AC"}"#;
        let verdict = extract_verdict(reply).unwrap();
        assert_eq!(verdict.category, Category::Maintenance);
        assert_eq!(verdict.urgency, Urgency::High);
        assert!(verdict.keywords.is_empty());
        assert!(!verdict.requires_owner_alert);
    }

    #[test]
    fn model_supplied_error_field_is_dropped() {
        let reply =
            r#"{"category":"other","urgency":"low","suggestedAction":"None","error":"nope"}"#;
        assert!(extract_verdict(reply).unwrap().error.is_none());
    }

    #[test]
    fn prose_without_json_is_no_json() {
        let err =
            extract_verdict("This looks like a plumbing emergency, call someone.").unwrap_err();
        assert!(matches!(err, ExtractionError::NoJson));
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = extract_verdict("```json\n{\"category\": emergency}\n```").unwrap_err();
        assert!(matches!(err, ExtractionError::Malformed(_)));
    }

    #[test]
    fn unknown_category_is_an_error() {
        let reply = r#"{"category":"plumbing","urgency":"high","suggestedAction":"x"}"#;
        assert!(matches!(
            extract_verdict(reply).unwrap_err(),
            ExtractionError::Malformed(_)
        ));
    }

    #[test]
    fn missing_required_field_is_an_error() {
        let reply = r#"{"category":"payment","suggestedAction":"x"}"#;
        assert!(extract_verdict(reply).is_err());
    }
}
