//! Turning backend text into an [`Explanation`].

use errata_core::{Explanation, RuntimeContext};
use serde::Deserialize;

/// Confidence when the JSON answer omits one.
pub const DEFAULT_JSON_CONFIDENCE: f64 = 0.7;

/// Confidence for answers recovered from free text.
pub const HEURISTIC_CONFIDENCE: f64 = 0.6;

#[derive(Debug, Deserialize)]
struct Answer {
    #[serde(default)]
    message: String,
    #[serde(default)]
    cause: String,
    #[serde(default)]
    suggestions: Vec<String>,
    #[serde(default)]
    confidence: Option<f64>,
}

/// Parse a backend answer.
///
/// The JSON object is parsed strictly; if that fails the text is read line by
/// line, with `-`/`*` bullets becoming suggestions. Empty text yields
/// [`Explanation::empty`].
pub fn parse_response(text: &str, context: &RuntimeContext) -> Explanation {
    let text = text.trim();
    if text.is_empty() {
        return Explanation::empty();
    }

    let explanation = match serde_json::from_str::<Answer>(json_slice(text)) {
        Ok(answer) if !(answer.message.is_empty() && answer.cause.is_empty()) => Explanation::new(
            answer.message,
            answer.cause,
            answer
                .suggestions
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            answer.confidence.unwrap_or(DEFAULT_JSON_CONFIDENCE),
        ),
        _ => parse_free_text(text, context),
    };

    explanation
        .with_error_type(context.exception.short_class())
        .with_location(context.location())
}

/// Extract the outermost `{...}` so fenced or prefixed JSON still parses.
fn json_slice(text: &str) -> &str {
    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    }
}

fn parse_free_text(text: &str, context: &RuntimeContext) -> Explanation {
    let suggestions = text
        .lines()
        .map(str::trim)
        .filter_map(|line| line.strip_prefix('-').or_else(|| line.strip_prefix('*')))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    let message = if context.exception.message.is_empty() {
        text.lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or_default()
            .to_string()
    } else {
        context.exception.message.clone()
    };

    Explanation::new(message, text, suggestions, HEURISTIC_CONFIDENCE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use errata_core::{ExceptionInfo, SourceContext};

    fn ctx() -> RuntimeContext {
        RuntimeContext::new(
            ExceptionInfo::new("App\\Exceptions\\QuotaExceeded", "Quota exceeded").at("q.php", 3),
            SourceContext::empty(),
        )
    }

    #[test]
    fn test_strict_json() {
        let text = r#"{"message": "Quota hit", "cause": "Too many calls", "suggestions": ["Cache results"], "confidence": 0.8}"#;
        let e = parse_response(text, &ctx());
        assert_eq!(e.message, "Quota hit");
        assert_eq!(e.suggestions, vec!["Cache results"]);
        assert_eq!(e.confidence, 0.8);
        assert_eq!(e.error_type, "QuotaExceeded");
        assert_eq!(e.location, "q.php:3");
    }

    #[test]
    fn test_fenced_json() {
        let text = "Here you go:\n```json\n{\"message\": \"X\", \"cause\": \"Y\"}\n```";
        let e = parse_response(text, &ctx());
        assert_eq!(e.message, "X");
        assert_eq!(e.confidence, DEFAULT_JSON_CONFIDENCE);
    }

    #[test]
    fn test_confidence_clamped() {
        let e = parse_response(r#"{"message": "X", "confidence": 7}"#, &ctx());
        assert_eq!(e.confidence, 1.0);
    }

    #[test]
    fn test_free_text_fallback() {
        let text = "The quota is per minute.\n- Add caching\n* Batch requests\nplain line";
        let e = parse_response(text, &ctx());
        assert_eq!(e.confidence, HEURISTIC_CONFIDENCE);
        assert_eq!(e.suggestions, vec!["Add caching", "Batch requests"]);
        assert_eq!(e.cause, text);
        assert_eq!(e.message, "Quota exceeded");
    }

    #[test]
    fn test_json_without_content_falls_back_to_text() {
        let e = parse_response(r#"{"suggestions": []}"#, &ctx());
        assert_eq!(e.confidence, HEURISTIC_CONFIDENCE);
        assert!(!e.is_empty());
    }

    #[test]
    fn test_empty_text() {
        assert!(parse_response("   \n", &ctx()).is_empty());
    }
}
