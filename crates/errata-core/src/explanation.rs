//! The explanation produced for a failure.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A human-readable explanation of a failure.
///
/// An explanation whose `message` and `cause` are both empty is the
/// "no result" sentinel (see [`Explanation::empty`]); this is distinct from a
/// low-confidence result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Explanation {
    /// Restates the failure
    pub message: String,
    /// Why it happened
    pub cause: String,
    /// Ordered fix actions
    pub suggestions: Vec<String>,
    /// Confidence score (0.0 - 1.0)
    #[serde(deserialize_with = "deserialize_confidence")]
    pub confidence: f64,
    /// Classifier tag
    pub error_type: String,
    /// `file:line` of the failure
    pub location: String,
    /// Provider name, model, token counts
    pub metadata: BTreeMap<String, Value>,
    /// The block to edit
    pub code_snippet: Option<String>,
    /// Where the faulty call originated, if different from `location`
    pub call_site_location: Option<String>,
}

impl Explanation {
    /// Create an explanation. `confidence` is clamped to `[0.0, 1.0]`.
    pub fn new(
        message: impl Into<String>,
        cause: impl Into<String>,
        suggestions: Vec<String>,
        confidence: f64,
    ) -> Self {
        Self {
            message: message.into(),
            cause: cause.into(),
            suggestions,
            confidence: clamp_confidence(confidence),
            ..Self::default()
        }
    }

    /// The "no result" sentinel.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.message.is_empty() && self.cause.is_empty()
    }

    pub fn with_error_type(mut self, error_type: impl Into<String>) -> Self {
        self.error_type = error_type.into();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Attach source context gathered after classification.
    ///
    /// `None` leaves the corresponding field as it was.
    pub fn with_code_context(
        &self,
        code_snippet: Option<String>,
        call_site_location: Option<String>,
    ) -> Self {
        let mut enriched = self.clone();
        if code_snippet.is_some() {
            enriched.code_snippet = code_snippet;
        }
        if call_site_location.is_some() {
            enriched.call_site_location = call_site_location;
        }
        enriched
    }

    /// Provider name recorded in metadata, if any.
    pub fn provider(&self) -> Option<&str> {
        self.metadata.get("provider").and_then(Value::as_str)
    }

    /// Get confidence level description.
    pub fn confidence_level(&self) -> &'static str {
        if self.confidence >= 0.9 {
            "high"
        } else if self.confidence >= 0.7 {
            "medium"
        } else if self.confidence >= 0.5 {
            "low"
        } else {
            "failed"
        }
    }

    /// Flatten into the key-value shape used for caching and JSON output.
    ///
    /// Keys: `message, cause, suggestions, confidence, error_type, location,
    /// metadata, code_snippet, call_site_location`. Optional fields are
    /// present as `null` when unset.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("message".into(), Value::from(self.message.clone()));
        map.insert("cause".into(), Value::from(self.cause.clone()));
        map.insert(
            "suggestions".into(),
            Value::Array(self.suggestions.iter().cloned().map(Value::from).collect()),
        );
        map.insert("confidence".into(), Value::from(self.confidence));
        map.insert("error_type".into(), Value::from(self.error_type.clone()));
        map.insert("location".into(), Value::from(self.location.clone()));
        map.insert(
            "metadata".into(),
            Value::Object(self.metadata.clone().into_iter().collect()),
        );
        map.insert(
            "code_snippet".into(),
            self.code_snippet.clone().map_or(Value::Null, Value::from),
        );
        map.insert(
            "call_site_location".into(),
            self.call_site_location
                .clone()
                .map_or(Value::Null, Value::from),
        );
        map
    }

    /// Rebuild from the shape produced by [`Explanation::to_map`].
    ///
    /// Missing or mistyped keys fall back to their defaults.
    pub fn from_map(map: &Map<String, Value>) -> Self {
        let string = |key: &str| {
            map.get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        let optional = |key: &str| map.get(key).and_then(Value::as_str).map(str::to_string);

        let suggestions = map
            .get("suggestions")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let metadata = map
            .get("metadata")
            .and_then(Value::as_object)
            .map(|m| m.clone().into_iter().collect())
            .unwrap_or_default();

        Self {
            message: string("message"),
            cause: string("cause"),
            suggestions,
            confidence: clamp_confidence(
                map.get("confidence").and_then(Value::as_f64).unwrap_or(0.0),
            ),
            error_type: string("error_type"),
            location: string("location"),
            metadata,
            code_snippet: optional("code_snippet"),
            call_site_location: optional("call_site_location"),
        }
    }
}

fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn deserialize_confidence<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    Ok(clamp_confidence(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Explanation {
        Explanation::new(
            "Call to getId() on null",
            "The variable holding the object is null.",
            vec!["Check the lookup result".into(), "Use ?->".into()],
            0.85,
        )
        .with_error_type("NullReferenceError")
        .with_location("src/UserController.php:42")
        .with_metadata("provider", "openai")
        .with_metadata("total_tokens", 321)
    }

    #[test]
    fn test_empty_sentinel() {
        assert!(Explanation::empty().is_empty());
        assert!(!sample().is_empty());

        let only_cause = Explanation::new("", "something", vec![], 0.1);
        assert!(!only_cause.is_empty());
    }

    #[test]
    fn test_confidence_is_clamped() {
        assert_eq!(Explanation::new("m", "c", vec![], 1.7).confidence, 1.0);
        assert_eq!(Explanation::new("m", "c", vec![], -0.3).confidence, 0.0);
        assert_eq!(Explanation::new("m", "c", vec![], f64::NAN).confidence, 0.0);
    }

    #[test]
    fn test_map_roundtrip_with_code_context() {
        let original = sample().with_code_context(
            Some("  41 | $user = $repo->find($id);\n> 42 | $user->getId();".into()),
            Some("src/routes.php:17".into()),
        );
        let restored = Explanation::from_map(&original.to_map());
        assert_eq!(restored, original);
    }

    #[test]
    fn test_map_shape() {
        let map = sample().to_map();
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        for key in [
            "message",
            "cause",
            "suggestions",
            "confidence",
            "error_type",
            "location",
            "metadata",
            "code_snippet",
            "call_site_location",
        ] {
            assert!(keys.contains(&key), "missing key {key}");
        }
        assert_eq!(map["code_snippet"], Value::Null);
    }

    #[test]
    fn test_serde_matches_map_shape() {
        let e = sample().with_code_context(Some("snippet".into()), None);
        let via_serde = serde_json::to_value(&e).unwrap();
        assert_eq!(via_serde, Value::Object(e.to_map()));
        let back: Explanation = serde_json::from_value(via_serde).unwrap();
        assert_eq!(back, e);
    }

    #[test]
    fn test_with_code_context_keeps_original() {
        let base = sample();
        let enriched = base.with_code_context(Some("x".into()), None);
        assert_eq!(base.code_snippet, None);
        assert_eq!(enriched.code_snippet.as_deref(), Some("x"));
        assert_eq!(enriched.call_site_location, None);
    }

    #[test]
    fn test_confidence_levels() {
        let level = |c| Explanation::new("m", "c", vec![], c).confidence_level();
        assert_eq!(level(0.95), "high");
        assert_eq!(level(0.85), "medium");
        assert_eq!(level(0.6), "low");
        assert_eq!(level(0.3), "failed");
    }
}
