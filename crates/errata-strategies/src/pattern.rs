//! Ordered message pattern tables.

use regex::{Captures, Regex};
use tracing::warn;

/// An ordered list of `(pattern, kind)` pairs. The first match wins.
pub struct PatternTable<K> {
    entries: Vec<(Regex, K)>,
}

impl<K: Copy> PatternTable<K> {
    /// Compile a table. Patterns that fail to compile are logged and skipped.
    pub fn new(patterns: &[(&str, K)]) -> Self {
        let entries = patterns
            .iter()
            .filter_map(|(pattern, kind)| match Regex::new(pattern) {
                Ok(re) => Some((re, *kind)),
                Err(e) => {
                    warn!("Skipping invalid pattern {:?}: {}", pattern, e);
                    None
                }
            })
            .collect();
        Self { entries }
    }

    /// Classify `text`, returning the first matching kind with its captures.
    pub fn classify<'t>(&self, text: &'t str) -> Option<(K, Captures<'t>)> {
        self.entries
            .iter()
            .find_map(|(re, kind)| re.captures(text).map(|caps| (*kind, caps)))
    }

    pub fn matches(&self, text: &str) -> bool {
        self.entries.iter().any(|(re, _)| re.is_match(text))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Capture group `i` as a string, or `fallback` when it did not participate.
pub(crate) fn group<'t>(caps: &Captures<'t>, i: usize, fallback: &'t str) -> &'t str {
    caps.get(i).map_or(fallback, |m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Kind {
        Specific,
        General,
    }

    #[test]
    fn test_first_match_wins() {
        let table = PatternTable::new(&[
            (r"Undefined array key (\d+)", Kind::Specific),
            (r"Undefined", Kind::General),
        ]);
        let (kind, caps) = table.classify("Undefined array key 3").unwrap();
        assert_eq!(kind, Kind::Specific);
        assert_eq!(group(&caps, 1, ""), "3");

        let (kind, _) = table.classify("Undefined variable $x").unwrap();
        assert_eq!(kind, Kind::General);
    }

    #[test]
    fn test_invalid_pattern_skipped() {
        let table = PatternTable::new(&[(r"(unclosed", Kind::General), ("ok", Kind::Specific)]);
        assert_eq!(table.len(), 1);
        assert!(table.matches("ok"));
        assert!(table.classify("nothing").is_none());
    }
}
