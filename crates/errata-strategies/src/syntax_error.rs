//! Parse errors.

use errata_core::{Explanation, RuntimeContext};

use crate::calibration::SYNTAX_ERROR;
use crate::pattern::{group, PatternTable};
use crate::{build, ExplanationStrategy};

#[derive(Debug, Clone, Copy, PartialEq)]
enum ParseProblem {
    UnexpectedEof,
    UnexpectedToken,
    Unclosed,
    Generic,
}

/// Recognises parser errors in application source.
///
/// JSON decoding errors also say "Syntax error" but concern data, not code,
/// so exceptions whose class mentions `Json` are declined.
pub struct SyntaxErrorStrategy {
    patterns: PatternTable<ParseProblem>,
}

impl SyntaxErrorStrategy {
    pub fn new() -> Self {
        Self {
            patterns: PatternTable::new(&[
                (r"syntax error, unexpected end of file", ParseProblem::UnexpectedEof),
                (
                    r"syntax error, unexpected (.+?)(?:, expecting (.+))?$",
                    ParseProblem::UnexpectedToken,
                ),
                (
                    r"Unclosed '(.)'(?: on line (\d+))?",
                    ParseProblem::Unclosed,
                ),
                (r"syntax error", ParseProblem::Generic),
            ]),
        }
    }
}

impl Default for SyntaxErrorStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ExplanationStrategy for SyntaxErrorStrategy {
    fn name(&self) -> &'static str {
        SYNTAX_ERROR.name
    }

    fn supports(&self, context: &RuntimeContext) -> bool {
        let class = &context.exception.class;
        if class.contains("Json") {
            return false;
        }
        class.contains("ParseError") || self.patterns.matches(&context.exception.message)
    }

    fn explain(&self, context: &RuntimeContext) -> Explanation {
        let file = &context.exception.file;
        let line = context.exception.line;
        let (kind, caps) = match self.patterns.classify(&context.exception.message) {
            Some((kind, caps)) => (kind, Some(caps)),
            None => (ParseProblem::Generic, None),
        };
        let arg = |i: usize| caps.as_ref().map_or("", |c| group(c, i, ""));

        let (summary, cause, mut suggestions) = match kind {
            ParseProblem::UnexpectedEof => (
                format!("{file} ends before a block is closed"),
                "The parser reached the end of the file while a brace, bracket or string was \
                 still open."
                    .to_string(),
                vec![
                    "Look for a missing closing } or ) above the reported line".to_string(),
                    "Check for an unterminated string or heredoc".to_string(),
                ],
            ),
            ParseProblem::UnexpectedToken => {
                let token = arg(1);
                let expecting = arg(2);
                let cause = if expecting.is_empty() {
                    format!("The parser found {token} where it does not fit the grammar.")
                } else {
                    format!("The parser found {token} but expected {expecting}.")
                };
                (
                    format!("Unexpected {token} on line {line}"),
                    cause,
                    vec![
                        format!("Check line {line} and the line before it for a missing ; or )"),
                        "Look for a stray or missing bracket near the reported token".to_string(),
                    ],
                )
            }
            ParseProblem::Unclosed => {
                let delimiter = arg(1);
                let opened = arg(2);
                let cause = if opened.is_empty() {
                    format!("A '{delimiter}' was opened and never closed.")
                } else {
                    format!("The '{delimiter}' opened on line {opened} is never closed.")
                };
                (
                    format!("Unclosed '{delimiter}'"),
                    cause,
                    vec![format!("Add the matching closing delimiter for '{delimiter}'")],
                )
            }
            ParseProblem::Generic => (
                format!("Syntax error in {file}"),
                format!(
                    "The file could not be parsed: {}",
                    context.exception.message
                ),
                vec![format!("Check the syntax around line {line}")],
            ),
        };
        suggestions.push(format!("Run a linter on {file} (e.g. php -l)"));

        build(
            SYNTAX_ERROR,
            context,
            "SyntaxError",
            summary,
            cause,
            suggestions,
        )
    }

    fn priority(&self) -> i32 {
        SYNTAX_ERROR.priority
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ctx;

    #[test]
    fn test_unexpected_token_with_expectation() {
        let strategy = SyntaxErrorStrategy::new();
        let e = strategy.explain(&ctx(
            "ParseError",
            "syntax error, unexpected identifier \"echo\", expecting \";\"",
        ));
        assert!(e.cause.contains("identifier \"echo\""));
        assert!(e.cause.contains("expected \";\""));
        assert_eq!(e.confidence, 0.95);
    }

    #[test]
    fn test_unexpected_eof() {
        let strategy = SyntaxErrorStrategy::new();
        let e = strategy.explain(&ctx("ParseError", "syntax error, unexpected end of file"));
        assert!(e.message.contains("ends before"));
    }

    #[test]
    fn test_declines_json_errors() {
        let strategy = SyntaxErrorStrategy::new();
        assert!(!strategy.supports(&ctx("JsonException", "Syntax error")));
        assert!(!strategy.supports(&ctx("JsonException", "syntax error")));
    }
}
