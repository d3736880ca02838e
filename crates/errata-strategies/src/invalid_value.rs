//! Values of the right type but outside the accepted domain.

use errata_core::{Explanation, RuntimeContext};

use crate::calibration::INVALID_VALUE;
use crate::pattern::{group, PatternTable};
use crate::{build, ExplanationStrategy};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Violation {
    EnumBacking,
    OutOfRange,
    Empty,
    Format,
    NotAllowed,
    Generic,
}

/// Recognises `ValueError`-style domain violations.
///
/// "must be of type" messages are type errors and are declined in favour of
/// [`TypeMismatchStrategy`](crate::TypeMismatchStrategy).
pub struct InvalidValueStrategy {
    patterns: PatternTable<Violation>,
    excluded: PatternTable<()>,
}

impl InvalidValueStrategy {
    pub fn new() -> Self {
        Self {
            patterns: PatternTable::new(&[
                (
                    r#""?([^"]*)"? is not a valid backing value for enum "?([\w\\]+)"?"#,
                    Violation::EnumBacking,
                ),
                (
                    r"Argument #(\d+) \(\$(\w+)\) must be (greater|less) than (or equal to )?(-?[\d.]+)",
                    Violation::OutOfRange,
                ),
                (
                    r"Argument #(\d+) \(\$(\w+)\) must not be empty",
                    Violation::Empty,
                ),
                (
                    r"Argument #(\d+) \(\$(\w+)\) must be a valid (.+)",
                    Violation::Format,
                ),
                (
                    r"Argument #(\d+) \(\$(\w+)\) must be (?:one of|either) (.+)",
                    Violation::NotAllowed,
                ),
            ]),
            excluded: PatternTable::new(&[(r"must be of type", ())]),
        }
    }
}

impl Default for InvalidValueStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ExplanationStrategy for InvalidValueStrategy {
    fn name(&self) -> &'static str {
        INVALID_VALUE.name
    }

    fn supports(&self, context: &RuntimeContext) -> bool {
        let message = &context.exception.message;
        if self.excluded.matches(message) {
            return false;
        }
        context.exception.short_class() == "ValueError" || self.patterns.matches(message)
    }

    fn explain(&self, context: &RuntimeContext) -> Explanation {
        let message = &context.exception.message;
        let (kind, caps) = match self.patterns.classify(message) {
            Some((kind, caps)) => (kind, Some(caps)),
            None => (Violation::Generic, None),
        };
        let arg = |i: usize| caps.as_ref().map_or("", |c| group(c, i, ""));

        let (summary, cause, suggestions) = match kind {
            Violation::EnumBacking => {
                let value = arg(1);
                let enum_name = arg(2);
                (
                    format!("\"{value}\" is not a case of {enum_name}"),
                    format!(
                        "{enum_name}::from() received \"{value}\", which does not match any \
                         case's backing value. The input comes from a stale database row, \
                         user input or an outdated client."
                    ),
                    vec![
                        format!("Use {enum_name}::tryFrom() and handle the null result"),
                        format!("Add a case to {enum_name} if \"{value}\" is legitimate"),
                        "Validate or migrate the stored values".to_string(),
                    ],
                )
            }
            Violation::OutOfRange => {
                let index = arg(1);
                let param = arg(2);
                let direction = arg(3);
                let inclusive = arg(4);
                let bound = arg(5);
                (
                    format!("Argument #{index} (${param}) is out of range"),
                    format!(
                        "${param} must be {direction} than {inclusive}{bound}, but the value \
                         passed was not."
                    ),
                    vec![
                        format!("Clamp or validate ${param} before the call"),
                        format!("Trace where ${param} is computed; it may be negative or zero"),
                    ],
                )
            }
            Violation::Empty => {
                let index = arg(1);
                let param = arg(2);
                (
                    format!("Argument #{index} (${param}) must not be empty"),
                    format!("An empty value was passed as ${param}, which requires content."),
                    vec![
                        format!("Check that ${param} is non-empty before the call"),
                        "Handle the empty case explicitly (early return or default)".to_string(),
                    ],
                )
            }
            Violation::Format => {
                let index = arg(1);
                let param = arg(2);
                let what = arg(3);
                (
                    format!("Argument #{index} (${param}) must be a valid {what}"),
                    format!("${param} does not have the format of a valid {what}."),
                    vec![
                        format!("Validate ${param} as a {what} before passing it"),
                        "Log the rejected value to see what was actually received".to_string(),
                    ],
                )
            }
            Violation::NotAllowed => {
                let index = arg(1);
                let param = arg(2);
                let allowed = arg(3);
                (
                    format!("Argument #{index} (${param}) has an unsupported value"),
                    format!("${param} only accepts {allowed}."),
                    vec![format!("Pass one of {allowed}")],
                )
            }
            Violation::Generic => (
                "A value was rejected".to_string(),
                format!(
                    "A value of the correct type was outside the accepted range or format: {message}"
                ),
                vec![
                    "Validate the value before passing it on".to_string(),
                    "Check the documentation for the accepted values".to_string(),
                ],
            ),
        };

        build(
            INVALID_VALUE,
            context,
            "ValueError",
            summary,
            cause,
            suggestions,
        )
    }

    fn priority(&self) -> i32 {
        INVALID_VALUE.priority
    }
}
