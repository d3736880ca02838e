//! Reads of array keys, variables or properties that were never set.

use errata_core::{Explanation, RuntimeContext};

use crate::calibration::UNDEFINED_KEY;
use crate::pattern::{group, PatternTable};
use crate::{build, ExplanationStrategy};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Missing {
    StringKey,
    IntKey,
    Variable,
    Property,
}

pub struct UndefinedKeyStrategy {
    patterns: PatternTable<Missing>,
}

impl UndefinedKeyStrategy {
    pub fn new() -> Self {
        Self {
            patterns: PatternTable::new(&[
                (r#"Undefined array key "([^"]*)""#, Missing::StringKey),
                (r"Undefined array key (-?\d+)", Missing::IntKey),
                (r"Undefined index: ?(.+)", Missing::StringKey),
                (r"Undefined offset: ?(-?\d+)", Missing::IntKey),
                (r"Undefined variable:? \$?(\w+)", Missing::Variable),
                (r"Undefined property: ([\w\\]+)::\$(\w+)", Missing::Property),
            ]),
        }
    }
}

impl Default for UndefinedKeyStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ExplanationStrategy for UndefinedKeyStrategy {
    fn name(&self) -> &'static str {
        UNDEFINED_KEY.name
    }

    fn supports(&self, context: &RuntimeContext) -> bool {
        self.patterns.matches(&context.exception.message)
    }

    fn explain(&self, context: &RuntimeContext) -> Explanation {
        let message = &context.exception.message;
        let Some((kind, caps)) = self.patterns.classify(message) else {
            return build(
                UNDEFINED_KEY,
                context,
                "UndefinedKeyError",
                "A value was read before it was set".to_string(),
                message.clone(),
                vec!["Check that the value exists before reading it".to_string()],
            );
        };

        let (summary, cause, suggestions) = match kind {
            Missing::StringKey => {
                let key = group(&caps, 1, "").trim();
                (
                    format!("Array key \"{key}\" does not exist"),
                    format!(
                        "The code reads the key \"{key}\" from an array that does not contain \
                         it. The data came from input, configuration or an API response that \
                         does not always include this key."
                    ),
                    vec![
                        format!("Use a default: $data['{key}'] ?? null"),
                        format!("Check with isset($data['{key}']) or array_key_exists() first"),
                        "Validate the input structure where the array is created".to_string(),
                    ],
                )
            }
            Missing::IntKey => {
                let index = group(&caps, 1, "");
                (
                    format!("Array index {index} does not exist"),
                    format!(
                        "The code reads index {index}, which is outside the populated range of \
                         the array. The array is shorter than assumed, or it is not a list \
                         (keys are not 0..n-1)."
                    ),
                    vec![
                        format!("Check count($array) > {index} before reading"),
                        "Use array_values() if the keys are not sequential".to_string(),
                        "Iterate with foreach instead of indexing directly".to_string(),
                    ],
                )
            }
            Missing::Variable => {
                let name = group(&caps, 1, "");
                (
                    format!("Variable ${name} is not defined"),
                    format!(
                        "${name} is used before it is assigned in this scope. It may only be \
                         assigned inside a branch that did not run, or it is misspelled."
                    ),
                    vec![
                        format!("Initialise ${name} before the branch that assigns it"),
                        format!("Check the spelling of ${name}"),
                        "Pass it into closures with `use` if it comes from an outer scope"
                            .to_string(),
                    ],
                )
            }
            Missing::Property => {
                let class = group(&caps, 1, "");
                let property = group(&caps, 2, "");
                (
                    format!("Property {class}::${property} is not defined"),
                    format!(
                        "{class} has no property named {property}. It is misspelled, or it is \
                         set dynamically only on some code paths."
                    ),
                    vec![
                        format!("Declare ${property} on {class}"),
                        format!("Check the spelling of {property}"),
                    ],
                )
            }
        };

        build(
            UNDEFINED_KEY,
            context,
            "UndefinedKeyError",
            summary,
            cause,
            suggestions,
        )
    }

    fn priority(&self) -> i32 {
        UNDEFINED_KEY.priority
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ctx;

    #[test]
    fn test_string_key() {
        let strategy = UndefinedKeyStrategy::new();
        let e = strategy.explain(&ctx("ErrorException", "Undefined array key \"email\""));
        assert!(e.message.contains("\"email\""));
        assert!(e.suggestions[0].contains("$data['email'] ?? null"));
        assert_eq!(e.confidence, 0.86);
    }

    #[test]
    fn test_int_key() {
        let strategy = UndefinedKeyStrategy::new();
        let e = strategy.explain(&ctx("ErrorException", "Undefined array key 5"));
        assert!(e.message.contains("index 5"));
    }

    #[test]
    fn test_legacy_variable_notice() {
        let strategy = UndefinedKeyStrategy::new();
        let context = ctx("ErrorException", "Undefined variable: total");
        assert!(strategy.supports(&context));
        assert!(strategy.explain(&context).message.contains("$total"));
    }

    #[test]
    fn test_does_not_claim_constants() {
        let strategy = UndefinedKeyStrategy::new();
        assert!(!strategy.supports(&ctx("Error", "Undefined constant \"FOO\"")));
    }
}
