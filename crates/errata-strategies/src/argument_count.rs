//! Calls with the wrong number of arguments.

use errata_core::{Explanation, RuntimeContext};

use crate::calibration::ARGUMENT_COUNT;
use crate::pattern::{group, PatternTable};
use crate::{build, ExplanationStrategy};

#[derive(Debug, Clone, Copy, PartialEq)]
enum ArityProblem {
    TooFew,
    WrongCount,
    UnknownNamed,
    Generic,
}

/// Recognises too-few / too-many argument errors and unknown named arguments.
pub struct ArgumentCountStrategy {
    patterns: PatternTable<ArityProblem>,
}

impl ArgumentCountStrategy {
    pub fn new() -> Self {
        Self {
            patterns: PatternTable::new(&[
                (
                    r"Too few arguments to function ([\w\\:]+)\(\), (\d+) passed(?: in .+? on line \d+)? and (exactly|at least) (\d+) expected",
                    ArityProblem::TooFew,
                ),
                (
                    r"([\w\\:]+)\(\) expects (exactly|at most|at least) (\d+) arguments?, (\d+) given",
                    ArityProblem::WrongCount,
                ),
                (r"Unknown named parameter \$(\w+)", ArityProblem::UnknownNamed),
            ]),
        }
    }
}

impl Default for ArgumentCountStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ExplanationStrategy for ArgumentCountStrategy {
    fn name(&self) -> &'static str {
        ARGUMENT_COUNT.name
    }

    fn supports(&self, context: &RuntimeContext) -> bool {
        context.exception.class.contains("ArgumentCountError")
            || self.patterns.matches(&context.exception.message)
    }

    fn explain(&self, context: &RuntimeContext) -> Explanation {
        let (kind, caps) = match self.patterns.classify(&context.exception.message) {
            Some((kind, caps)) => (kind, Some(caps)),
            None => (ArityProblem::Generic, None),
        };
        let arg = |i: usize| caps.as_ref().map_or("", |c| group(c, i, ""));

        let (summary, cause, suggestions) = match kind {
            ArityProblem::TooFew => {
                let function = arg(1);
                let passed = arg(2);
                let qualifier = arg(3);
                let expected = arg(4);
                (
                    format!("{function}() received {passed} of {expected} required arguments"),
                    format!(
                        "{function}() requires {qualifier} {expected} argument(s), but only \
                         {passed} were passed. A caller was not updated after the signature \
                         changed, or an argument was forgotten."
                    ),
                    vec![
                        format!("Pass all {expected} required arguments to {function}()"),
                        "Give the missing parameters default values if they are optional"
                            .to_string(),
                        "Search for other call sites of this function with the same problem"
                            .to_string(),
                    ],
                )
            }
            ArityProblem::WrongCount => {
                let function = arg(1);
                let qualifier = arg(2);
                let expected = arg(3);
                let given = arg(4);
                (
                    format!("{function}() expects {qualifier} {expected} argument(s), {given} given"),
                    format!(
                        "{function}() was called with {given} argument(s), but it accepts \
                         {qualifier} {expected}."
                    ),
                    vec![
                        format!("Call {function}() with {qualifier} {expected} argument(s)"),
                        format!("Check the documentation of {function}() for its signature"),
                    ],
                )
            }
            ArityProblem::UnknownNamed => {
                let param = arg(1);
                (
                    format!("Unknown named argument ${param}"),
                    format!(
                        "The call uses the named argument ${param}, which the function does \
                         not declare. The parameter was renamed or misspelled."
                    ),
                    vec![
                        format!("Rename ${param} to match the function's parameter name"),
                        "Fall back to positional arguments".to_string(),
                    ],
                )
            }
            ArityProblem::Generic => (
                "A function was called with the wrong number of arguments".to_string(),
                format!(
                    "The argument count does not match the function signature: {}",
                    context.exception.message
                ),
                vec![
                    "Compare the call with the function's declared parameters".to_string(),
                    "Add default values for optional parameters".to_string(),
                ],
            ),
        };

        build(
            ARGUMENT_COUNT,
            context,
            "ArgumentCountError",
            summary,
            cause,
            suggestions,
        )
    }

    fn priority(&self) -> i32 {
        ARGUMENT_COUNT.priority
    }
}
