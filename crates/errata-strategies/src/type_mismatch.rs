//! Values of the wrong type.

use errata_core::{Explanation, RuntimeContext};

use crate::calibration::TYPE_MISMATCH;
use crate::pattern::{group, PatternTable};
use crate::{build, ExplanationStrategy};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mismatch {
    Argument,
    ReturnValue,
    TypedProperty,
    Operands,
    IllegalOffset,
    MemberOnScalar,
    Generic,
}

/// Recognises argument, return, property and operand type errors.
///
/// Member calls on `null` are left to
/// [`NullReferenceStrategy`](crate::NullReferenceStrategy).
pub struct TypeMismatchStrategy {
    patterns: PatternTable<Mismatch>,
    excluded: PatternTable<()>,
}

impl TypeMismatchStrategy {
    pub fn new() -> Self {
        Self {
            patterns: PatternTable::new(&[
                (
                    r"Argument #(\d+) \(\$(\w+)\) must be of type ([^,]+), (\S+) given",
                    Mismatch::Argument,
                ),
                (
                    r"Return value must be of type ([^,]+), (\S+) returned",
                    Mismatch::ReturnValue,
                ),
                (
                    r"Cannot assign (\S+) to property ([\w\\]+)::\$(\w+) of type (\S+)",
                    Mismatch::TypedProperty,
                ),
                (
                    r"Unsupported operand types: (\S+) (\S+) (\S+)",
                    Mismatch::Operands,
                ),
                (
                    r"Cannot access offset of type (\S+) on (\S+)",
                    Mismatch::IllegalOffset,
                ),
                (
                    r"Call to a member function (\w+)\(\) on (string|int|bool|array|float)\b",
                    Mismatch::MemberOnScalar,
                ),
                (r"must be of type (\S+), (\S+) given", Mismatch::Generic),
            ]),
            excluded: PatternTable::new(&[(r"Call to a member function \w+\(\) on null", ())]),
        }
    }
}

impl Default for TypeMismatchStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ExplanationStrategy for TypeMismatchStrategy {
    fn name(&self) -> &'static str {
        TYPE_MISMATCH.name
    }

    fn supports(&self, context: &RuntimeContext) -> bool {
        let message = &context.exception.message;
        self.patterns.matches(message) && !self.excluded.matches(message)
    }

    fn explain(&self, context: &RuntimeContext) -> Explanation {
        let message = &context.exception.message;
        let Some((kind, caps)) = self.patterns.classify(message) else {
            return build(
                TYPE_MISMATCH,
                context,
                "TypeError",
                "A value has the wrong type".to_string(),
                format!("A value of an unexpected type was used: {message}"),
                vec!["Check the types of the values involved".to_string()],
            );
        };

        let (summary, cause, suggestions) = match kind {
            Mismatch::Argument => {
                let index = group(&caps, 1, "?");
                let param = group(&caps, 2, "");
                let expected = group(&caps, 3, "");
                let given = group(&caps, 4, "");
                (
                    format!("Argument #{index} (${param}) expects {expected}, got {given}"),
                    format!(
                        "Argument #{index} (${param}) is declared as {expected}, but the caller \
                         passed a value of type {given}."
                    ),
                    vec![
                        format!("Pass a value of type {expected} as argument #{index}"),
                        format!("Convert or validate the value before the call if {given} is possible"),
                        if given == "null" {
                            format!("If null is legitimate, declare the parameter as ?{expected}")
                        } else {
                            format!("Check the caller that builds ${param}")
                        },
                    ],
                )
            }
            Mismatch::ReturnValue => {
                let expected = group(&caps, 1, "");
                let given = group(&caps, 2, "");
                (
                    format!("Return value expected {expected}, got {given}"),
                    format!(
                        "The function declares a return type of {expected} but a code path \
                         returns {given}."
                    ),
                    vec![
                        format!("Make every return path produce a {expected}"),
                        format!("If {given} is a valid result, widen the return type"),
                    ],
                )
            }
            Mismatch::TypedProperty => {
                let given = group(&caps, 1, "");
                let class = group(&caps, 2, "");
                let property = group(&caps, 3, "");
                let expected = group(&caps, 4, "");
                (
                    format!("{class}::${property} cannot hold {given}"),
                    format!(
                        "The typed property {class}::${property} is declared as {expected}, \
                         but a {given} was assigned to it."
                    ),
                    vec![
                        format!("Assign a {expected} to ${property}"),
                        format!("If {given} should be allowed, change the property type"),
                    ],
                )
            }
            Mismatch::Operands => {
                let left = group(&caps, 1, "");
                let op = group(&caps, 2, "");
                let right = group(&caps, 3, "");
                (
                    format!("Operator {op} cannot combine {left} and {right}"),
                    format!("The {op} operator is not defined for {left} {op} {right}."),
                    vec![
                        "Check the types of both operands before the operation".to_string(),
                        if left == "array" || right == "array" {
                            "Use array_merge() or the + operator on two arrays".to_string()
                        } else {
                            "Cast the operands to numbers explicitly".to_string()
                        },
                    ],
                )
            }
            Mismatch::IllegalOffset => {
                let offset = group(&caps, 1, "");
                let container = group(&caps, 2, "");
                (
                    format!("Cannot use {offset} as an offset on {container}"),
                    format!(
                        "An offset of type {offset} was used to index a {container}. Offsets \
                         must be int or string, and the container must be an array or \
                         ArrayAccess."
                    ),
                    vec![
                        "Use an int or string key".to_string(),
                        format!("Check why the container is {container}"),
                    ],
                )
            }
            Mismatch::MemberOnScalar => {
                let method = group(&caps, 1, "");
                let scalar = group(&caps, 2, "");
                (
                    format!("Method {method}() was called on a {scalar}"),
                    format!(
                        "{method}() was called on a value of type {scalar}. Only objects have \
                         methods; the variable does not hold the object you expect."
                    ),
                    vec![
                        format!("Check what the variable holds before calling {method}()"),
                        "Hydrate the value into an object first".to_string(),
                    ],
                )
            }
            Mismatch::Generic => {
                let expected = group(&caps, 1, "");
                let given = group(&caps, 2, "");
                (
                    format!("Expected {expected}, got {given}"),
                    format!("A value of type {given} was used where {expected} is required."),
                    vec![format!("Pass a {expected} value")],
                )
            }
        };

        build(
            TYPE_MISMATCH,
            context,
            "TypeError",
            summary,
            cause,
            suggestions,
        )
    }

    fn priority(&self) -> i32 {
        TYPE_MISMATCH.priority
    }
}
