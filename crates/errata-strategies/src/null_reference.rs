//! Member access on a null value.

use errata_core::{Explanation, RuntimeContext};

use crate::calibration::NULL_REFERENCE;
use crate::pattern::{group, PatternTable};
use crate::{build, ExplanationStrategy};

#[derive(Debug, Clone, Copy, PartialEq)]
enum NullAccess {
    MethodCall,
    PropertyRead,
    PropertyWrite,
    ArrayOffset,
    Generic,
}

/// Recognises method calls, property access and array access on `null`.
///
/// "on null" messages about illegal offset types or parameter types belong
/// to [`TypeMismatchStrategy`](crate::TypeMismatchStrategy) and are declined.
pub struct NullReferenceStrategy {
    patterns: PatternTable<NullAccess>,
    excluded: PatternTable<()>,
}

impl NullReferenceStrategy {
    pub fn new() -> Self {
        Self {
            patterns: PatternTable::new(&[
                (
                    r"Call to a member function (\w+)\(\) on null",
                    NullAccess::MethodCall,
                ),
                (
                    r#"Attempt to read property "(\w+)" on null"#,
                    NullAccess::PropertyRead,
                ),
                (
                    r"Trying to get property '(\w+)' of non-object",
                    NullAccess::PropertyRead,
                ),
                (
                    r#"Attempt to assign property "(\w+)" on null"#,
                    NullAccess::PropertyWrite,
                ),
                (
                    r"Trying to access array offset on (?:value of type )?null",
                    NullAccess::ArrayOffset,
                ),
                (r"\bon null\b", NullAccess::Generic),
            ]),
            excluded: PatternTable::new(&[
                (r"Cannot access offset of type \S+ on null", ()),
                (r"must be of type", ()),
            ]),
        }
    }
}

impl Default for NullReferenceStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ExplanationStrategy for NullReferenceStrategy {
    fn name(&self) -> &'static str {
        NULL_REFERENCE.name
    }

    fn supports(&self, context: &RuntimeContext) -> bool {
        let message = &context.exception.message;
        self.patterns.matches(message) && !self.excluded.matches(message)
    }

    fn explain(&self, context: &RuntimeContext) -> Explanation {
        let message = &context.exception.message;
        let (kind, member) = match self.patterns.classify(message) {
            Some((kind, caps)) => (kind, group(&caps, 1, "").to_string()),
            None => (NullAccess::Generic, String::new()),
        };

        let (summary, cause, mut suggestions) = match kind {
            NullAccess::MethodCall => (
                format!("Method {member}() was called on a null value"),
                format!(
                    "The code calls {member}() on a variable that holds null instead of an \
                     object. The value was most likely returned by a lookup that found nothing, \
                     an uninitialised property, or a function that returns null on failure."
                ),
                vec![
                    format!("Check that the object is not null before calling {member}()"),
                    format!("Use the nullsafe operator: $object?->{member}()"),
                    "Trace where the variable is assigned and make the lookup fail loudly \
                     (e.g. findOrFail) when nothing is found"
                        .to_string(),
                ],
            ),
            NullAccess::PropertyRead => (
                format!("Property \"{member}\" was read from a null value"),
                format!(
                    "The code reads the property {member} from a variable that is null. The \
                     object it expects was never created or was not found."
                ),
                vec![
                    format!("Guard the access: $object?->{member}"),
                    format!("Provide a default: $object?->{member} ?? $default"),
                    "Verify the object is loaded before it is used".to_string(),
                ],
            ),
            NullAccess::PropertyWrite => (
                format!("Property \"{member}\" was assigned on a null value"),
                format!(
                    "The code assigns {member} on a variable that is null, so there is no \
                     object to write to."
                ),
                vec![
                    "Instantiate the object before assigning properties to it".to_string(),
                    "Check the constructor or factory that should have created it".to_string(),
                ],
            ),
            NullAccess::ArrayOffset => (
                "An array offset was read from a null value".to_string(),
                "The code indexes into a variable that is null instead of an array. The \
                 array was never populated or a function returned null."
                    .to_string(),
                vec![
                    "Use the null coalescing operator: $value['key'] ?? $default".to_string(),
                    "Initialise the variable as an empty array".to_string(),
                    "Check the return value of the function that produced it".to_string(),
                ],
            ),
            NullAccess::Generic => (
                "An operation was performed on a null value".to_string(),
                "A value that was expected to be an object or array is null.".to_string(),
                vec![
                    "Check where the value is assigned and handle the null case".to_string(),
                    "Add a null check or use the nullsafe operator (?->)".to_string(),
                ],
            ),
        };

        if let Some(line) = context.source.failing_line() {
            suggestions.push(format!("Review the failing line: {}", line.trim()));
        }

        build(
            NULL_REFERENCE,
            context,
            "NullReferenceError",
            summary,
            cause,
            suggestions,
        )
    }

    fn priority(&self) -> i32 {
        NULL_REFERENCE.priority
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ctx;

    #[test]
    fn test_method_call_on_null() {
        let strategy = NullReferenceStrategy::new();
        let context = ctx("TypeError", "Call to a member function getId() on null");

        assert!(strategy.supports(&context));
        let e = strategy.explain(&context);
        assert_eq!(e.confidence, 0.85);
        assert!(e.cause.contains("getId()"));
        assert!(e.cause.contains("null"));
        assert!(!e.suggestions.is_empty());
        assert_eq!(e.error_type, "NullReferenceError");
    }

    #[test]
    fn test_property_read() {
        let strategy = NullReferenceStrategy::new();
        let context = ctx("Warning", "Attempt to read property \"name\" on null");
        let e = strategy.explain(&context);
        assert!(e.message.contains("name"));
        assert!(e.suggestions[0].contains("?->name"));
    }

    #[test]
    fn test_legacy_non_object() {
        let strategy = NullReferenceStrategy::new();
        assert!(strategy.supports(&ctx("ErrorException", "Trying to get property 'id' of non-object")));
    }

    #[test]
    fn test_declines_type_mismatch_messages() {
        let strategy = NullReferenceStrategy::new();
        assert!(!strategy.supports(&ctx("TypeError", "Cannot access offset of type array on null")));
        assert!(!strategy.supports(&ctx(
            "TypeError",
            "f(): Argument #1 ($x) must be of type Foo, null given, called in a.php on line 3"
        )));
    }

    #[test]
    fn test_declines_unrelated() {
        let strategy = NullReferenceStrategy::new();
        assert!(!strategy.supports(&ctx("RuntimeException", "Connection refused")));
        assert!(!strategy.supports(&ctx("Error", "Call to a member function save() on string")));
    }
}
