//! # Errata Strategies
//!
//! Deterministic matchers, each recognising one family of failure and
//! producing a template-filled [`Explanation`] without any AI call.
//!
//! Every strategy keeps its own ordered [`PatternTable`] mapping message
//! patterns to a sub-type; the sub-type selects the cause and suggestion
//! templates. Strategies are mutually exclusive: where two message families
//! overlap, one of them explicitly declines the other's messages.
//!
//! ```
//! use errata_core::{ExceptionInfo, RuntimeContext, SourceContext};
//! use errata_strategies::{ExplanationStrategy, NullReferenceStrategy};
//!
//! let ctx = RuntimeContext::new(
//!     ExceptionInfo::new("Error", "Call to a member function getId() on null"),
//!     SourceContext::empty(),
//! );
//! let strategy = NullReferenceStrategy::new();
//! assert!(strategy.supports(&ctx));
//! assert!(strategy.explain(&ctx).cause.contains("getId()"));
//! ```

pub mod calibration;
mod pattern;

mod argument_count;
mod division_by_zero;
mod invalid_value;
mod null_reference;
mod symbol_not_found;
mod syntax_error;
mod type_mismatch;
mod undefined_key;

pub use argument_count::ArgumentCountStrategy;
pub use calibration::Calibration;
pub use division_by_zero::DivisionByZeroStrategy;
pub use invalid_value::InvalidValueStrategy;
pub use null_reference::NullReferenceStrategy;
pub use pattern::PatternTable;
pub use symbol_not_found::SymbolNotFoundStrategy;
pub use syntax_error::SyntaxErrorStrategy;
pub use type_mismatch::TypeMismatchStrategy;
pub use undefined_key::UndefinedKeyStrategy;

use errata_core::{Explanation, RuntimeContext};

/// A single deterministic rule recognising one failure family.
pub trait ExplanationStrategy: Send + Sync {
    /// Stable strategy name, recorded in explanation metadata.
    fn name(&self) -> &'static str;

    /// Pure predicate over the exception (and optionally source context).
    fn supports(&self, context: &RuntimeContext) -> bool;

    /// Only called after [`supports`](Self::supports) returned true for the
    /// same context. Must return a non-empty explanation.
    fn explain(&self, context: &RuntimeContext) -> Explanation;

    /// Higher runs first.
    fn priority(&self) -> i32;
}

/// All built-in strategies, in registration order.
pub fn default_strategies() -> Vec<Box<dyn ExplanationStrategy>> {
    vec![
        Box::new(NullReferenceStrategy::new()),
        Box::new(UndefinedKeyStrategy::new()),
        Box::new(TypeMismatchStrategy::new()),
        Box::new(ArgumentCountStrategy::new()),
        Box::new(SymbolNotFoundStrategy::new()),
        Box::new(DivisionByZeroStrategy::new()),
        Box::new(SyntaxErrorStrategy::new()),
        Box::new(InvalidValueStrategy::new()),
    ]
}

/// Assemble a strategy explanation with the calibrated confidence.
pub(crate) fn build(
    calibration: Calibration,
    context: &RuntimeContext,
    error_type: &str,
    message: String,
    cause: String,
    suggestions: Vec<String>,
) -> Explanation {
    Explanation::new(message, cause, suggestions, calibration.confidence)
        .with_error_type(error_type)
        .with_location(context.location())
        .with_metadata("strategy", calibration.name)
}

#[cfg(test)]
pub(crate) mod test_support {
    use errata_core::{ExceptionInfo, RuntimeContext, SourceContext};

    pub fn ctx(class: &str, message: &str) -> RuntimeContext {
        RuntimeContext::new(
            ExceptionInfo::new(class, message).at("src/App.php", 12),
            SourceContext::empty(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::ctx;
    use super::*;

    /// Messages paired with the only strategy expected to claim them.
    const CLAIMS: &[(&str, &str, &str)] = &[
        ("Error", "Call to a member function getId() on null", "NullReference"),
        ("Warning", "Undefined array key \"email\"", "UndefinedKey"),
        (
            "TypeError",
            "App\\Mailer::send(): Argument #1 ($to) must be of type string, null given",
            "TypeMismatch",
        ),
        (
            "TypeError",
            "Cannot access offset of type array on null",
            "TypeMismatch",
        ),
        (
            "ArgumentCountError",
            "Too few arguments to function greet(), 0 passed and exactly 1 expected",
            "ArgumentCount",
        ),
        ("Error", "Call to undefined function array_first()", "SymbolNotFound"),
        ("DivisionByZeroError", "Division by zero", "DivisionByZero"),
        ("ParseError", "syntax error, unexpected token \"}\"", "SyntaxError"),
        (
            "ValueError",
            "str_repeat(): Argument #2 ($times) must be greater than or equal to 0",
            "InvalidValue",
        ),
    ];

    #[test]
    fn test_strategies_are_mutually_exclusive() {
        let strategies = default_strategies();
        for (class, message, expected) in CLAIMS {
            let context = ctx(class, message);
            let claimed: Vec<&str> = strategies
                .iter()
                .filter(|s| s.supports(&context))
                .map(|s| s.name())
                .collect();
            assert_eq!(claimed, vec![*expected], "message: {message}");
        }
    }

    #[test]
    fn test_every_claim_explains_non_empty_within_bounds() {
        let strategies = default_strategies();
        for (class, message, _) in CLAIMS {
            let context = ctx(class, message);
            for s in strategies.iter().filter(|s| s.supports(&context)) {
                let e = s.explain(&context);
                assert!(!e.is_empty());
                assert!(!e.suggestions.is_empty());
                assert!((0.0..=1.0).contains(&e.confidence));
                assert_eq!(e.location, "src/App.php:12");
            }
        }
    }

    #[test]
    fn test_unrelated_message_is_unclaimed() {
        let context = ctx("RuntimeException", "Payment gateway rejected the charge");
        assert!(default_strategies().iter().all(|s| !s.supports(&context)));
    }
}
