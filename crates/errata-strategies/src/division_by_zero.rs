//! Division and modulo by zero.

use errata_core::{Explanation, RuntimeContext};

use crate::calibration::DIVISION_BY_ZERO;
use crate::pattern::PatternTable;
use crate::{build, ExplanationStrategy};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Operation {
    Division,
    Modulo,
}

pub struct DivisionByZeroStrategy {
    patterns: PatternTable<Operation>,
}

impl DivisionByZeroStrategy {
    pub fn new() -> Self {
        Self {
            patterns: PatternTable::new(&[
                (r"(?i)\bmodulo by zero\b", Operation::Modulo),
                (r"(?i)\bdivision by zero\b", Operation::Division),
            ]),
        }
    }
}

impl Default for DivisionByZeroStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ExplanationStrategy for DivisionByZeroStrategy {
    fn name(&self) -> &'static str {
        DIVISION_BY_ZERO.name
    }

    fn supports(&self, context: &RuntimeContext) -> bool {
        context.exception.class.contains("DivisionByZeroError")
            || self.patterns.matches(&context.exception.message)
    }

    fn explain(&self, context: &RuntimeContext) -> Explanation {
        let operation = self
            .patterns
            .classify(&context.exception.message)
            .map_or(Operation::Division, |(op, _)| op);

        let (summary, operator) = match operation {
            Operation::Division => ("Division by zero", "/"),
            Operation::Modulo => ("Modulo by zero", "%"),
        };

        let mut cause = format!(
            "The right-hand operand of {operator} evaluated to zero. The divisor usually comes \
             from a count, a total or user input that can legitimately be 0."
        );
        if let Some(line) = context.source.failing_line() {
            cause.push_str(&format!(" Failing expression: {}", line.trim()));
        }

        build(
            DIVISION_BY_ZERO,
            context,
            "DivisionByZeroError",
            summary.to_string(),
            cause,
            vec![
                "Check the divisor before the operation: if ($divisor === 0) { ... }".to_string(),
                "Return a sensible default (0, null) when the divisor is zero".to_string(),
                "Validate user input that feeds the divisor".to_string(),
                "Use fdiv() if INF/NAN is an acceptable result".to_string(),
            ],
        )
    }

    fn priority(&self) -> i32 {
        DIVISION_BY_ZERO.priority
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ctx;
    use errata_core::{ExceptionInfo, SourceContext};
    use std::collections::BTreeMap;

    #[test]
    fn test_division_by_zero() {
        let strategy = DivisionByZeroStrategy::new();
        let context = ctx("DivisionByZeroError", "Division by zero");
        assert!(strategy.supports(&context));
        let e = strategy.explain(&context);
        assert_eq!(e.confidence, 0.90);
        assert_eq!(e.error_type, "DivisionByZeroError");
    }

    #[test]
    fn test_modulo() {
        let strategy = DivisionByZeroStrategy::new();
        let e = strategy.explain(&ctx("DivisionByZeroError", "Modulo by zero"));
        assert_eq!(e.message, "Modulo by zero");
        assert!(e.cause.contains('%'));
    }

    #[test]
    fn test_cause_quotes_failing_line() {
        let mut lines = BTreeMap::new();
        lines.insert(7, "    return $total / $count;".to_string());
        let context = RuntimeContext::new(
            ExceptionInfo::new("DivisionByZeroError", "Division by zero").at("avg.php", 7),
            SourceContext::new("avg.php", 7, "").with_lines(lines),
        );
        let e = DivisionByZeroStrategy::new().explain(&context);
        assert!(e.cause.contains("return $total / $count;"));
    }
}
