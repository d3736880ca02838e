//! Fixed priority and confidence per strategy.
//!
//! Confidence reflects how specific a strategy's patterns are. The values
//! are calibrated constants, not derived.

/// Priority and confidence of one strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub name: &'static str,
    pub priority: i32,
    pub confidence: f64,
}

pub const SYNTAX_ERROR: Calibration = Calibration {
    name: "SyntaxError",
    priority: 100,
    confidence: 0.95,
};

pub const DIVISION_BY_ZERO: Calibration = Calibration {
    name: "DivisionByZero",
    priority: 90,
    confidence: 0.90,
};

pub const ARGUMENT_COUNT: Calibration = Calibration {
    name: "ArgumentCount",
    priority: 85,
    confidence: 0.90,
};

pub const NULL_REFERENCE: Calibration = Calibration {
    name: "NullReference",
    priority: 80,
    confidence: 0.85,
};

pub const TYPE_MISMATCH: Calibration = Calibration {
    name: "TypeMismatch",
    priority: 70,
    confidence: 0.88,
};

pub const SYMBOL_NOT_FOUND: Calibration = Calibration {
    name: "SymbolNotFound",
    priority: 60,
    confidence: 0.87,
};

pub const UNDEFINED_KEY: Calibration = Calibration {
    name: "UndefinedKey",
    priority: 50,
    confidence: 0.86,
};

pub const INVALID_VALUE: Calibration = Calibration {
    name: "InvalidValue",
    priority: 40,
    confidence: 0.82,
};

/// All built-in calibrations, highest priority first.
pub const ALL: [Calibration; 8] = [
    SYNTAX_ERROR,
    DIVISION_BY_ZERO,
    ARGUMENT_COUNT,
    NULL_REFERENCE,
    TYPE_MISMATCH,
    SYMBOL_NOT_FOUND,
    UNDEFINED_KEY,
    INVALID_VALUE,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_in_calibrated_range() {
        for c in ALL {
            assert!((0.82..=0.95).contains(&c.confidence), "{}", c.name);
        }
    }

    #[test]
    fn test_priorities_are_distinct_and_ordered() {
        for pair in ALL.windows(2) {
            assert!(pair[0].priority > pair[1].priority);
        }
    }
}
