//! Descriptive fallback for failures nothing else could explain.

use errata_core::{Explanation, RuntimeContext};

/// Confidence of every descriptive fallback.
pub const FALLBACK_CONFIDENCE: f64 = 0.5;

/// A canned explanation for one well-known exception family.
struct Family {
    /// Substring matched against the exception class
    marker: &'static str,
    cause: &'static str,
    suggestions: &'static [&'static str],
}

/// Most specific markers first: `OutOfRangeException` must be tried before
/// `RangeException`, the SPL subclasses before `LogicException` and
/// `RuntimeException`.
const TAXONOMY: &[Family] = &[
    Family {
        marker: "OutOfRangeException",
        cause: "An index or key outside the valid range was requested. This is a logic error: the range is known before the program runs.",
        suggestions: &[
            "Check the index against the collection size before using it",
            "Validate user-supplied indexes at the boundary",
        ],
    },
    Family {
        marker: "OutOfBoundsException",
        cause: "A value was not a valid key or index for the collection it was used on, and the valid set is only known at runtime.",
        suggestions: &[
            "Verify the key exists before accessing it",
            "Log the available keys to see what the collection actually contains",
        ],
    },
    Family {
        marker: "RangeException",
        cause: "A computed value fell outside its valid range at runtime.",
        suggestions: &[
            "Check the inputs of the calculation that produced the value",
            "Clamp or reject values outside the expected range",
        ],
    },
    Family {
        marker: "InvalidArgumentException",
        cause: "A function received an argument it does not accept.",
        suggestions: &[
            "Check the value passed at the call site against the function's documented contract",
            "Validate input before passing it down",
        ],
    },
    Family {
        marker: "DomainException",
        cause: "A value does not belong to the domain the code was written for.",
        suggestions: &[
            "Check which values the operation supports",
            "Handle the unsupported case explicitly before calling it",
        ],
    },
    Family {
        marker: "LengthException",
        cause: "A value had an invalid length.",
        suggestions: &[
            "Check the length limits of the receiving code",
            "Truncate or reject input that exceeds them",
        ],
    },
    Family {
        marker: "UnexpectedValueException",
        cause: "A function returned, or a source produced, a value of an unexpected type or shape.",
        suggestions: &[
            "Inspect the value that was actually produced",
            "Check the contract of the function or data source it came from",
        ],
    },
    Family {
        marker: "OverflowException",
        cause: "An element was added to a container that is already full.",
        suggestions: &[
            "Check the container's capacity before adding elements",
            "Increase the capacity or drain the container first",
        ],
    },
    Family {
        marker: "UnderflowException",
        cause: "An operation was attempted on an empty container.",
        suggestions: &[
            "Check that the container is not empty before removing elements",
            "Handle the empty case explicitly",
        ],
    },
    Family {
        marker: "BadMethodCallException",
        cause: "A method was called that does not exist or cannot be called in the current state.",
        suggestions: &[
            "Check the method name for typos",
            "Check that magic call handlers forward the method you expect",
        ],
    },
    Family {
        marker: "BadFunctionCallException",
        cause: "A callback referred to a function that does not exist or was called with the wrong arguments.",
        suggestions: &[
            "Check that the callback is defined and callable",
            "Check the arguments passed to the callback",
        ],
    },
    Family {
        marker: "LogicException",
        cause: "A logic exception signals a bug in the program's own logic that should be fixed in code rather than handled at runtime.",
        suggestions: &[
            "Read the message for the violated assumption",
            "Trace how the program reached this state and correct the logic",
        ],
    },
    Family {
        marker: "JsonException",
        cause: "Encoding or decoding JSON failed.",
        suggestions: &[
            "Validate the JSON input with a linter",
            "Check for invalid UTF-8 or values that cannot be encoded",
        ],
    },
    Family {
        marker: "PDOException",
        cause: "The database driver reported an error while connecting or executing a query.",
        suggestions: &[
            "Check the database connection settings",
            "Run the failing query directly against the database to see the full error",
        ],
    },
    Family {
        marker: "ErrorException",
        cause: "A runtime warning or notice was converted into an exception by the error handler.",
        suggestions: &[
            "Read the original warning text in the message",
            "Fix the condition that emitted the warning instead of silencing it",
        ],
    },
    Family {
        marker: "RuntimeException",
        cause: "A runtime exception was raised: an error that can only be detected while the program runs, usually caused by external state such as I/O, configuration or unavailable services.",
        suggestions: &[
            "Read the message for the resource or state that was unavailable",
            "Check configuration and external services the code depends on",
            "Add handling for this failure where the resource is used",
        ],
    },
];

/// Classify by exception class alone. Always non-empty.
pub fn descriptive_fallback(context: &RuntimeContext) -> Explanation {
    let exception = &context.exception;
    let class = match exception.short_class() {
        "" => "Unknown",
        class => class,
    };

    let message = if exception.message.trim().is_empty() {
        format!("{class} was thrown")
    } else {
        exception.message.clone()
    };

    let (cause, suggestions) = match TAXONOMY
        .iter()
        .find(|family| exception.class.contains(family.marker))
    {
        Some(family) => (
            family.cause.to_string(),
            family.suggestions.iter().map(|s| s.to_string()).collect(),
        ),
        None => generic(class),
    };

    Explanation::new(message, cause, suggestions, FALLBACK_CONFIDENCE)
        .with_error_type(class)
        .with_location(context.location())
        .with_metadata("strategy", "DescriptiveFallback")
}

fn generic(class: &str) -> (String, Vec<String>) {
    (
        format!("An exception of type {class} was thrown and no known pattern describes it."),
        vec![
            "Read the exception message and the stack trace for the failing call".to_string(),
            format!("Check the documentation of {class} for the conditions that raise it"),
            "Reproduce the failure with additional logging around the failing line".to_string(),
        ],
    )
}
