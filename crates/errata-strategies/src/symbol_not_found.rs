//! References to functions, methods, classes or constants that do not exist.

use errata_core::{Explanation, RuntimeContext};

use crate::calibration::SYMBOL_NOT_FOUND;
use crate::pattern::{group, PatternTable};
use crate::{build, ExplanationStrategy};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Symbol {
    Function,
    Method,
    Class,
    Constant,
}

pub struct SymbolNotFoundStrategy {
    patterns: PatternTable<Symbol>,
}

impl SymbolNotFoundStrategy {
    pub fn new() -> Self {
        Self {
            patterns: PatternTable::new(&[
                (r"Call to undefined function ([\w\\]+)\(\)", Symbol::Function),
                (
                    r"Call to undefined method ([\w\\]+)::(\w+)\(\)",
                    Symbol::Method,
                ),
                (
                    r#"(?:Class|Interface|Trait|Enum) ["']([^"']+)["'] not found"#,
                    Symbol::Class,
                ),
                (r#"Undefined constant "?([\w\\:]+)"?"#, Symbol::Constant),
            ]),
        }
    }
}

impl Default for SymbolNotFoundStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ExplanationStrategy for SymbolNotFoundStrategy {
    fn name(&self) -> &'static str {
        SYMBOL_NOT_FOUND.name
    }

    fn supports(&self, context: &RuntimeContext) -> bool {
        self.patterns.matches(&context.exception.message)
    }

    fn explain(&self, context: &RuntimeContext) -> Explanation {
        let message = &context.exception.message;
        let Some((kind, caps)) = self.patterns.classify(message) else {
            return build(
                SYMBOL_NOT_FOUND,
                context,
                "SymbolNotFoundError",
                "A referenced symbol does not exist".to_string(),
                message.clone(),
                vec!["Check the spelling and imports of the referenced symbol".to_string()],
            );
        };

        let (summary, cause, suggestions) = match kind {
            Symbol::Function => {
                let function = group(&caps, 1, "");
                (
                    format!("Function {function}() is not defined"),
                    format!(
                        "{function}() was called but no function with that name is loaded. It \
                         may be misspelled, defined in a file that is not included, provided \
                         by a missing extension, or only available in a newer runtime version."
                    ),
                    vec![
                        format!("Check the spelling of {function}()"),
                        "Make sure the file or package that defines it is autoloaded".to_string(),
                        "Check whether it requires an extension or newer runtime version"
                            .to_string(),
                        "Add a `use function` import if it lives in a namespace".to_string(),
                    ],
                )
            }
            Symbol::Method => {
                let class = group(&caps, 1, "");
                let method = group(&caps, 2, "");
                (
                    format!("Method {class}::{method}() is not defined"),
                    format!(
                        "{class} has no method named {method}(). The method may be misspelled, \
                         removed in a dependency upgrade, or defined on a different class than \
                         the object actually is."
                    ),
                    vec![
                        format!("Check the available methods of {class}"),
                        format!("Check the spelling of {method}()"),
                        "Verify the object is the type you expect (e.g. with get_class())"
                            .to_string(),
                    ],
                )
            }
            Symbol::Class => {
                let class = group(&caps, 1, "");
                (
                    format!("Class {class} was not found"),
                    format!(
                        "The autoloader could not find {class}. The namespace or file name \
                         does not match, a `use` statement is missing, or the package is not \
                         installed."
                    ),
                    vec![
                        format!("Add or fix the `use` statement for {class}"),
                        "Check that the file path matches the namespace (PSR-4)".to_string(),
                        "Regenerate the autoloader: composer dump-autoload".to_string(),
                        "Install the package that provides the class".to_string(),
                    ],
                )
            }
            Symbol::Constant => {
                let constant = group(&caps, 1, "");
                (
                    format!("Constant {constant} is not defined"),
                    format!(
                        "{constant} is referenced but never defined. A bare word may be \
                         missing its quotes or `$`, or the defining file is not loaded."
                    ),
                    vec![
                        format!("Define {constant} or import it with `use const`"),
                        "If it was meant to be a string, add quotes".to_string(),
                        "If it was meant to be a variable, add `$`".to_string(),
                    ],
                )
            }
        };

        build(
            SYMBOL_NOT_FOUND,
            context,
            "SymbolNotFoundError",
            summary,
            cause,
            suggestions,
        )
    }

    fn priority(&self) -> i32 {
        SYMBOL_NOT_FOUND.priority
    }
}
