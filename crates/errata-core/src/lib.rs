//! # Errata Core
//!
//! Value types shared by every Errata component: the [`RuntimeContext`]
//! describing one failure occurrence, and the [`Explanation`] produced for it.
//!
//! Both are built once per analysis pass and never mutated afterwards.
//! Transformations such as [`Explanation::with_code_context`] return a new
//! value.
//!
//! ## Example
//!
//! ```
//! use errata_core::{ExceptionInfo, RuntimeContext, SourceContext};
//!
//! let context = RuntimeContext::new(
//!     ExceptionInfo::new("TypeError", "Call to a member function getId() on null")
//!         .at("src/Controller/UserController.php", 42),
//!     SourceContext::empty(),
//! );
//!
//! assert_eq!(context.exception.short_class(), "TypeError");
//! assert!(context.request.is_none());
//! ```

mod context;
mod explanation;
mod frame;

pub use context::*;
pub use explanation::*;
pub use frame::*;
