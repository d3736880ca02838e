//! # Errata Explanation Engine
//!
//! Turns a [`RuntimeContext`](errata_core::RuntimeContext) into an
//! [`Explanation`](errata_core::Explanation), in this order:
//!
//! 1. the first supporting strategy, by descending priority
//! 2. the configured AI provider or fallback chain
//! 3. a descriptive fallback chosen by exception class
//!
//! Whatever wins is then enriched with the call site and source snippet.
//! [`CachingExplanationEngine`] memoizes the whole pipeline per error
//! signature.
//!
//! ```ignore
//! use errata_engine::{CachingExplanationEngine, EngineConfig, Explainer};
//!
//! let engine = CachingExplanationEngine::from_config(&EngineConfig::from_env());
//! let explanation = engine.explain(&context).await;
//! ```

mod cache;
mod config;
mod engine;
mod enrich;
mod fallback;

pub use cache::{CacheStore, CachingExplanationEngine, InMemoryCacheStore};
pub use config::{CacheConfig, EngineConfig, EngineConfigError, DEFAULT_CACHE_TTL_SECS};
pub use engine::{ExplanationEngine, Explainer};
pub use enrich::{call_site, enrich};
pub use fallback::{descriptive_fallback, FALLBACK_CONFIDENCE};
