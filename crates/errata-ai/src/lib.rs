//! # Errata AI Integration
//!
//! This crate turns a captured runtime failure into a natural-language
//! explanation by asking an external language model.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────┐
//! │ RuntimeContext  │ --> │   AIProvider    │ --> │   Explanation   │
//! │   (captured)    │     │ (prompt + call) │     │ (parsed reply)  │
//! └─────────────────┘     └─────────────────┘     └─────────────────┘
//!                               │
//!                       ┌───────┴────────┐
//!                       │ RetryPolicy /  │
//!                       │ fallback chain │
//!                       └────────────────┘
//! ```
//!
//! ## Backends
//!
//! - **Anthropic** - Messages API
//! - **OpenAI** - any `/chat/completions` compatible server
//! - **Ollama** - local inference via `/api/generate`
//!
//! Providers never return errors to the caller. Transport failures, bad
//! status codes and unparseable replies are logged and surface as an
//! empty [`Explanation`](errata_core::Explanation).
//!
//! ## Usage
//!
//! ```ignore
//! use errata_ai::{provider_from_config, AiConfig};
//!
//! let config = AiConfig::from_env();
//! if let Some(provider) = provider_from_config(&config) {
//!     let explanation = provider.analyze(&context).await;
//! }
//! ```

mod chain;
mod config;
mod error;
mod factory;
mod prompt;
mod provider;
pub mod providers;
mod response;
mod retry;

pub use chain::FallbackChainProvider;
pub use config::{
    AiConfig, AiConfigBuilder, ConfigError, ProviderKind, ProviderSettings, DEFAULT_TIMEOUT_SECS,
};
pub use error::ProviderError;
pub use factory::{build_provider, provider_from_config};
pub use prompt::{build_user_prompt, MAX_PROMPT_FRAMES, SYSTEM_PROMPT};
pub use provider::{analyze_with, AIProvider, ChatBackend, Completion};
pub use providers::{AnthropicProvider, OllamaProvider, OpenAiProvider};
pub use response::{parse_response, DEFAULT_JSON_CONFIDENCE, HEURISTIC_CONFIDENCE};
pub use retry::RetryPolicy;
