//! AI configuration.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;

use crate::RetryPolicy;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Inference backends Errata can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProviderKind {
    /// Anthropic Messages API
    Anthropic,
    /// OpenAI or any OpenAI-compatible chat completions server (llama.cpp, gateways)
    OpenAi,
    /// Local Ollama server
    Ollama,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 3] = [
        ProviderKind::Anthropic,
        ProviderKind::OpenAi,
        ProviderKind::Ollama,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::OpenAi => "openai",
            ProviderKind::Ollama => "ollama",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "claude-3-5-sonnet-20241022",
            ProviderKind::OpenAi => "gpt-4o-mini",
            ProviderKind::Ollama => "deepseek-coder-v2",
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "https://api.anthropic.com",
            ProviderKind::OpenAi => "https://api.openai.com/v1",
            ProviderKind::Ollama => "http://localhost:11434",
        }
    }

    pub fn requires_api_key(self) -> bool {
        !matches!(self, ProviderKind::Ollama)
    }

    /// Conventional environment variables holding this backend's key.
    fn api_key_vars(self) -> &'static [&'static str] {
        match self {
            ProviderKind::Anthropic => &["ANTHROPIC_API_KEY", "CLAUDE_API_KEY"],
            ProviderKind::OpenAi => &["OPENAI_API_KEY"],
            ProviderKind::Ollama => &[],
        }
    }

    fn api_key_from_env(self) -> String {
        self.api_key_vars()
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|v| !v.is_empty()))
            .unwrap_or_default()
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "anthropic" | "claude" => Ok(ProviderKind::Anthropic),
            "openai" | "openai-compatible" | "llamacpp" | "llama.cpp" => Ok(ProviderKind::OpenAi),
            "ollama" => Ok(ProviderKind::Ollama),
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("unknown AI provider '{0}' (expected anthropic, openai or ollama)")]
    UnknownProvider(String),
    #[error("timeout must be at least one second")]
    InvalidTimeout,
    #[error("no model configured for provider {0}")]
    MissingModel(ProviderKind),
}

/// Configuration for AI-backed explanations.
#[derive(Debug, Clone)]
pub struct AiConfig {
    /// Master switch; nothing is sent when false
    pub enabled: bool,
    /// Primary provider
    pub provider: ProviderKind,
    /// Model for the primary provider
    pub model: String,
    /// API key for the primary provider
    pub api_key: String,
    /// Override the primary provider's base URL
    pub base_url: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Maximum tokens in response
    pub max_tokens: u32,
    /// Providers tried in order when the primary yields nothing
    pub fallback_providers: Vec<ProviderKind>,
    /// API keys for fallback providers
    pub fallback_api_keys: BTreeMap<ProviderKind, String>,
    pub retry: RetryPolicy,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: ProviderKind::Anthropic,
            model: ProviderKind::Anthropic.default_model().to_string(),
            api_key: String::new(),
            base_url: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_tokens: 1024,
            fallback_providers: Vec::new(),
            fallback_api_keys: BTreeMap::new(),
            retry: RetryPolicy::default(),
        }
    }
}

impl AiConfig {
    /// Create config from environment variables.
    ///
    /// Unknown provider names are logged and ignored.
    pub fn from_env() -> Self {
        let enabled = std::env::var("ERRATA_AI_ENABLED")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let provider = match std::env::var("ERRATA_AI_PROVIDER") {
            Ok(name) => name.parse().unwrap_or_else(|e| {
                warn!("{}; using {}", e, ProviderKind::Anthropic);
                ProviderKind::Anthropic
            }),
            Err(_) => ProviderKind::Anthropic,
        };

        let model = std::env::var("ERRATA_AI_MODEL")
            .ok()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| provider.default_model().to_string());

        let api_key = std::env::var("ERRATA_AI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .unwrap_or_else(|| provider.api_key_from_env());

        let base_url = std::env::var("ERRATA_AI_BASE_URL")
            .ok()
            .filter(|u| !u.is_empty());

        let timeout_secs = std::env::var("ERRATA_AI_TIMEOUT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let fallback_providers = std::env::var("ERRATA_AI_FALLBACK")
            .map(|list| parse_provider_list(&list))
            .unwrap_or_default();

        let fallback_api_keys = fallback_providers
            .iter()
            .map(|kind| (*kind, kind.api_key_from_env()))
            .filter(|(_, key)| !key.is_empty())
            .collect();

        Self {
            enabled,
            provider,
            model,
            api_key,
            base_url,
            timeout_secs,
            fallback_providers,
            fallback_api_keys,
            ..Self::default()
        }
    }

    /// Create a builder for configuration.
    pub fn builder() -> AiConfigBuilder {
        AiConfigBuilder::default()
    }

    /// Check the configuration once, before any provider is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        if self.enabled && self.model.trim().is_empty() {
            return Err(ConfigError::MissingModel(self.provider));
        }
        Ok(())
    }

    /// Settings for the primary provider.
    pub fn primary_settings(&self) -> ProviderSettings {
        ProviderSettings {
            kind: self.provider,
            enabled: self.enabled,
            model: self.model.clone(),
            api_key: self.api_key.clone(),
            base_url: self
                .base_url
                .clone()
                .unwrap_or_else(|| self.provider.default_base_url().to_string()),
            timeout_secs: self.timeout_secs,
            max_tokens: self.max_tokens,
            retry: self.retry,
        }
    }

    /// Settings for a fallback provider: its default model and base URL, its own key.
    pub fn fallback_settings(&self, kind: ProviderKind) -> ProviderSettings {
        ProviderSettings {
            kind,
            enabled: self.enabled,
            model: kind.default_model().to_string(),
            api_key: self
                .fallback_api_keys
                .get(&kind)
                .cloned()
                .unwrap_or_default(),
            base_url: kind.default_base_url().to_string(),
            timeout_secs: self.timeout_secs,
            max_tokens: self.max_tokens,
            retry: self.retry,
        }
    }
}

/// Parse a comma-separated provider list, skipping unknown names.
fn parse_provider_list(list: &str) -> Vec<ProviderKind> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter_map(|name| match name.parse() {
            Ok(kind) => Some(kind),
            Err(e) => {
                warn!("Ignoring fallback provider: {}", e);
                None
            }
        })
        .collect()
}

/// Resolved settings for one provider instance.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub kind: ProviderKind,
    pub enabled: bool,
    pub model: String,
    pub api_key: String,
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_tokens: u32,
    pub retry: RetryPolicy,
}

impl ProviderSettings {
    /// Settings for `kind` with its defaults, enabled.
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            enabled: true,
            model: kind.default_model().to_string(),
            api_key: String::new(),
            base_url: kind.default_base_url().to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_tokens: 1024,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = key.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Whether the provider can be used. Pure configuration check, no I/O.
    pub fn is_available(&self) -> bool {
        self.enabled
            && !self.model.trim().is_empty()
            && (!self.kind.requires_api_key() || !self.api_key.is_empty())
    }

    /// Join `path` onto the base URL.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Builder for AI configuration.
#[derive(Debug, Default)]
pub struct AiConfigBuilder {
    config: AiConfig,
}

impl AiConfigBuilder {
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.config.enabled = enabled;
        self
    }

    /// Select the primary provider, resetting the model to its default.
    pub fn provider(mut self, kind: ProviderKind) -> Self {
        self.config.provider = kind;
        self.config.model = kind.default_model().to_string();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.config.max_tokens = tokens;
        self
    }

    /// Append a fallback provider with its API key (empty for keyless backends).
    pub fn fallback(mut self, kind: ProviderKind, api_key: impl Into<String>) -> Self {
        self.config.fallback_providers.push(kind);
        let key = api_key.into();
        if !key.is_empty() {
            self.config.fallback_api_keys.insert(kind, key);
        }
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.config.retry = retry;
        self
    }

    pub fn build(self) -> AiConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_disabled() {
        let config = AiConfig::default();
        assert!(!config.enabled);
        assert!(!config.primary_settings().is_available());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_provider_kind_parsing() {
        assert_eq!("OpenAI".parse::<ProviderKind>(), Ok(ProviderKind::OpenAi));
        assert_eq!("claude".parse::<ProviderKind>(), Ok(ProviderKind::Anthropic));
        assert_eq!(" ollama ".parse::<ProviderKind>(), Ok(ProviderKind::Ollama));
        assert_eq!(
            "gemini".parse::<ProviderKind>(),
            Err(ConfigError::UnknownProvider("gemini".into()))
        );
    }

    #[test]
    fn test_parse_provider_list_skips_unknown() {
        assert_eq!(
            parse_provider_list("openai, bogus,ollama,"),
            vec![ProviderKind::OpenAi, ProviderKind::Ollama]
        );
    }

    #[test]
    fn test_availability_requires_key_where_needed() {
        let settings = ProviderSettings::new(ProviderKind::OpenAi);
        assert!(!settings.is_available());
        assert!(settings.with_api_key("sk-test").is_available());

        assert!(ProviderSettings::new(ProviderKind::Ollama).is_available());
    }

    #[test]
    fn test_builder_and_validation() {
        let config = AiConfig::builder()
            .enabled(true)
            .provider(ProviderKind::OpenAi)
            .api_key("sk-test")
            .timeout_secs(0)
            .build();
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.validate(), Err(ConfigError::InvalidTimeout));

        let config = AiConfig::builder().enabled(true).model("").build();
        assert_eq!(
            config.validate(),
            Err(ConfigError::MissingModel(ProviderKind::Anthropic))
        );
    }

    #[test]
    fn test_fallback_settings_use_own_defaults() {
        let config = AiConfig::builder()
            .enabled(true)
            .provider(ProviderKind::OpenAi)
            .api_key("sk-primary")
            .base_url("http://gateway.local/v1")
            .fallback(ProviderKind::Anthropic, "sk-ant")
            .fallback(ProviderKind::Ollama, "")
            .build();

        let primary = config.primary_settings();
        assert_eq!(primary.base_url, "http://gateway.local/v1");

        let anthropic = config.fallback_settings(ProviderKind::Anthropic);
        assert_eq!(anthropic.api_key, "sk-ant");
        assert_eq!(anthropic.base_url, "https://api.anthropic.com");
        assert!(anthropic.is_available());

        let ollama = config.fallback_settings(ProviderKind::Ollama);
        assert!(ollama.api_key.is_empty());
        assert!(ollama.is_available());
    }

    #[test]
    fn test_endpoint_joining() {
        let settings = ProviderSettings::new(ProviderKind::Ollama).with_base_url("http://h:1/");
        assert_eq!(settings.endpoint("api/generate"), "http://h:1/api/generate");
    }
}
