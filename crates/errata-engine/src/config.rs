//! Engine configuration.

use errata_ai::{AiConfig, ConfigError};
use thiserror::Error;
use tracing::warn;

/// Default cache lifetime, one hour.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

/// Configuration errors.
#[derive(Debug, Error, PartialEq)]
pub enum EngineConfigError {
    #[error("invalid AI configuration: {0}")]
    Ai(#[from] ConfigError),
}

/// Explanation cache settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Entry lifetime in seconds; 0 keeps entries for the engine's lifetime
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: DEFAULT_CACHE_TTL_SECS,
        }
    }
}

impl CacheConfig {
    /// Caching turned off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Read `ERRATA_CACHE_ENABLED` and `ERRATA_CACHE_TTL`.
    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let enabled = match var("ERRATA_CACHE_ENABLED") {
            Some(v) => !(v == "0" || v.eq_ignore_ascii_case("false")),
            None => defaults.enabled,
        };

        let ttl_secs = match var("ERRATA_CACHE_TTL") {
            Some(v) => v.trim().parse().unwrap_or_else(|_| {
                warn!("Ignoring invalid ERRATA_CACHE_TTL '{}'", v);
                defaults.ttl_secs
            }),
            None => defaults.ttl_secs,
        };

        Self { enabled, ttl_secs }
    }
}

/// Everything the engine needs, validated once before use.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub ai: AiConfig,
    pub cache: CacheConfig,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self {
            ai: AiConfig::from_env(),
            cache: CacheConfig::from_env(),
        }
    }

    pub fn validate(&self) -> Result<(), EngineConfigError> {
        self.ai.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = CacheConfig::from_vars(vars(&[]));
        assert!(config.enabled);
        assert_eq!(config.ttl_secs, 3600);
    }

    #[test]
    fn test_from_vars() {
        let config = CacheConfig::from_vars(vars(&[
            ("ERRATA_CACHE_ENABLED", "false"),
            ("ERRATA_CACHE_TTL", "0"),
        ]));
        assert_eq!(
            config,
            CacheConfig {
                enabled: false,
                ttl_secs: 0
            }
        );
    }

    #[test]
    fn test_invalid_ttl_keeps_default() {
        let config = CacheConfig::from_vars(vars(&[("ERRATA_CACHE_TTL", "soon")]));
        assert_eq!(config.ttl_secs, DEFAULT_CACHE_TTL_SECS);
    }

    #[test]
    fn test_validate_reports_ai_errors() {
        let config = EngineConfig {
            ai: AiConfig::builder().timeout_secs(0).build(),
            cache: CacheConfig::default(),
        };
        assert_eq!(
            config.validate(),
            Err(EngineConfigError::Ai(ConfigError::InvalidTimeout))
        );
        assert!(EngineConfig::default().validate().is_ok());
    }
}
