//! Building providers from configuration.

use tracing::{debug, warn};

use crate::providers::{AnthropicProvider, OllamaProvider, OpenAiProvider};
use crate::{AIProvider, AiConfig, FallbackChainProvider, ProviderError, ProviderKind, ProviderSettings};

/// Build a single provider for `settings`.
pub fn build_provider(settings: ProviderSettings) -> Result<Box<dyn AIProvider>, ProviderError> {
    let provider: Box<dyn AIProvider> = match settings.kind {
        ProviderKind::Anthropic => Box::new(AnthropicProvider::new(settings)?),
        ProviderKind::OpenAi => Box::new(OpenAiProvider::new(settings)?),
        ProviderKind::Ollama => Box::new(OllamaProvider::new(settings)?),
    };
    Ok(provider)
}

/// Build the provider described by `config`.
///
/// Returns `None` when AI is disabled or the configuration is invalid. With
/// fallback providers listed, the result is a [`FallbackChainProvider`] with
/// the primary first; a fallback naming the primary's kind is skipped.
pub fn provider_from_config(config: &AiConfig) -> Option<Box<dyn AIProvider>> {
    if !config.enabled {
        debug!("AI disabled");
        return None;
    }
    if let Err(e) = config.validate() {
        warn!("Invalid AI configuration: {}", e);
        return None;
    }

    let mut kinds = vec![config.provider];
    for kind in &config.fallback_providers {
        if !kinds.contains(kind) {
            kinds.push(*kind);
        }
    }

    let mut providers: Vec<Box<dyn AIProvider>> = kinds
        .into_iter()
        .filter_map(|kind| {
            let settings = if kind == config.provider {
                config.primary_settings()
            } else {
                config.fallback_settings(kind)
            };
            match build_provider(settings) {
                Ok(provider) => Some(provider),
                Err(e) => {
                    warn!("Could not create {} provider: {}", kind, e);
                    None
                }
            }
        })
        .collect();

    match providers.len() {
        0 => None,
        1 => providers.pop(),
        _ => Some(Box::new(FallbackChainProvider::new(providers))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_yields_none() {
        assert!(provider_from_config(&AiConfig::default()).is_none());
    }

    #[test]
    fn test_invalid_config_yields_none() {
        let config = AiConfig::builder().enabled(true).timeout_secs(0).build();
        assert!(provider_from_config(&config).is_none());
    }

    #[test]
    fn test_single_provider() {
        let config = AiConfig::builder()
            .enabled(true)
            .provider(ProviderKind::OpenAi)
            .api_key("sk-test")
            .build();
        let provider = provider_from_config(&config).unwrap();
        assert_eq!(provider.name(), "openai");
        assert!(provider.is_available());
    }

    #[test]
    fn test_fallbacks_form_a_chain_without_duplicates() {
        let config = AiConfig::builder()
            .enabled(true)
            .provider(ProviderKind::Anthropic)
            .fallback(ProviderKind::Anthropic, "")
            .fallback(ProviderKind::Ollama, "")
            .build();
        let provider = provider_from_config(&config).unwrap();
        assert_eq!(provider.name(), "fallback_chain");
        // primary has no key, but the Ollama fallback needs none
        assert!(provider.is_available());
    }
}
