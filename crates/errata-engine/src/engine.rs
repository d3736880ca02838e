//! Explanation Engine - the main entry point for classifying failures.

use async_trait::async_trait;
use errata_ai::{provider_from_config, AIProvider};
use errata_core::{Explanation, RuntimeContext};
use errata_strategies::{default_strategies, ExplanationStrategy};
use tracing::{debug, info};

use crate::enrich::enrich;
use crate::fallback::descriptive_fallback;
use crate::EngineConfig;

/// Anything that turns a runtime context into an explanation.
///
/// Implementations never fail; the worst case is a low-confidence answer.
#[async_trait]
pub trait Explainer: Send + Sync {
    async fn explain(&self, context: &RuntimeContext) -> Explanation;
}

/// Orchestrates strategies, the optional AI provider and the descriptive
/// fallback, then enriches the result with code context.
pub struct ExplanationEngine {
    /// Sorted by priority, highest first; fixed after construction
    strategies: Vec<Box<dyn ExplanationStrategy>>,
    provider: Option<Box<dyn AIProvider>>,
}

impl ExplanationEngine {
    /// Create a new engine.
    ///
    /// Strategies are ordered by descending priority; equal priorities keep
    /// the order given here.
    pub fn new(
        mut strategies: Vec<Box<dyn ExplanationStrategy>>,
        provider: Option<Box<dyn AIProvider>>,
    ) -> Self {
        strategies.sort_by_key(|s| std::cmp::Reverse(s.priority()));
        Self {
            strategies,
            provider,
        }
    }

    /// Built-in strategies, optionally backed by `provider`.
    pub fn with_default_strategies(provider: Option<Box<dyn AIProvider>>) -> Self {
        Self::new(default_strategies(), provider)
    }

    /// Built-in strategies plus whatever provider `config.ai` describes.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::with_default_strategies(provider_from_config(&config.ai))
    }

    /// Strategy names in evaluation order.
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn provider(&self) -> Option<&dyn AIProvider> {
        self.provider.as_deref()
    }

    /// Classify without enrichment.
    async fn classify(&self, context: &RuntimeContext) -> Explanation {
        // 1. First supporting strategy, and only that one
        if let Some(strategy) = self.strategies.iter().find(|s| s.supports(context)) {
            debug!("Matched strategy: {}", strategy.name());
            let explanation = strategy.explain(context);
            if !explanation.is_empty() {
                return explanation;
            }
            debug!("Strategy {} returned nothing", strategy.name());
        }

        // 2. AI provider (or chain)
        if let Some(provider) = self.provider.as_deref().filter(|p| p.is_available()) {
            let explanation = provider.analyze(context).await;
            if !explanation.is_empty() {
                info!("Explained by AI provider {}", provider.name());
                return explanation;
            }
            debug!("AI provider {} returned nothing", provider.name());
        }

        // 3. Taxonomy by exception class
        debug!("Using descriptive fallback for {}", context.exception.class);
        descriptive_fallback(context)
    }
}

#[async_trait]
impl Explainer for ExplanationEngine {
    async fn explain(&self, context: &RuntimeContext) -> Explanation {
        let explanation = self.classify(context).await;
        enrich(explanation, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use errata_core::{ExceptionInfo, SourceContext};

    fn ctx(class: &str, message: &str) -> RuntimeContext {
        RuntimeContext::new(
            ExceptionInfo::new(class, message).at("src/Service.php", 21),
            SourceContext::empty(),
        )
    }

    #[test]
    fn test_default_order_is_by_priority() {
        let engine = ExplanationEngine::with_default_strategies(None);
        assert_eq!(
            engine.strategy_names(),
            vec![
                "SyntaxError",
                "DivisionByZero",
                "ArgumentCount",
                "NullReference",
                "TypeMismatch",
                "SymbolNotFound",
                "UndefinedKey",
                "InvalidValue",
            ]
        );
    }

    #[tokio::test]
    async fn test_strategy_result_is_used() {
        let engine = ExplanationEngine::with_default_strategies(None);
        let e = engine
            .explain(&ctx("TypeError", "Call to a member function getId() on null"))
            .await;
        assert_eq!(e.confidence, 0.85);
        assert_eq!(e.error_type, "NullReferenceError");
    }

    #[tokio::test]
    async fn test_no_strategies_no_provider_falls_back() {
        let engine = ExplanationEngine::new(vec![], None);
        let e = engine
            .explain(&ctx("TypeError", "Call to a member function getId() on null"))
            .await;
        assert_eq!(e.confidence, 0.5);
        assert_eq!(e.metadata["strategy"], "DescriptiveFallback");
    }

    #[tokio::test]
    async fn test_disabled_config_has_no_provider() {
        let engine = ExplanationEngine::from_config(&EngineConfig::default());
        assert!(engine.provider().is_none());
        let e = engine.explain(&ctx("LogicException", "Unreachable state")).await;
        assert_eq!(e.confidence, 0.5);
        assert!(!e.is_empty());
    }
}
