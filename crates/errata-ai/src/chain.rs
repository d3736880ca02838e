//! Ordered provider fallback.

use async_trait::async_trait;
use errata_core::{Explanation, RuntimeContext};
use tracing::debug;

use crate::AIProvider;

/// Tries each member in order and returns the first non-empty answer.
///
/// Members that report themselves unavailable are skipped without being
/// called. The chain is itself an [`AIProvider`].
pub struct FallbackChainProvider {
    providers: Vec<Box<dyn AIProvider>>,
}

impl FallbackChainProvider {
    /// Primary first.
    pub fn new(providers: Vec<Box<dyn AIProvider>>) -> Self {
        Self { providers }
    }

    pub fn providers(&self) -> &[Box<dyn AIProvider>] {
        &self.providers
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[async_trait]
impl AIProvider for FallbackChainProvider {
    fn name(&self) -> &str {
        "fallback_chain"
    }

    fn is_available(&self) -> bool {
        self.providers.iter().any(|p| p.is_available())
    }

    async fn analyze(&self, context: &RuntimeContext) -> Explanation {
        for provider in &self.providers {
            if !provider.is_available() {
                debug!("Skipping unavailable provider {}", provider.name());
                continue;
            }
            let explanation = provider.analyze(context).await;
            if !explanation.is_empty() {
                return explanation;
            }
            debug!("Provider {} returned nothing, trying next", provider.name());
        }
        Explanation::empty()
    }
}
