//! Provider abstraction.

use std::collections::BTreeMap;

use async_trait::async_trait;
use errata_core::{Explanation, RuntimeContext};
use tracing::{debug, info, warn};

use crate::prompt::{build_user_prompt, SYSTEM_PROMPT};
use crate::response::parse_response;
use crate::{ProviderError, RetryPolicy};

/// An adapter to an external inference service.
///
/// `analyze` never fails: any problem yields [`Explanation::empty`].
#[async_trait]
pub trait AIProvider: Send + Sync {
    /// Provider name recorded in explanation metadata.
    fn name(&self) -> &str;

    /// Pure configuration check; must not perform network I/O.
    fn is_available(&self) -> bool;

    async fn analyze(&self, context: &RuntimeContext) -> Explanation;
}

/// Raw text returned by a backend plus its usage counters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    pub text: String,
    /// Token or evaluation counts, keyed by the backend's own names
    pub usage: BTreeMap<&'static str, u64>,
}

/// A provider that answers one system + user message exchange.
#[async_trait]
pub trait ChatBackend: AIProvider {
    fn model(&self) -> &str;

    fn retry_policy(&self) -> RetryPolicy;

    async fn complete(&self, system: &str, user: &str) -> Result<Completion, ProviderError>;
}

/// Shared `analyze` implementation for chat backends: prompt, call with
/// retry, parse, record metadata.
pub async fn analyze_with<B>(backend: &B, context: &RuntimeContext) -> Explanation
where
    B: ChatBackend + ?Sized,
{
    if !backend.is_available() {
        debug!("Provider {} unavailable, skipping", backend.name());
        return Explanation::empty();
    }

    let user_prompt = build_user_prompt(context);
    debug!("Calling {} ({})...", backend.name(), backend.model());

    let completion = match backend
        .retry_policy()
        .run(|| backend.complete(SYSTEM_PROMPT, &user_prompt))
        .await
    {
        Ok(completion) => completion,
        Err(e) => {
            warn!("Provider {} failed: {}", backend.name(), e);
            return Explanation::empty();
        }
    };

    let explanation = parse_response(&completion.text, context);
    if explanation.is_empty() {
        warn!("Provider {} returned no usable text", backend.name());
        return explanation;
    }

    info!(
        "Provider {} explained {} with confidence {}",
        backend.name(),
        context.exception.short_class(),
        explanation.confidence
    );

    completion.usage.into_iter().fold(
        explanation
            .with_metadata("provider", backend.name())
            .with_metadata("model", backend.model()),
        |e, (key, count)| e.with_metadata(key, count),
    )
}
