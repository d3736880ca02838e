//! Explanation caching keyed by error signature.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use errata_core::{Explanation, RuntimeContext};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::{CacheConfig, EngineConfig, ExplanationEngine, Explainer};

/// Storage for cached explanations.
pub trait CacheStore: Send + Sync {
    /// Get a live entry. Expired entries are misses.
    fn get(&self, key: &str) -> Option<Explanation>;

    /// Store an entry; `ttl_secs == 0` never expires.
    fn set(&self, key: &str, explanation: Explanation, ttl_secs: u64);
}

struct Entry {
    explanation: Explanation,
    expires_at: Option<Instant>,
}

/// In-process store scoped to its owner's lifetime.
///
/// Expired entries are removed by the read that finds them; there is no
/// background sweep.
#[derive(Default)]
pub struct InMemoryCacheStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    fn get_at(&self, key: &str, now: Instant) -> Option<Explanation> {
        let mut entries = match self.entries.lock() {
            Ok(entries) => entries,
            Err(_) => {
                warn!("Explanation cache lock poisoned, treating as miss");
                return None;
            }
        };

        let expired = entries
            .get(key)?
            .expires_at
            .is_some_and(|expires_at| now >= expires_at);
        if expired {
            entries.remove(key);
            return None;
        }
        entries.get(key).map(|entry| entry.explanation.clone())
    }
}

impl CacheStore for InMemoryCacheStore {
    fn get(&self, key: &str) -> Option<Explanation> {
        self.get_at(key, Instant::now())
    }

    fn set(&self, key: &str, explanation: Explanation, ttl_secs: u64) {
        let expires_at = (ttl_secs > 0).then(|| Instant::now() + Duration::from_secs(ttl_secs));
        match self.entries.lock() {
            Ok(mut entries) => {
                entries.insert(
                    key.to_string(),
                    Entry {
                        explanation,
                        expires_at,
                    },
                );
            }
            Err(_) => warn!("Explanation cache lock poisoned, skipping write"),
        }
    }
}

/// Memoizes any [`Explainer`] by `(class, message, file, line)`.
pub struct CachingExplanationEngine<E, S = InMemoryCacheStore> {
    inner: E,
    store: S,
    config: CacheConfig,
}

impl<E: Explainer, S: CacheStore> CachingExplanationEngine<E, S> {
    pub fn new(inner: E, store: S, config: CacheConfig) -> Self {
        Self {
            inner,
            store,
            config,
        }
    }

    /// Generate a cache key from the error signature.
    pub fn cache_key(context: &RuntimeContext) -> String {
        let exception = &context.exception;
        let mut hasher = Sha256::new();
        // Length-prefixed so no field can bleed into its neighbour
        for field in [&exception.class, &exception.message, &exception.file] {
            hasher.update((field.len() as u64).to_le_bytes());
            hasher.update(field.as_bytes());
        }
        hasher.update(exception.line.to_le_bytes());
        let result = hasher.finalize();
        base64::Engine::encode(&base64::engine::general_purpose::URL_SAFE_NO_PAD, result)
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> CacheConfig {
        self.config
    }
}

impl<E: Explainer> CachingExplanationEngine<E, InMemoryCacheStore> {
    /// Wrap `inner` with a fresh in-memory store.
    pub fn in_memory(inner: E, config: CacheConfig) -> Self {
        Self::new(inner, InMemoryCacheStore::new(), config)
    }
}

impl CachingExplanationEngine<ExplanationEngine, InMemoryCacheStore> {
    /// The full stack: default strategies, configured AI, in-memory cache.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::in_memory(ExplanationEngine::from_config(config), config.cache)
    }
}

#[async_trait]
impl<E: Explainer, S: CacheStore> Explainer for CachingExplanationEngine<E, S> {
    async fn explain(&self, context: &RuntimeContext) -> Explanation {
        if !self.config.enabled {
            return self.inner.explain(context).await;
        }

        let key = Self::cache_key(context);
        if let Some(cached) = self.store.get(&key) {
            debug!("Explanation cache hit: {}", key);
            return cached;
        }

        debug!("Explanation cache miss: {}", key);
        let explanation = self.inner.explain(context).await;
        self.store
            .set(&key, explanation.clone(), self.config.ttl_secs);
        explanation
    }
}
