//! Chat Response Cache
//!
//! Caches assistant replies keyed by model and the full conversation that
//! produced them.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::key::KeyGenerator;
use crate::cache::{Cache, CacheStats};
use crate::config::CacheConfig;

/// One turn of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new("assistant", content)
    }

    /// Lowercased role and trimmed content, used when hashing.
    pub(crate) fn normalized(&self) -> Self {
        Self {
            role: self.role.trim().to_lowercase(),
            content: self.content.trim().to_string(),
        }
    }
}

/// Cache of assistant replies.
#[derive(Debug, Clone)]
pub struct ChatResponseCache {
    cache: Cache<String>,
    keys: KeyGenerator,
}

impl ChatResponseCache {
    /// Creates a cache with its own background sweep.
    pub fn new(config: CacheConfig) -> Self {
        Self::from_cache(Cache::new(config))
    }

    /// Wraps an existing cache handle.
    pub fn from_cache(cache: Cache<String>) -> Self {
        Self {
            cache,
            keys: KeyGenerator::new("chat"),
        }
    }

    pub fn with_keys(mut self, keys: KeyGenerator) -> Self {
        self.keys = keys;
        self
    }

    /// Returns the cached reply for this conversation, if any.
    pub fn lookup(&self, model: &str, messages: &[ChatMessage]) -> Option<String> {
        let key = self.keys.for_messages(Some(model), messages);
        let reply = self.cache.get(key.as_str());
        debug!(model, hit = reply.is_some(), "chat response lookup");
        reply
    }

    /// Caches `reply`. Returns `false` if the reply was too large to keep.
    pub fn store(
        &self,
        model: &str,
        messages: &[ChatMessage],
        reply: impl Into<String>,
        ttl: Option<Duration>,
    ) -> bool {
        let key = self.keys.for_messages(Some(model), messages);
        self.cache.set(key.as_str(), reply.into(), ttl)
    }

    pub fn invalidate(&self, model: &str, messages: &[ChatMessage]) -> bool {
        let key = self.keys.for_messages(Some(model), messages);
        self.cache.delete(key.as_str())
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear(&self) {
        self.cache.clear();
    }

    /// The underlying cache handle.
    pub fn cache(&self) -> &Cache<String> {
        &self.cache
    }
}
