//! Question/answer cache keyed by normalized question text.

use std::time::Duration;

use super::key::KeyGenerator;
use crate::cache::{Cache, CacheStats};
use crate::config::CacheConfig;

/// Caches answers so that questions differing only in case or spacing hit
/// the same entry.
#[derive(Debug, Clone)]
pub struct QuestionAnswerCache {
    cache: Cache<String>,
    keys: KeyGenerator,
}

impl QuestionAnswerCache {
    pub fn new(config: CacheConfig) -> Self {
        Self::from_cache(Cache::new(config))
    }

    pub fn from_cache(cache: Cache<String>) -> Self {
        Self {
            cache,
            keys: KeyGenerator::new("qa"),
        }
    }

    pub fn with_keys(mut self, keys: KeyGenerator) -> Self {
        self.keys = keys;
        self
    }

    pub fn answer(&self, question: &str) -> Option<String> {
        self.cache.get(self.keys.for_question(None, question).as_str())
    }

    pub fn remember(
        &self,
        question: &str,
        answer: impl Into<String>,
        ttl: Option<Duration>,
    ) -> bool {
        let key = self.keys.for_question(None, question);
        self.cache.set(key.as_str(), answer.into(), ttl)
    }

    pub fn forget(&self, question: &str) -> bool {
        self.cache.delete(self.keys.for_question(None, question).as_str())
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn cache(&self) -> &Cache<String> {
        &self.cache
    }
}
