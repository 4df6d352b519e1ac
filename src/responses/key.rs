//! Response Key Generation
//!
//! Deterministic cache keys for LLM responses. Inputs are collected into a
//! sorted map, encoded as JSON, and hashed with SHA-256 so that equal
//! requests always land on the same key regardless of field order.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::ChatMessage;

/// A hashed cache key, prefixed with the namespace it was generated in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResponseKey {
    key: String,
    /// Model the key was generated for, if any
    pub model: Option<String>,
}

impl ResponseKey {
    pub fn as_str(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for ResponseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

// == Key Generator ==
/// Builds `ResponseKey`s within a namespace.
///
/// A salt, when set, is mixed into every hash so separate deployments
/// sharing a cache cannot read each other's entries.
#[derive(Debug, Clone)]
pub struct KeyGenerator {
    namespace: String,
    salt: Option<String>,
}

impl KeyGenerator {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            salt: None,
        }
    }

    pub fn with_salt(mut self, salt: impl Into<String>) -> Self {
        self.salt = Some(salt.into());
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Key for a conversation sent to `model`.
    pub fn for_messages(&self, model: Option<&str>, messages: &[ChatMessage]) -> ResponseKey {
        let normalized: Vec<ChatMessage> = messages.iter().map(ChatMessage::normalized).collect();
        let encoded = serde_json::to_string(&normalized).unwrap_or_default();
        self.generate(model, "messages", encoded)
    }

    /// Key for a single free-text question, after `normalize_question`.
    pub fn for_question(&self, model: Option<&str>, question: &str) -> ResponseKey {
        self.generate(model, "question", normalize_question(question))
    }

    fn generate(&self, model: Option<&str>, field: &str, payload: String) -> ResponseKey {
        let mut parts: BTreeMap<&str, &str> = BTreeMap::new();
        parts.insert("namespace", &self.namespace);
        parts.insert(field, &payload);
        if let Some(m) = model {
            parts.insert("model", m);
        }
        if let Some(ref s) = self.salt {
            parts.insert("salt", s);
        }

        let canonical = serde_json::to_string(&parts).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        let hash: String = hasher
            .finalize()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect();

        ResponseKey {
            key: format!("{}:{}", self.namespace, hash),
            model: model.map(str::to_string),
        }
    }
}

/// Trims, lowercases, and collapses runs of whitespace to a single space.
pub fn normalize_question(question: &str) -> String {
    question
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}
