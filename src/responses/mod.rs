//! Responses Module
//!
//! Chat-assistant consumers of the cache: hashed keys for conversations and
//! questions, and thin caches for assistant replies and Q&A answers.

mod chat;
mod key;
mod qa;

pub use chat::{ChatMessage, ChatResponseCache};
pub use key::{normalize_question, KeyGenerator, ResponseKey};
pub use qa::QuestionAnswerCache;
