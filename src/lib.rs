//! Chat Cache - in-memory cache engine for chat assistant responses
//!
//! Bounded key-value caching with TTL expiration, pluggable eviction
//! strategies, size accounting, statistics, and a small diagnostics API.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod responses;
pub mod tasks;

pub use api::{create_router, AppState};
pub use cache::{
    Cache, CacheBuilder, CacheStats, Clock, DetailedInfo, EntryInfo, EvictionStrategy,
    FnEstimator, JsonSizeEstimator, MockClock, SizeEstimator, SystemClock,
};
pub use config::{CacheConfig, Config, ResolvedConfig};
pub use responses::{
    ChatMessage, ChatResponseCache, KeyGenerator, QuestionAnswerCache, ResponseKey,
};
pub use tasks::{spawn_cleanup_task, CleanupHandle};
