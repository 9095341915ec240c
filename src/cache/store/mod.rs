//! Narrow command contract over the shared counting/caching store.
//!
//! Every request handler talks to the store concurrently; the store is the
//! only synchronisation point, so each operation here must be a single
//! indivisible command (or server-side script) on the store side.

mod memory;
mod redis_backend;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use self::memory::MemoryStore;
pub use self::redis_backend::RedisStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("store call timed out after {0:?}")]
    Timeout(Duration),
    #[error("store unavailable")]
    Unavailable,
    #[error("value at {key} is not a counter")]
    NotACounter { key: String },
    #[error("cache codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Result of an atomic increment inside a fixed window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowCount {
    pub count: i64,
    /// Remaining lifetime of the counter, `None` when the store has no expiry on it.
    pub ttl: Option<Duration>,
}

#[async_trait]
pub trait SharedStore: Send + Sync {
    /// INCR the key and, only when that created it (count == 1), EXPIRE it.
    /// Both happen as one atomic unit on the store.
    async fn incr_with_expiry(&self, key: &str, window: Duration) -> Result<WindowCount, StoreError>;

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    async fn set_ex(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), StoreError>;

    /// Enumerate every key starting with `prefix` and delete them in one batch.
    /// Not atomic with concurrent writers.
    async fn delete_by_prefix(&self, prefix: &str) -> Result<u64, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
