use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::Instant;

use super::{SharedStore, StoreError, WindowCount};

#[derive(Debug, Clone)]
struct Slot {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl Slot {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// In-process store with the same command contract as [`super::RedisStore`].
///
/// Each operation holds the DashMap shard lock for its key, which gives the
/// per-key serialisation the limiter relies on. Time comes from
/// `tokio::time`, so paused-clock tests can step over window boundaries.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, Slot>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates an outage: every call fails with [`StoreError::Unavailable`] while set.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.iter().filter(|slot| !slot.is_expired(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SharedStore for MemoryStore {
    async fn incr_with_expiry(&self, key: &str, window: Duration) -> Result<WindowCount, StoreError> {
        self.check_available()?;
        let now = Instant::now();
        let mut slot = self.entries.entry(key.to_owned()).or_insert_with(|| Slot {
            value: b"0".to_vec(),
            expires_at: None,
        });
        if slot.is_expired(now) {
            *slot = Slot {
                value: b"0".to_vec(),
                expires_at: None,
            };
        }

        let current: i64 = std::str::from_utf8(&slot.value)
            .ok()
            .and_then(|raw| raw.parse().ok())
            .ok_or_else(|| StoreError::NotACounter { key: key.to_owned() })?;
        let count = current + 1;
        slot.value = count.to_string().into_bytes();
        if count == 1 {
            slot.expires_at = Some(now + window);
        }

        Ok(WindowCount {
            count,
            ttl: slot.expires_at.map(|at| at.saturating_duration_since(now)),
        })
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.check_available()?;
        let now = Instant::now();
        let expired = match self.entries.get(key) {
            Some(slot) if !slot.is_expired(now) => return Ok(Some(slot.value.clone())),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove_if(key, |_, slot| slot.is_expired(now));
        }
        Ok(None)
    }

    async fn set_ex(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), StoreError> {
        self.check_available()?;
        self.entries.insert(
            key.to_owned(),
            Slot {
                value,
                expires_at: Some(Instant::now() + ttl),
            },
        );
        Ok(())
    }

    async fn delete_by_prefix(&self, prefix: &str) -> Result<u64, StoreError> {
        self.check_available()?;
        let keys: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| entry.key().starts_with(prefix))
            .map(|entry| entry.key().clone())
            .collect();

        let now = Instant::now();
        let mut removed = 0;
        for key in keys {
            if let Some((_, slot)) = self.entries.remove(&key) {
                if !slot.is_expired(now) {
                    removed += 1;
                }
            }
        }
        Ok(removed)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check_available()
    }
}
