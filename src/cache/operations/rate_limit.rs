use std::sync::Arc;
use std::time::Duration;

use crate::cache::keys::rate_limit_key;
use crate::cache::models::RateLimitDecision;
use crate::cache::store::SharedStore;
use crate::config::{Config, FailMode};

/// The window is anchored at the first request of a client: the counter's
/// expiry is armed only by the increment that creates it. The request that
/// pushes the count past the limit is rejected but stays counted.
#[derive(Clone)]
pub struct FixedWindowLimiter {
    store: Arc<dyn SharedStore>,
    max_requests: u64,
    window: Duration,
    fail_mode: FailMode,
}

impl FixedWindowLimiter {
    pub fn new(
        store: Arc<dyn SharedStore>,
        max_requests: u64,
        window: Duration,
        fail_mode: FailMode,
    ) -> Self {
        Self {
            store,
            max_requests,
            window,
            fail_mode,
        }
    }

    pub fn from_config(store: Arc<dyn SharedStore>, config: &Config) -> Self {
        Self::new(
            store,
            config.rate_limit_requests,
            config.rate_limit_window(),
            config.rate_limit_fail_mode,
        )
    }

    pub fn max_requests(&self) -> u64 {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// 计数并判定是否放行
    pub async fn admit(&self, client_key: &str) -> RateLimitDecision {
        let key = rate_limit_key(client_key);
        match self.store.incr_with_expiry(&key, self.window).await {
            Ok(counted) => {
                let allowed = u64::try_from(counted.count).map_or(true, |c| c <= self.max_requests);
                RateLimitDecision {
                    allowed,
                    current_count: counted.count,
                    retry_after: counted.ttl,
                    degraded: false,
                }
            }
            Err(e) => {
                let allowed = self.fail_mode == FailMode::Open;
                tracing::warn!(
                    "Rate limit store unavailable for {}, failing {}: {}",
                    key,
                    if allowed { "open" } else { "closed" },
                    e
                );
                RateLimitDecision {
                    allowed,
                    current_count: 0,
                    retry_after: None,
                    degraded: true,
                }
            }
        }
    }
}
