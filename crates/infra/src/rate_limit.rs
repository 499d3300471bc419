use crate::{shared::lock, system::ISys};
use std::{collections::HashMap, sync::Arc, sync::Mutex};

/// Buckets are only swept once there are this many of them
const PRUNE_THRESHOLD: usize = 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct RateLimitBucket {
    pub key: String,
    pub count: u32,
    pub window_reset_at: i64,
}

/// Fixed window admission throttle kept in process memory.
///
/// The window of a key opens on its first attempt and every attempt
/// until `window_reset_at` counts toward the same bucket. Nothing is
/// persisted, a restart forgets every bucket.
pub struct RateLimiter {
    window_millis: i64,
    sys: Arc<dyn ISys>,
    buckets: Mutex<HashMap<String, RateLimitBucket>>,
}

impl RateLimiter {
    pub fn new(window_millis: i64, sys: Arc<dyn ISys>) -> Self {
        Self {
            window_millis,
            sys,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Records an attempt for `key`. Returns false, without counting the
    /// attempt, when the current window already has `max_attempts`.
    pub fn allow(&self, key: &str, max_attempts: u32) -> bool {
        let now = self.sys.get_timestamp_millis();
        let mut buckets = lock(&self.buckets);

        if buckets.len() >= PRUNE_THRESHOLD {
            buckets.retain(|_, bucket| bucket.window_reset_at > now);
        }

        let window_millis = self.window_millis;
        let bucket = buckets
            .entry(key.to_string())
            .or_insert_with(|| RateLimitBucket {
                key: key.to_string(),
                count: 0,
                window_reset_at: now + window_millis,
            });

        if now >= bucket.window_reset_at {
            bucket.count = 0;
            bucket.window_reset_at = now + window_millis;
        }

        if bucket.count >= max_attempts {
            return false;
        }
        bucket.count += 1;
        true
    }

    pub fn bucket(&self, key: &str) -> Option<RateLimitBucket> {
        lock(&self.buckets).get(key).cloned()
    }

    /// Forgets every bucket
    pub fn reset(&self) {
        lock(&self.buckets).clear();
    }
}
