use std::{fmt::Display, str::FromStr, time::Duration};
use tracing::{info, warn};
use ward_calendar_domain::RetryPolicy;

#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the application to run on
    pub port: usize,
    /// Maximum time a single feed download may take before it is
    /// treated as a failed fetch
    pub feed_fetch_timeout_millis: u64,
    /// Length of the fixed window used to throttle manual refreshes
    pub manual_refresh_window_millis: i64,
    /// Manual refreshes an actor may trigger for one unit per window
    pub manual_refresh_max_attempts: u32,
    /// Backoff used by the dispatcher when the queue rejects a submission
    pub dispatch_retry: RetryPolicy,
    /// Retry policy handed over to the queue for executing delivery jobs
    pub delivery_retry: RetryPolicy,
    pub queue_submit_timeout_millis: u64,
    /// Maximum outbox records read per dispatch pass
    pub dispatch_batch_size: usize,
    pub scheduled_refresh_interval_millis: u64,
    pub dispatch_interval_millis: u64,
}

fn env_or<T>(name: &str, default: T) -> T
where
    T: FromStr + Display,
{
    match std::env::var(name) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!(
                    "The given {}: {} is not valid, falling back to the default: {}.",
                    name, raw, default
                );
                default
            }
        },
        Err(_) => default,
    }
}

impl Config {
    pub fn new() -> Self {
        let port = env_or("PORT", 5000);
        info!("Using port: {}", port);

        let dispatch_retry = RetryPolicy::new(
            env_or("DISPATCH_MAX_ATTEMPTS", 5),
            env_or("DISPATCH_BASE_DELAY_MS", 200),
            env_or("DISPATCH_MAX_DELAY_MS", 5_000),
        );

        Self {
            port,
            feed_fetch_timeout_millis: env_or("FEED_FETCH_TIMEOUT_MS", 10_000),
            manual_refresh_window_millis: env_or::<i64>("MANUAL_REFRESH_WINDOW_SECS", 10 * 60)
                * 1000,
            manual_refresh_max_attempts: env_or("MANUAL_REFRESH_MAX_ATTEMPTS", 3),
            dispatch_retry,
            delivery_retry: RetryPolicy::new(8, 30 * 1000, 60 * 60 * 1000), // 30 secs up to 1 hour
            queue_submit_timeout_millis: env_or("QUEUE_SUBMIT_TIMEOUT_MS", 5_000),
            dispatch_batch_size: env_or("DISPATCH_BATCH_SIZE", 100),
            scheduled_refresh_interval_millis: env_or::<u64>(
                "SCHEDULED_REFRESH_INTERVAL_SECS",
                15 * 60,
            ) * 1000,
            dispatch_interval_millis: env_or::<u64>("DISPATCH_INTERVAL_SECS", 60) * 1000,
        }
    }

    pub fn feed_fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.feed_fetch_timeout_millis)
    }

    pub fn queue_submit_timeout(&self) -> Duration {
        Duration::from_millis(self.queue_submit_timeout_millis)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
