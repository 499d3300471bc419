use crate::{outbox::OutboxRecord, shared::entity::ID};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Bounded exponential backoff: attempt `n` (0 based) waits
/// `base_delay * 2^n`, capped at `max_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay_millis: u64,
    pub max_delay_millis: u64,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay_millis: u64, max_delay_millis: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay_millis,
            max_delay_millis: max_delay_millis.max(base_delay_millis),
        }
    }

    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u64.checked_pow(attempt).unwrap_or(u64::MAX);
        let delay = self
            .base_delay_millis
            .saturating_mul(factor)
            .min(self.max_delay_millis);
        Duration::from_millis(delay)
    }

    /// Upper bound of the time spent waiting between all attempts
    pub fn max_total_delay(&self) -> Duration {
        (0..self.max_attempts.saturating_sub(1))
            .map(|attempt| self.delay_for_attempt(attempt))
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryPayload {
    pub unit_id: ID,
    pub event_outbox_id: i64,
}

/// One submission to the durable job queue for an `OutboxRecord`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryJob {
    /// Deterministic so that resubmitting the same record collapses
    /// into the same logical job in the queue
    pub idempotency_key: String,
    pub payload: DeliveryPayload,
    /// Retry policy the queue applies when executing the job
    pub retry_policy: RetryPolicy,
}

impl DeliveryJob {
    pub fn idempotency_key(unit_id: &ID, outbox_id: i64) -> String {
        format!("{}:{}", unit_id, outbox_id)
    }

    pub fn for_record(record: &OutboxRecord, retry_policy: RetryPolicy) -> Self {
        Self {
            idempotency_key: Self::idempotency_key(&record.unit_id, record.id),
            payload: DeliveryPayload {
                unit_id: record.unit_id,
                event_outbox_id: record.id,
            },
            retry_policy,
        }
    }
}
