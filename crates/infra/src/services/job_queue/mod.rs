mod inmemory;
mod postgres;

pub use inmemory::InMemoryJobQueue;
pub use postgres::PostgresJobQueue;
use thiserror::Error;
use ward_calendar_domain::DeliveryJob;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitResult {
    /// A new job was created for the idempotency key
    Accepted,
    /// A job with the same idempotency key already exists, nothing was added
    Deduplicated,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("Job queue is unavailable: {0}")]
    Unavailable(String),
    #[error("Job queue did not answer in time")]
    Timeout,
}

/// Durable queue executing `DeliveryJob`s. Submitting the same
/// idempotency key twice never creates a second job.
#[async_trait::async_trait]
pub trait IJobQueue: Send + Sync {
    async fn submit(&self, job: &DeliveryJob) -> Result<SubmitResult, QueueError>;
}
