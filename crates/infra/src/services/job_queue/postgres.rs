use super::{IJobQueue, QueueError, SubmitResult};
use sqlx::{types::Json, PgPool};
use tracing::error;
use ward_calendar_domain::DeliveryJob;

/// Job queue backed by the `delivery_jobs` table. Workers executing
/// the jobs are not part of this service.
pub struct PostgresJobQueue {
    pool: PgPool,
}

impl PostgresJobQueue {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl IJobQueue for PostgresJobQueue {
    async fn submit(&self, job: &DeliveryJob) -> Result<SubmitResult, QueueError> {
        let res = sqlx::query(
            r#"
            INSERT INTO delivery_jobs(idempotency_key, unit_uid, event_outbox_id, retry_policy)
            VALUES($1, $2, $3, $4)
            ON CONFLICT (idempotency_key) DO NOTHING
            "#,
        )
        .bind(&job.idempotency_key)
        .bind(job.payload.unit_id.inner_ref())
        .bind(job.payload.event_outbox_id)
        .bind(Json(&job.retry_policy))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Unable to submit delivery job {}: {:?}", job.idempotency_key, e);
            QueueError::Unavailable(e.to_string())
        })?;

        if res.rows_affected() == 0 {
            Ok(SubmitResult::Deduplicated)
        } else {
            Ok(SubmitResult::Accepted)
        }
    }
}
