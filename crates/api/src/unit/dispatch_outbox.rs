use crate::{
    error::WardError,
    shared::usecase::{execute, UseCase},
};
use actix_web::{web, HttpResponse};
use tokio::time::{sleep, timeout};
use tracing::{error, info, warn};
use ward_calendar_api_structs::dispatch_outbox::{APIResponse, PathParams};
use ward_calendar_domain::{DeliveryJob, ID};
use ward_calendar_infra::{QueueError, SubmitResult, WardContext};

fn error_handler(e: UseCaseError) -> WardError {
    match e {
        UseCaseError::InProgress => WardError::Conflict(
            "The outbox of this unit is already being dispatched.".into(),
        ),
        UseCaseError::StorageError => WardError::InternalError,
    }
}

pub async fn dispatch_outbox_controller(
    path_params: web::Path<PathParams>,
    ctx: web::Data<WardContext>,
) -> Result<HttpResponse, WardError> {
    let usecase = DispatchOutboxUseCase {
        unit_id: path_params.unit_id,
    };

    execute(usecase, &ctx)
        .await
        .map(|outcome| {
            HttpResponse::Ok().json(APIResponse {
                submitted: outcome.submitted,
                deduplicated: outcome.deduplicated,
                stalled_at: outcome.stalled_at,
            })
        })
        .map_err(error_handler)
}

/// Drains the outbox of a unit into the job queue, starting after the
/// dispatch cursor of the unit.
#[derive(Debug)]
pub struct DispatchOutboxUseCase {
    pub unit_id: ID,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Records the queue accepted or already knew about
    pub submitted: usize,
    pub deduplicated: usize,
    /// The record that exhausted its submission attempts. It and every
    /// later record are left for the next pass.
    pub stalled_at: Option<i64>,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    InProgress,
    StorageError,
}

#[async_trait::async_trait(?Send)]
impl UseCase for DispatchOutboxUseCase {
    type Response = DispatchOutcome;

    type Errors = UseCaseError;

    const NAME: &'static str = "DispatchOutbox";

    async fn execute(&mut self, ctx: &WardContext) -> Result<Self::Response, Self::Errors> {
        let _guard = ctx
            .dispatch_locks
            .try_acquire(&self.unit_id)
            .ok_or(UseCaseError::InProgress)?;

        let mut cursor = ctx
            .repos
            .dispatch_cursors
            .find(&self.unit_id)
            .await
            .map_err(|e| {
                error!("Unable to read dispatch cursor of unit {}: {:?}", self.unit_id, e);
                UseCaseError::StorageError
            })?
            .unwrap_or(0);

        let batch_size = ctx.config.dispatch_batch_size.max(1);
        let mut outcome = DispatchOutcome::default();

        loop {
            let records = ctx
                .repos
                .outbox
                .find_after(&self.unit_id, cursor, batch_size)
                .await
                .map_err(|e| {
                    error!("Unable to read outbox of unit {}: {:?}", self.unit_id, e);
                    UseCaseError::StorageError
                })?;
            let fetched = records.len();

            for record in records {
                let job = DeliveryJob::for_record(&record, ctx.config.delivery_retry);
                match submit_with_retry(&job, ctx).await {
                    Ok(res) => {
                        outcome.submitted += 1;
                        if res == SubmitResult::Deduplicated {
                            outcome.deduplicated += 1;
                        }
                    }
                    Err(e) => {
                        error!(
                            unit_id = %self.unit_id,
                            outbox_id = record.id,
                            backoff_millis =
                                ctx.config.dispatch_retry.max_total_delay().as_millis() as u64,
                            "Giving up on submitting delivery job for now: {}",
                            e
                        );
                        outcome.stalled_at = Some(record.id);
                        return Ok(outcome);
                    }
                }

                cursor = record.id;
                ctx.repos
                    .dispatch_cursors
                    .save(&self.unit_id, cursor)
                    .await
                    .map_err(|e| {
                        error!(
                            "Unable to advance dispatch cursor of unit {} to {}: {:?}",
                            self.unit_id, cursor, e
                        );
                        UseCaseError::StorageError
                    })?;
            }

            if fetched < batch_size {
                break;
            }
        }

        if outcome.submitted > 0 {
            info!(
                unit_id = %self.unit_id,
                submitted = outcome.submitted,
                deduplicated = outcome.deduplicated,
                "Outbox dispatched"
            );
        }

        Ok(outcome)
    }
}

/// Submits the job, retrying failed and timed out submissions with the
/// dispatch backoff until the attempts run out
async fn submit_with_retry(
    job: &DeliveryJob,
    ctx: &WardContext,
) -> Result<SubmitResult, QueueError> {
    let policy = ctx.config.dispatch_retry;
    let mut attempt = 0;
    loop {
        let res = match timeout(ctx.config.queue_submit_timeout(), ctx.job_queue.submit(job)).await
        {
            Ok(res) => res,
            Err(_) => Err(QueueError::Timeout),
        };

        match res {
            Ok(res) => return Ok(res),
            Err(e) if attempt + 1 >= policy.max_attempts => return Err(e),
            Err(e) => {
                let delay = policy.delay_for_attempt(attempt);
                warn!(
                    idempotency_key = %job.idempotency_key,
                    attempt = attempt + 1,
                    delay_millis = delay.as_millis() as u64,
                    "Delivery job submission failed, retrying: {}",
                    e
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
