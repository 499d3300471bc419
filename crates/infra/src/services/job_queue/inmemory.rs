use super::{IJobQueue, QueueError, SubmitResult};
use crate::shared::lock;
use std::{collections::HashSet, sync::Mutex, time::Duration};
use ward_calendar_domain::DeliveryJob;

#[derive(Default)]
struct QueueState {
    jobs: Vec<DeliveryJob>,
    keys: HashSet<String>,
    submissions: usize,
    failures_left: usize,
    submit_delay: Option<Duration>,
}

/// Process local job queue that can be told to misbehave
pub struct InMemoryJobQueue {
    state: Mutex<QueueState>,
}

impl InMemoryJobQueue {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState::default()),
        }
    }

    /// The next `count` submissions fail with `QueueError::Unavailable`
    pub fn fail_next_submissions(&self, count: usize) {
        lock(&self.state).failures_left = count;
    }

    /// Every submission waits this long before it is answered
    pub fn set_submit_delay(&self, delay: Option<Duration>) {
        lock(&self.state).submit_delay = delay;
    }

    /// Accepted jobs in the order they were accepted
    pub fn jobs(&self) -> Vec<DeliveryJob> {
        lock(&self.state).jobs.clone()
    }

    /// Every call to `submit`, including failed and deduplicated ones
    pub fn submissions(&self) -> usize {
        lock(&self.state).submissions
    }
}

impl Default for InMemoryJobQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IJobQueue for InMemoryJobQueue {
    async fn submit(&self, job: &DeliveryJob) -> Result<SubmitResult, QueueError> {
        let delay = lock(&self.state).submit_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = lock(&self.state);
        state.submissions += 1;
        if state.failures_left > 0 {
            state.failures_left -= 1;
            return Err(QueueError::Unavailable("injected failure".into()));
        }

        if !state.keys.insert(job.idempotency_key.clone()) {
            return Ok(SubmitResult::Deduplicated);
        }
        state.jobs.push(job.clone());
        Ok(SubmitResult::Accepted)
    }
}
