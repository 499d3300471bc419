mod postgres;

pub use postgres::PostgresOutboxRepo;
use ward_calendar_domain::{OutboxRecord, ID};

/// Read side of the outbox. Records are appended by `IEventRepo::apply_diff`
/// in the same transaction as the event changes they describe.
#[async_trait::async_trait]
pub trait IOutboxRepo: Send + Sync {
    /// Records of the unit with an id greater than `after`, oldest first
    async fn find_after(
        &self,
        unit_id: &ID,
        after: i64,
        limit: usize,
    ) -> anyhow::Result<Vec<OutboxRecord>>;
}
