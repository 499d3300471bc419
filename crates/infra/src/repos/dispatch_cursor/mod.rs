mod inmemory;
mod postgres;

pub use inmemory::InMemoryDispatchCursorRepo;
pub use postgres::PostgresDispatchCursorRepo;
use ward_calendar_domain::ID;

/// Remembers the id of the last `OutboxRecord` of a unit that was
/// accepted by the job queue
#[async_trait::async_trait]
pub trait IDispatchCursorRepo: Send + Sync {
    async fn find(&self, unit_id: &ID) -> anyhow::Result<Option<i64>>;
    /// Never moves a cursor backwards
    async fn save(&self, unit_id: &ID, last_outbox_id: i64) -> anyhow::Result<()>;
}
