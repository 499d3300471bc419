mod inmemory;
mod postgres;

pub use inmemory::InMemoryEventStore;
pub use postgres::PostgresEventRepo;
use ward_calendar_domain::{NewOutboxRecord, OutboxRecord, UnitEvent, ID};

/// Everything a reconciliation pass of one feed source writes. It is
/// committed as a single unit: either all of it or none of it.
#[derive(Debug, Clone, Default)]
pub struct FeedChangeSet {
    /// Created and updated events, matched on `id`
    pub upserts: Vec<UnitEvent>,
    /// Ids of stored events that are no longer published
    pub cancellations: Vec<ID>,
    pub outbox: Vec<NewOutboxRecord>,
}

impl FeedChangeSet {
    pub fn is_empty(&self) -> bool {
        self.upserts.is_empty() && self.cancellations.is_empty() && self.outbox.is_empty()
    }
}

#[async_trait::async_trait]
pub trait IEventRepo: Send + Sync {
    async fn find(&self, event_id: &ID) -> anyhow::Result<Option<UnitEvent>>;
    async fn find_by_feed_source(
        &self,
        unit_id: &ID,
        feed_source_id: &ID,
    ) -> anyhow::Result<Vec<UnitEvent>>;
    /// Distinct feed sources that currently have stored events for the unit
    async fn find_feed_source_ids(&self, unit_id: &ID) -> anyhow::Result<Vec<ID>>;
    /// Atomically applies the change set and appends its outbox records.
    /// Returns the appended records with their store assigned ids.
    async fn apply_diff(&self, change_set: FeedChangeSet) -> anyhow::Result<Vec<OutboxRecord>>;
}
