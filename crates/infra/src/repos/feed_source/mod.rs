mod inmemory;
mod postgres;

pub use inmemory::InMemoryFeedSourceRepo;
pub use postgres::PostgresFeedSourceRepo;
use ward_calendar_domain::{FeedSource, ID};

#[async_trait::async_trait]
pub trait IFeedSourceRepo: Send + Sync {
    async fn insert(&self, feed_source: &FeedSource) -> anyhow::Result<()>;
    async fn delete(&self, feed_source_id: &ID) -> anyhow::Result<Option<FeedSource>>;
    async fn find_by_unit(&self, unit_id: &ID) -> anyhow::Result<Vec<FeedSource>>;
}
