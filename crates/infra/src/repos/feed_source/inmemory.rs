use super::IFeedSourceRepo;
use crate::repos::shared::inmemory_repo::*;
use ward_calendar_domain::{FeedSource, ID};

pub struct InMemoryFeedSourceRepo {
    feed_sources: std::sync::Mutex<Vec<FeedSource>>,
}

impl InMemoryFeedSourceRepo {
    pub fn new() -> Self {
        Self {
            feed_sources: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IFeedSourceRepo for InMemoryFeedSourceRepo {
    async fn insert(&self, feed_source: &FeedSource) -> anyhow::Result<()> {
        insert(feed_source, &self.feed_sources);
        Ok(())
    }

    async fn delete(&self, feed_source_id: &ID) -> anyhow::Result<Option<FeedSource>> {
        Ok(delete(feed_source_id, &self.feed_sources))
    }

    async fn find_by_unit(&self, unit_id: &ID) -> anyhow::Result<Vec<FeedSource>> {
        Ok(find_by(&self.feed_sources, |f| f.unit_id == *unit_id))
    }
}
