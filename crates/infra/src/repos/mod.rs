mod dispatch_cursor;
mod event;
mod feed_source;
mod outbox;
mod shared;
mod unit;

pub use dispatch_cursor::IDispatchCursorRepo;
use dispatch_cursor::{InMemoryDispatchCursorRepo, PostgresDispatchCursorRepo};
pub use event::{FeedChangeSet, IEventRepo};
use event::{InMemoryEventStore, PostgresEventRepo};
pub use feed_source::IFeedSourceRepo;
use feed_source::{InMemoryFeedSourceRepo, PostgresFeedSourceRepo};
pub use outbox::IOutboxRepo;
use outbox::PostgresOutboxRepo;
use sqlx::PgPool;
use std::sync::Arc;
pub use unit::IUnitRepo;
use unit::{InMemoryUnitRepo, PostgresUnitRepo};

#[derive(Clone)]
pub struct Repos {
    pub units: Arc<dyn IUnitRepo>,
    pub feed_sources: Arc<dyn IFeedSourceRepo>,
    pub events: Arc<dyn IEventRepo>,
    pub outbox: Arc<dyn IOutboxRepo>,
    pub dispatch_cursors: Arc<dyn IDispatchCursorRepo>,
}

impl Repos {
    pub fn create_postgres(pool: &PgPool) -> Self {
        Self {
            units: Arc::new(PostgresUnitRepo::new(pool.clone())),
            feed_sources: Arc::new(PostgresFeedSourceRepo::new(pool.clone())),
            events: Arc::new(PostgresEventRepo::new(pool.clone())),
            outbox: Arc::new(PostgresOutboxRepo::new(pool.clone())),
            dispatch_cursors: Arc::new(PostgresDispatchCursorRepo::new(pool.clone())),
        }
    }

    pub fn create_inmemory() -> Self {
        // Events and outbox share their storage so that change sets commit atomically
        let event_store = Arc::new(InMemoryEventStore::new());
        Self {
            units: Arc::new(InMemoryUnitRepo::new()),
            feed_sources: Arc::new(InMemoryFeedSourceRepo::new()),
            events: event_store.clone(),
            outbox: event_store,
            dispatch_cursors: Arc::new(InMemoryDispatchCursorRepo::new()),
        }
    }
}
