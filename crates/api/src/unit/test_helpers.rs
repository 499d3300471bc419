use chrono::NaiveDate;
use std::{future, sync::Arc, time::Duration};
use ward_calendar_domain::{
    Event, EventTime, FeedSource, NewOutboxRecord, OutboxKind, OutboxRecord, RetryPolicy, Tags,
    Unit, UnitEvent, Url, ID,
};
use ward_calendar_infra::{
    FeedChangeSet, FetchError, IEventRepo, IFeedFetcher, InMemoryJobQueue, MockSys,
    StaticFeedFetcher, WardContext,
};

pub struct TestContext {
    pub ctx: WardContext,
    pub sys: Arc<MockSys>,
    pub fetcher: Arc<StaticFeedFetcher>,
    pub queue: Arc<InMemoryJobQueue>,
    pub unit: Unit,
    pub feed_sources: Vec<FeedSource>,
}

/// In-memory context with a unit that has `feed_count` feed sources
pub async fn setup(feed_count: usize) -> TestContext {
    let sys = Arc::new(MockSys::new(1_782_900_000_000));
    let fetcher = Arc::new(StaticFeedFetcher::new());
    let queue = Arc::new(InMemoryJobQueue::new());
    let mut ctx = WardContext::create_inmemory()
        .with_sys(sys.clone())
        .with_feed_fetcher(fetcher.clone())
        .with_job_queue(queue.clone());
    ctx.config.dispatch_retry = RetryPolicy::new(3, 1, 4);

    let unit = Unit::new("Maple Grove Ward");
    ctx.repos.units.insert(&unit).await.unwrap();

    let mut feed_sources = Vec::with_capacity(feed_count);
    for i in 0..feed_count {
        let url = Url::parse(&format!("https://calendar.example.org/maple-grove/{}.ics", i))
            .unwrap();
        let feed_source = FeedSource::new(&unit.id, url);
        ctx.repos.feed_sources.insert(&feed_source).await.unwrap();
        feed_sources.push(feed_source);
    }

    TestContext {
        ctx,
        sys,
        fetcher,
        queue,
        unit,
        feed_sources,
    }
}

/// Feed text with one timed event per `(uid, summary)` pair
pub fn feed(events: &[(&str, &str)]) -> String {
    let mut ics = String::from("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Ward//Calendar//EN\r\n");
    for (uid, summary) in events {
        ics.push_str("BEGIN:VEVENT\r\n");
        ics.push_str(&format!("UID:{}\r\n", uid));
        ics.push_str(&format!("SUMMARY:{}\r\n", summary));
        ics.push_str("DTSTART:20260701T180000Z\r\n");
        ics.push_str("DTEND:20260701T190000Z\r\n");
        ics.push_str("END:VEVENT\r\n");
    }
    ics.push_str("END:VCALENDAR\r\n");
    ics
}

/// Appends one CREATED outbox record for each of `count` new events of the unit
pub async fn append_outbox(ctx: &WardContext, unit: &Unit, count: usize) -> Vec<OutboxRecord> {
    let feed_source_id = ID::new();
    let now = ctx.sys.get_timestamp_millis();
    let mut change_set = FeedChangeSet::default();
    for i in 0..count {
        let event = Event {
            uid: format!("{}@ward", i),
            title: format!("Event {}", i),
            description: None,
            start: EventTime::Date(NaiveDate::from_ymd_opt(2026, 7, 10).unwrap()),
            end: None,
            tags: Tags::new(),
        };
        let unit_event = UnitEvent::new(&unit.id, &feed_source_id, event, now);
        change_set.outbox.push(NewOutboxRecord {
            unit_id: unit.id,
            event_id: unit_event.id,
            kind: OutboxKind::Created,
            created_at: now,
        });
        change_set.upserts.push(unit_event);
    }
    ctx.repos.events.apply_diff(change_set).await.unwrap()
}

/// Reads go to the wrapped repo, every write fails
pub struct FailingEventRepo {
    inner: Arc<dyn IEventRepo>,
}

impl FailingEventRepo {
    pub fn new(inner: Arc<dyn IEventRepo>) -> Self {
        Self { inner }
    }
}

#[async_trait::async_trait]
impl IEventRepo for FailingEventRepo {
    async fn find(&self, event_id: &ID) -> anyhow::Result<Option<UnitEvent>> {
        self.inner.find(event_id).await
    }

    async fn find_by_feed_source(
        &self,
        unit_id: &ID,
        feed_source_id: &ID,
    ) -> anyhow::Result<Vec<UnitEvent>> {
        self.inner.find_by_feed_source(unit_id, feed_source_id).await
    }

    async fn find_feed_source_ids(&self, unit_id: &ID) -> anyhow::Result<Vec<ID>> {
        self.inner.find_feed_source_ids(unit_id).await
    }

    async fn apply_diff(&self, _change_set: FeedChangeSet) -> anyhow::Result<Vec<OutboxRecord>> {
        Err(anyhow::anyhow!("connection reset by peer"))
    }
}

/// Never answers
pub struct HangingFeedFetcher;

#[async_trait::async_trait]
impl IFeedFetcher for HangingFeedFetcher {
    async fn fetch(&self, _url: &Url, _timeout: Duration) -> Result<String, FetchError> {
        future::pending().await
    }
}
