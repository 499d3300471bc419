use super::{FeedChangeSet, IEventRepo};
use crate::repos::outbox::IOutboxRepo;
use crate::shared::lock;
use std::sync::Mutex;
use ward_calendar_domain::{OutboxRecord, UnitEvent, ID};

#[derive(Default)]
struct EventStoreState {
    events: Vec<UnitEvent>,
    outbox: Vec<OutboxRecord>,
    last_outbox_id: i64,
}

/// Events and outbox live behind one lock so a change set is applied
/// as a whole, the same way the postgres store uses a transaction.
pub struct InMemoryEventStore {
    state: Mutex<EventStoreState>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(EventStoreState::default()),
        }
    }
}

#[async_trait::async_trait]
impl IEventRepo for InMemoryEventStore {
    async fn find(&self, event_id: &ID) -> anyhow::Result<Option<UnitEvent>> {
        let state = lock(&self.state);
        Ok(state.events.iter().find(|e| e.id == *event_id).cloned())
    }

    async fn find_by_feed_source(
        &self,
        unit_id: &ID,
        feed_source_id: &ID,
    ) -> anyhow::Result<Vec<UnitEvent>> {
        let state = lock(&self.state);
        Ok(state
            .events
            .iter()
            .filter(|e| e.unit_id == *unit_id && e.feed_source_id == *feed_source_id)
            .cloned()
            .collect())
    }

    async fn find_feed_source_ids(&self, unit_id: &ID) -> anyhow::Result<Vec<ID>> {
        let state = lock(&self.state);
        let mut ids: Vec<ID> = Vec::new();
        for event in state.events.iter().filter(|e| e.unit_id == *unit_id) {
            if !ids.contains(&event.feed_source_id) {
                ids.push(event.feed_source_id);
            }
        }
        Ok(ids)
    }

    async fn apply_diff(&self, change_set: FeedChangeSet) -> anyhow::Result<Vec<OutboxRecord>> {
        let mut state = lock(&self.state);

        state
            .events
            .retain(|e| !change_set.cancellations.contains(&e.id));
        for upsert in change_set.upserts {
            match state.events.iter_mut().find(|e| e.id == upsert.id) {
                Some(existing) => *existing = upsert,
                None => state.events.push(upsert),
            }
        }

        let mut records = Vec::with_capacity(change_set.outbox.len());
        for new_record in change_set.outbox {
            state.last_outbox_id += 1;
            let record = new_record.into_record(state.last_outbox_id);
            state.outbox.push(record.clone());
            records.push(record);
        }

        Ok(records)
    }
}

#[async_trait::async_trait]
impl IOutboxRepo for InMemoryEventStore {
    async fn find_after(
        &self,
        unit_id: &ID,
        after: i64,
        limit: usize,
    ) -> anyhow::Result<Vec<OutboxRecord>> {
        let state = lock(&self.state);
        Ok(state
            .outbox
            .iter()
            .filter(|r| r.unit_id == *unit_id && r.id > after)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ward_calendar_domain::{Event, EventTime, NewOutboxRecord, OutboxKind, Tags};

    fn unit_event(unit_id: &ID, feed_source_id: &ID, uid: &str) -> UnitEvent {
        let event = Event {
            uid: uid.into(),
            title: uid.into(),
            description: None,
            start: EventTime::Date(NaiveDate::from_ymd_opt(2026, 7, 10).unwrap()),
            end: None,
            tags: Tags::new(),
        };
        UnitEvent::new(unit_id, feed_source_id, event, 0)
    }

    #[tokio::test]
    async fn apply_diff_assigns_increasing_outbox_ids() {
        let store = InMemoryEventStore::new();
        let unit_id = ID::new();
        let feed_source_id = ID::new();
        let events = vec![
            unit_event(&unit_id, &feed_source_id, "a"),
            unit_event(&unit_id, &feed_source_id, "b"),
        ];
        let outbox = events
            .iter()
            .map(|e| NewOutboxRecord {
                unit_id,
                event_id: e.id,
                kind: OutboxKind::Created,
                created_at: 0,
            })
            .collect();

        let records = store
            .apply_diff(FeedChangeSet {
                upserts: events.clone(),
                cancellations: vec![],
                outbox,
            })
            .await
            .unwrap();

        assert_eq!(records.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(
            store
                .find_by_feed_source(&unit_id, &feed_source_id)
                .await
                .unwrap()
                .len(),
            2
        );

        let after_first = store.find_after(&unit_id, 1, 10).await.unwrap();
        assert_eq!(after_first.len(), 1);
        assert_eq!(after_first[0].event_id, events[1].id);
        assert!(store.find_after(&ID::new(), 0, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn apply_diff_replaces_and_removes_events() {
        let store = InMemoryEventStore::new();
        let unit_id = ID::new();
        let feed_source_id = ID::new();
        let a = unit_event(&unit_id, &feed_source_id, "a");
        let b = unit_event(&unit_id, &feed_source_id, "b");
        store
            .apply_diff(FeedChangeSet {
                upserts: vec![a.clone(), b.clone()],
                ..Default::default()
            })
            .await
            .unwrap();

        let mut renamed = a.clone();
        renamed.event.title = "renamed".into();
        store
            .apply_diff(FeedChangeSet {
                upserts: vec![renamed],
                cancellations: vec![b.id],
                outbox: vec![],
            })
            .await
            .unwrap();

        let stored = store
            .find_by_feed_source(&unit_id, &feed_source_id)
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].event.title, "renamed");
        assert_eq!(
            store.find_feed_source_ids(&unit_id).await.unwrap(),
            vec![feed_source_id]
        );
    }
}
