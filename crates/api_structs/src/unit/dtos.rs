use serde::{Deserialize, Serialize};
use ward_calendar_domain::{
    FeedSource, OrphanedEventsPolicy, OutboxKind, OutboxRecord, Tz, Unit, ID,
};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitDTO {
    pub id: ID,
    pub name: String,
    pub timezone: Tz,
    pub orphaned_events: OrphanedEventsPolicy,
}

impl UnitDTO {
    pub fn new(unit: Unit) -> Self {
        Self {
            id: unit.id,
            name: unit.name,
            timezone: unit.settings.timezone,
            orphaned_events: unit.settings.orphaned_events,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedSourceDTO {
    pub id: ID,
    pub unit_id: ID,
    pub url: String,
}

impl FeedSourceDTO {
    pub fn new(feed_source: FeedSource) -> Self {
        Self {
            id: feed_source.id,
            unit_id: feed_source.unit_id,
            url: feed_source.url.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboxRecordDTO {
    pub id: i64,
    pub unit_id: ID,
    pub event_id: ID,
    pub kind: OutboxKind,
    pub created_at: i64,
}

impl OutboxRecordDTO {
    pub fn new(record: OutboxRecord) -> Self {
        Self {
            id: record.id,
            unit_id: record.unit_id,
            event_id: record.event_id,
            kind: record.kind,
            created_at: record.created_at,
        }
    }
}
