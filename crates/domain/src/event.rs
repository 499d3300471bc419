use crate::shared::entity::{Entity, ID};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Start or end of an `Event`.
///
/// All-day events carry plain calendar dates without any timezone
/// conversion, everything else is normalized to an UTC instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum EventTime {
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
}

impl EventTime {
    pub fn is_date(&self) -> bool {
        matches!(self, Self::Date(_))
    }
}

/// Ordered set of category labels. Insertion order is kept and
/// duplicates are dropped. Two `Tags` are equal when they hold the
/// same labels regardless of order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tags(Vec<String>);

impl Tags {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Returns false if the tag was already present
    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if self.0.contains(&tag) {
            return false;
        }
        self.0.push(tag);
        true
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq for Tags {
    fn eq(&self, other: &Self) -> bool {
        if self.0.len() != other.0.len() {
            return false;
        }
        let own: HashSet<&String> = self.0.iter().collect();
        other.0.iter().all(|tag| own.contains(tag))
    }
}

impl Eq for Tags {}

impl<S: Into<String>> FromIterator<S> for Tags {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut tags = Tags::new();
        for tag in iter {
            tags.insert(tag);
        }
        tags
    }
}

/// One calendar occurrence as published by a feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Stable identifier from the source feed, only unique within that feed
    pub uid: String,
    pub title: String,
    pub description: Option<String>,
    pub start: EventTime,
    /// Absent for point-in-time events
    pub end: Option<EventTime>,
    pub tags: Tags,
}

impl Event {
    /// True when the source specified a date-only value
    pub fn all_day(&self) -> bool {
        self.start.is_date()
    }
}

/// An `Event` persisted for a `Unit`, keyed by the `FeedSource` it
/// was observed in and its `uid`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitEvent {
    pub id: ID,
    pub unit_id: ID,
    pub feed_source_id: ID,
    pub event: Event,
    pub created: i64,
    pub updated: i64,
}

impl UnitEvent {
    pub fn new(unit_id: &ID, feed_source_id: &ID, event: Event, now: i64) -> Self {
        Self {
            id: Default::default(),
            unit_id: *unit_id,
            feed_source_id: *feed_source_id,
            event,
            created: now,
            updated: now,
        }
    }

    pub fn uid(&self) -> &str {
        &self.event.uid
    }
}

impl Entity for UnitEvent {
    fn id(&self) -> &ID {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_keep_insertion_order_and_drop_duplicates() {
        let tags: Tags = vec!["ward", "leadership", "ward"].into_iter().collect();
        assert_eq!(tags.as_slice(), &["ward".to_string(), "leadership".to_string()]);
    }

    #[test]
    fn tags_compare_as_sets() {
        let a: Tags = vec!["ward", "youth"].into_iter().collect();
        let b: Tags = vec!["youth", "ward"].into_iter().collect();
        let c: Tags = vec!["ward"].into_iter().collect();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn all_day_follows_start_kind() {
        let date = NaiveDate::from_ymd_opt(2026, 7, 10).unwrap();
        let event = Event {
            uid: "1".into(),
            title: "Camp".into(),
            description: None,
            start: EventTime::Date(date),
            end: None,
            tags: Tags::new(),
        };
        assert!(event.all_day());
    }
}
