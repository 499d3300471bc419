use crate::event::{Event, UnitEvent};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Changes between the stored events of one feed source and the events
/// observed in its latest snapshot, matched by `uid`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct EventDiff {
    /// Observed events with a `uid` that is not stored yet
    pub created: Vec<Event>,
    /// Stored events paired with their changed observed version
    pub updated: Vec<(UnitEvent, Event)>,
    /// Stored events that are absent from the snapshot
    pub cancelled: Vec<UnitEvent>,
}

impl EventDiff {
    pub fn compute(stored: &[UnitEvent], observed: Vec<Event>) -> Self {
        let stored_by_uid: HashMap<&str, &UnitEvent> =
            stored.iter().map(|e| (e.uid(), e)).collect();

        let mut diff = Self::default();
        let mut seen: HashSet<String> = HashSet::with_capacity(observed.len());

        for event in observed {
            if seen.contains(&event.uid) {
                warn!(uid = %event.uid, "Duplicate uid in feed snapshot, keeping the first one");
                continue;
            }
            seen.insert(event.uid.clone());

            match stored_by_uid.get(event.uid.as_str()) {
                None => diff.created.push(event),
                Some(existing) if existing.event != event => {
                    diff.updated.push(((*existing).clone(), event))
                }
                Some(_) => (),
            }
        }

        diff.cancelled = stored
            .iter()
            .filter(|e| !seen.contains(e.uid()))
            .cloned()
            .collect();

        diff
    }

    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.updated.is_empty() && self.cancelled.is_empty()
    }

    pub fn len(&self) -> usize {
        self.created.len() + self.updated.len() + self.cancelled.len()
    }
}
