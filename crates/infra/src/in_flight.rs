use crate::shared::lock;
use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};
use ward_calendar_domain::ID;

/// Tracks the ids that have work in flight in this process. Used to
/// keep two reconciliation passes of one feed source, or two dispatch
/// passes of one unit, from running at the same time.
#[derive(Default)]
pub struct InFlightLocks {
    in_flight: Arc<Mutex<HashSet<ID>>>,
}

impl InFlightLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `None` if the id already has work in flight
    pub fn try_acquire(&self, id: &ID) -> Option<InFlightGuard> {
        if !lock(&self.in_flight).insert(*id) {
            return None;
        }
        Some(InFlightGuard {
            id: *id,
            in_flight: self.in_flight.clone(),
        })
    }

    pub fn is_locked(&self, id: &ID) -> bool {
        lock(&self.in_flight).contains(id)
    }
}

/// Releases the id when dropped
pub struct InFlightGuard {
    id: ID,
    in_flight: Arc<Mutex<HashSet<ID>>>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        lock(&self.in_flight).remove(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_is_rejected_until_released() {
        let locks = InFlightLocks::new();
        let feed = ID::new();

        let guard = locks.try_acquire(&feed);
        assert!(guard.is_some());
        assert!(locks.try_acquire(&feed).is_none());
        assert!(locks.try_acquire(&ID::new()).is_some());

        drop(guard);
        assert!(!locks.is_locked(&feed));
        assert!(locks.try_acquire(&feed).is_some());
    }
}
