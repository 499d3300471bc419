use super::IDispatchCursorRepo;
use crate::shared::lock;
use std::{collections::HashMap, sync::Mutex};
use ward_calendar_domain::ID;

pub struct InMemoryDispatchCursorRepo {
    cursors: Mutex<HashMap<ID, i64>>,
}

impl InMemoryDispatchCursorRepo {
    pub fn new() -> Self {
        Self {
            cursors: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait::async_trait]
impl IDispatchCursorRepo for InMemoryDispatchCursorRepo {
    async fn find(&self, unit_id: &ID) -> anyhow::Result<Option<i64>> {
        Ok(lock(&self.cursors).get(unit_id).copied())
    }

    async fn save(&self, unit_id: &ID, last_outbox_id: i64) -> anyhow::Result<()> {
        let mut cursors = lock(&self.cursors);
        let cursor = cursors.entry(*unit_id).or_insert(last_outbox_id);
        *cursor = (*cursor).max(last_outbox_id);
        Ok(())
    }
}
