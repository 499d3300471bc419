use super::IUnitRepo;
use crate::repos::shared::inmemory_repo::*;
use ward_calendar_domain::{Unit, ID};

pub struct InMemoryUnitRepo {
    units: std::sync::Mutex<Vec<Unit>>,
}

impl InMemoryUnitRepo {
    pub fn new() -> Self {
        Self {
            units: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IUnitRepo for InMemoryUnitRepo {
    async fn insert(&self, unit: &Unit) -> anyhow::Result<()> {
        insert(unit, &self.units);
        Ok(())
    }

    async fn save(&self, unit: &Unit) -> anyhow::Result<()> {
        save(unit, &self.units);
        Ok(())
    }

    async fn find(&self, unit_id: &ID) -> anyhow::Result<Option<Unit>> {
        Ok(find(unit_id, &self.units))
    }

    async fn find_all(&self) -> anyhow::Result<Vec<Unit>> {
        Ok(find_by(&self.units, |_| true))
    }
}
