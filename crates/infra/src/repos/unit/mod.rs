mod inmemory;
mod postgres;

pub use inmemory::InMemoryUnitRepo;
pub use postgres::PostgresUnitRepo;
use ward_calendar_domain::{Unit, ID};

#[async_trait::async_trait]
pub trait IUnitRepo: Send + Sync {
    async fn insert(&self, unit: &Unit) -> anyhow::Result<()>;
    async fn save(&self, unit: &Unit) -> anyhow::Result<()>;
    async fn find(&self, unit_id: &ID) -> anyhow::Result<Option<Unit>>;
    async fn find_all(&self) -> anyhow::Result<Vec<Unit>>;
}
