use super::IUnitRepo;
use serde_json::Value;
use sqlx::{types::Json, types::Uuid, FromRow, PgPool};
use tracing::error;
use ward_calendar_domain::{Unit, ID};

pub struct PostgresUnitRepo {
    pool: PgPool,
}

impl PostgresUnitRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UnitRaw {
    unit_uid: Uuid,
    name: String,
    settings: Value,
}

impl TryFrom<UnitRaw> for Unit {
    type Error = anyhow::Error;

    fn try_from(raw: UnitRaw) -> anyhow::Result<Self> {
        Ok(Self {
            id: raw.unit_uid.into(),
            name: raw.name,
            settings: serde_json::from_value(raw.settings)?,
        })
    }
}

#[async_trait::async_trait]
impl IUnitRepo for PostgresUnitRepo {
    async fn insert(&self, unit: &Unit) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO units(unit_uid, name, settings)
            VALUES($1, $2, $3)
            "#,
        )
        .bind(unit.id.inner_ref())
        .bind(&unit.name)
        .bind(Json(&unit.settings))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn save(&self, unit: &Unit) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE units
            SET name = $2,
            settings = $3
            WHERE unit_uid = $1
            "#,
        )
        .bind(unit.id.inner_ref())
        .bind(&unit.name)
        .bind(Json(&unit.settings))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Unable to update unit: {:?}", e);
            e
        })?;

        Ok(())
    }

    async fn find(&self, unit_id: &ID) -> anyhow::Result<Option<Unit>> {
        let raw: Option<UnitRaw> = sqlx::query_as(
            r#"
            SELECT * FROM units AS u
            WHERE u.unit_uid = $1
            "#,
        )
        .bind(unit_id.inner_ref())
        .fetch_optional(&self.pool)
        .await?;

        raw.map(Unit::try_from).transpose()
    }

    async fn find_all(&self) -> anyhow::Result<Vec<Unit>> {
        let raws: Vec<UnitRaw> = sqlx::query_as("SELECT * FROM units")
            .fetch_all(&self.pool)
            .await?;

        raws.into_iter().map(Unit::try_from).collect()
    }
}
