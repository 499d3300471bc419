use super::IDispatchCursorRepo;
use sqlx::PgPool;
use ward_calendar_domain::ID;

pub struct PostgresDispatchCursorRepo {
    pool: PgPool,
}

impl PostgresDispatchCursorRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl IDispatchCursorRepo for PostgresDispatchCursorRepo {
    async fn find(&self, unit_id: &ID) -> anyhow::Result<Option<i64>> {
        let cursor: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT c.last_outbox_id FROM dispatch_cursors AS c
            WHERE c.unit_uid = $1
            "#,
        )
        .bind(unit_id.inner_ref())
        .fetch_optional(&self.pool)
        .await?;

        Ok(cursor)
    }

    async fn save(&self, unit_id: &ID, last_outbox_id: i64) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO dispatch_cursors(unit_uid, last_outbox_id)
            VALUES($1, $2)
            ON CONFLICT (unit_uid) DO UPDATE
            SET last_outbox_id = GREATEST(dispatch_cursors.last_outbox_id, excluded.last_outbox_id)
            "#,
        )
        .bind(unit_id.inner_ref())
        .bind(last_outbox_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
