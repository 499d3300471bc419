use super::IOutboxRepo;
use sqlx::{types::Uuid, FromRow, PgPool};
use ward_calendar_domain::{OutboxKind, OutboxRecord, ID};

pub struct PostgresOutboxRepo {
    pool: PgPool,
}

impl PostgresOutboxRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct OutboxRecordRaw {
    outbox_id: i64,
    unit_uid: Uuid,
    event_uid: Uuid,
    kind: String,
    created_at: i64,
}

impl TryFrom<OutboxRecordRaw> for OutboxRecord {
    type Error = anyhow::Error;

    fn try_from(raw: OutboxRecordRaw) -> anyhow::Result<Self> {
        Ok(Self {
            id: raw.outbox_id,
            unit_id: raw.unit_uid.into(),
            event_id: raw.event_uid.into(),
            kind: raw
                .kind
                .parse::<OutboxKind>()
                .map_err(anyhow::Error::msg)?,
            created_at: raw.created_at,
        })
    }
}

#[async_trait::async_trait]
impl IOutboxRepo for PostgresOutboxRepo {
    async fn find_after(
        &self,
        unit_id: &ID,
        after: i64,
        limit: usize,
    ) -> anyhow::Result<Vec<OutboxRecord>> {
        let raws: Vec<OutboxRecordRaw> = sqlx::query_as(
            r#"
            SELECT * FROM outbox AS o
            WHERE o.unit_uid = $1 AND o.outbox_id > $2
            ORDER BY o.outbox_id
            LIMIT $3
            "#,
        )
        .bind(unit_id.inner_ref())
        .bind(after)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        raws.into_iter().map(OutboxRecord::try_from).collect()
    }
}
