use super::{FeedChangeSet, IEventRepo};
use serde_json::Value;
use sqlx::{types::Json, types::Uuid, FromRow, PgPool};
use tracing::error;
use ward_calendar_domain::{OutboxRecord, UnitEvent, ID};

pub struct PostgresEventRepo {
    pool: PgPool,
}

impl PostgresEventRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UnitEventRaw {
    event_uid: Uuid,
    unit_uid: Uuid,
    feed_source_uid: Uuid,
    payload: Value,
    created: i64,
    updated: i64,
}

impl TryFrom<UnitEventRaw> for UnitEvent {
    type Error = anyhow::Error;

    fn try_from(raw: UnitEventRaw) -> anyhow::Result<Self> {
        Ok(Self {
            id: raw.event_uid.into(),
            unit_id: raw.unit_uid.into(),
            feed_source_id: raw.feed_source_uid.into(),
            event: serde_json::from_value(raw.payload)?,
            created: raw.created,
            updated: raw.updated,
        })
    }
}

#[async_trait::async_trait]
impl IEventRepo for PostgresEventRepo {
    async fn find(&self, event_id: &ID) -> anyhow::Result<Option<UnitEvent>> {
        let raw: Option<UnitEventRaw> = sqlx::query_as(
            r#"
            SELECT * FROM events AS e
            WHERE e.event_uid = $1
            "#,
        )
        .bind(event_id.inner_ref())
        .fetch_optional(&self.pool)
        .await?;

        raw.map(UnitEvent::try_from).transpose()
    }

    async fn find_by_feed_source(
        &self,
        unit_id: &ID,
        feed_source_id: &ID,
    ) -> anyhow::Result<Vec<UnitEvent>> {
        let raws: Vec<UnitEventRaw> = sqlx::query_as(
            r#"
            SELECT * FROM events AS e
            WHERE e.unit_uid = $1 AND e.feed_source_uid = $2
            "#,
        )
        .bind(unit_id.inner_ref())
        .bind(feed_source_id.inner_ref())
        .fetch_all(&self.pool)
        .await?;

        raws.into_iter().map(UnitEvent::try_from).collect()
    }

    async fn find_feed_source_ids(&self, unit_id: &ID) -> anyhow::Result<Vec<ID>> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT e.feed_source_uid FROM events AS e
            WHERE e.unit_uid = $1
            "#,
        )
        .bind(unit_id.inner_ref())
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().map(ID::from).collect())
    }

    async fn apply_diff(&self, change_set: FeedChangeSet) -> anyhow::Result<Vec<OutboxRecord>> {
        let mut tx = self.pool.begin().await?;

        // Outbox ids of one unit must become visible in increasing order
        // for the dispatch cursor, so appends of a unit are serialized.
        let unit_ids = change_set
            .outbox
            .iter()
            .map(|r| r.unit_id)
            .chain(change_set.upserts.iter().map(|e| e.unit_id));
        let mut locked: Vec<ID> = Vec::new();
        for unit_id in unit_ids {
            if locked.contains(&unit_id) {
                continue;
            }
            sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
                .bind(unit_id.as_string())
                .execute(&mut *tx)
                .await?;
            locked.push(unit_id);
        }

        if !change_set.cancellations.is_empty() {
            let cancelled: Vec<Uuid> = change_set
                .cancellations
                .iter()
                .map(|id| *id.inner_ref())
                .collect();
            sqlx::query("DELETE FROM events WHERE event_uid = ANY($1)")
                .bind(cancelled)
                .execute(&mut *tx)
                .await?;
        }

        for event in &change_set.upserts {
            sqlx::query(
                r#"
                INSERT INTO events(event_uid, unit_uid, feed_source_uid, uid, payload, created, updated)
                VALUES($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (event_uid) DO UPDATE
                SET payload = excluded.payload,
                updated = excluded.updated
                "#,
            )
            .bind(event.id.inner_ref())
            .bind(event.unit_id.inner_ref())
            .bind(event.feed_source_id.inner_ref())
            .bind(event.uid())
            .bind(Json(&event.event))
            .bind(event.created)
            .bind(event.updated)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!("Unable to upsert event {}: {:?}", event.id, e);
                e
            })?;
        }

        let mut records = Vec::with_capacity(change_set.outbox.len());
        for new_record in change_set.outbox {
            let outbox_id: i64 = sqlx::query_scalar(
                r#"
                INSERT INTO outbox(unit_uid, event_uid, kind, created_at)
                VALUES($1, $2, $3, $4)
                RETURNING outbox_id
                "#,
            )
            .bind(new_record.unit_id.inner_ref())
            .bind(new_record.event_id.inner_ref())
            .bind(new_record.kind.as_str())
            .bind(new_record.created_at)
            .fetch_one(&mut *tx)
            .await?;
            records.push(new_record.into_record(outbox_id));
        }

        tx.commit().await?;

        Ok(records)
    }
}
