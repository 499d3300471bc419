use super::IFeedSourceRepo;
use sqlx::{types::Uuid, FromRow, PgPool};
use ward_calendar_domain::{FeedSource, Url, ID};

pub struct PostgresFeedSourceRepo {
    pool: PgPool,
}

impl PostgresFeedSourceRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct FeedSourceRaw {
    feed_source_uid: Uuid,
    unit_uid: Uuid,
    url: String,
}

impl TryFrom<FeedSourceRaw> for FeedSource {
    type Error = anyhow::Error;

    fn try_from(raw: FeedSourceRaw) -> anyhow::Result<Self> {
        Ok(Self {
            id: raw.feed_source_uid.into(),
            unit_id: raw.unit_uid.into(),
            url: Url::parse(&raw.url)?,
        })
    }
}

#[async_trait::async_trait]
impl IFeedSourceRepo for PostgresFeedSourceRepo {
    async fn insert(&self, feed_source: &FeedSource) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO feed_sources(feed_source_uid, unit_uid, url)
            VALUES($1, $2, $3)
            "#,
        )
        .bind(feed_source.id.inner_ref())
        .bind(feed_source.unit_id.inner_ref())
        .bind(feed_source.url.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, feed_source_id: &ID) -> anyhow::Result<Option<FeedSource>> {
        let raw: Option<FeedSourceRaw> = sqlx::query_as(
            r#"
            DELETE FROM feed_sources AS f
            WHERE f.feed_source_uid = $1
            RETURNING *
            "#,
        )
        .bind(feed_source_id.inner_ref())
        .fetch_optional(&self.pool)
        .await?;

        raw.map(FeedSource::try_from).transpose()
    }

    async fn find_by_unit(&self, unit_id: &ID) -> anyhow::Result<Vec<FeedSource>> {
        let raws: Vec<FeedSourceRaw> = sqlx::query_as(
            r#"
            SELECT * FROM feed_sources AS f
            WHERE f.unit_uid = $1
            ORDER BY f.created
            "#,
        )
        .bind(unit_id.inner_ref())
        .fetch_all(&self.pool)
        .await?;

        raws.into_iter().map(FeedSource::try_from).collect()
    }
}
