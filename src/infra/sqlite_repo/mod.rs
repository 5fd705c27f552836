//! SQLite-backed `FeedRepo` implementation.
mod connection;
mod migrations;

use std::path::Path;

use sqlx::SqlitePool;
use tracing::debug;

use crate::domain::model::{Feed, FeedDraft, FeedPatch, SubjectItem};
use crate::ports::repo::FeedRepo;

const FEED_COLUMNS: &str =
    "id, name, url, css_selector, items, latest_count, created_at_ms, updated_at_ms";

#[derive(Debug, sqlx::FromRow)]
struct FeedRow {
    id: i64,
    name: String,
    url: String,
    css_selector: String,
    items: String,
    latest_count: i64,
    created_at_ms: i64,
    updated_at_ms: i64,
}

impl TryFrom<FeedRow> for Feed {
    type Error = String;

    fn try_from(row: FeedRow) -> Result<Self, Self::Error> {
        let items: Vec<SubjectItem> = serde_json::from_str(&row.items)
            .map_err(|e| format!("feed {} items decode error: {e}", row.id))?;
        Ok(Feed {
            id: row.id,
            name: row.name,
            url: row.url,
            css_selector: row.css_selector,
            items,
            latest_count: row.latest_count,
            created_at_ms: row.created_at_ms,
            updated_at_ms: row.updated_at_ms,
        })
    }
}

pub struct SqliteRepo {
    pool: SqlitePool,
}

impl SqliteRepo {
    pub async fn new(db_path: &Path) -> Result<Self, String> {
        let pool = connection::create_pool(db_path).await?;
        Ok(Self { pool })
    }

    /// In-memory store, used by tests and dev tooling.
    pub async fn in_memory() -> Result<Self, String> {
        let pool = connection::create_memory_pool().await?;
        Ok(Self { pool })
    }
}

#[async_trait::async_trait]
impl FeedRepo for SqliteRepo {
    async fn migrate(&self) -> Result<(), String> {
        migrations::migrate(&self.pool).await
    }

    async fn get_all(&self) -> Result<Vec<Feed>, String> {
        let rows: Vec<FeedRow> = sqlx::query_as(&format!(
            "SELECT {FEED_COLUMNS} FROM feeds ORDER BY id ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| format!("feeds select error: {e}"))?;

        rows.into_iter().map(Feed::try_from).collect()
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Feed>, String> {
        let row: Option<FeedRow> = sqlx::query_as(&format!(
            "SELECT {FEED_COLUMNS} FROM feeds WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| format!("feed select error: {e}"))?;

        row.map(Feed::try_from).transpose()
    }

    async fn get_by_url(&self, url: &str) -> Result<Option<Feed>, String> {
        let row: Option<FeedRow> = sqlx::query_as(&format!(
            "SELECT {FEED_COLUMNS} FROM feeds WHERE url = ?1"
        ))
        .bind(url)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| format!("feed select error: {e}"))?;

        row.map(Feed::try_from).transpose()
    }

    async fn add(&self, draft: &FeedDraft, now_ms: i64) -> Result<i64, String> {
        let result = sqlx::query(
            r#"
        INSERT INTO feeds(name, url, css_selector, items, latest_count, created_at_ms, updated_at_ms)
        VALUES (?1, ?2, ?3, '[]', 0, ?4, ?4)
        "#,
        )
        .bind(&draft.name)
        .bind(&draft.url)
        .bind(&draft.css_selector)
        .bind(now_ms)
        .execute(&self.pool)
        .await
        .map_err(|e| format!("feed insert error: {e}"))?;

        let id = result.last_insert_rowid();
        debug!(feed_id = id, url = %draft.url, "feed inserted");
        Ok(id)
    }

    async fn update(&self, id: i64, patch: FeedPatch, now_ms: i64) -> Result<(), String> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| format!("tx begin: {e}"))?;

        let row: Option<FeedRow> = sqlx::query_as(&format!(
            "SELECT {FEED_COLUMNS} FROM feeds WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| format!("feed select error: {e}"))?;

        let Some(row) = row else {
            return Err(format!("feed {id} not found"));
        };
        let existing = Feed::try_from(row)?;

        let items = patch.items.unwrap_or(existing.items);
        let items_json = serde_json::to_string(&items)
            .map_err(|e| format!("feed items encode error: {e}"))?;

        sqlx::query(
            r#"
        UPDATE feeds SET
          name = ?2,
          url = ?3,
          css_selector = ?4,
          items = ?5,
          latest_count = ?6,
          updated_at_ms = ?7
        WHERE id = ?1
        "#,
        )
        .bind(id)
        .bind(patch.name.unwrap_or(existing.name))
        .bind(patch.url.unwrap_or(existing.url))
        .bind(patch.css_selector.unwrap_or(existing.css_selector))
        .bind(items_json)
        .bind(patch.latest_count.unwrap_or(existing.latest_count))
        .bind(now_ms)
        .execute(&mut *tx)
        .await
        .map_err(|e| format!("feed update error: {e}"))?;

        tx.commit().await.map_err(|e| format!("tx commit: {e}"))
    }

    async fn delete(&self, id: i64) -> Result<(), String> {
        sqlx::query("DELETE FROM feeds WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| format!("feed delete error: {e}"))?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), String> {
        sqlx::query("DELETE FROM feeds")
            .execute(&self.pool)
            .await
            .map_err(|e| format!("feeds clear error: {e}"))?;
        Ok(())
    }
}
