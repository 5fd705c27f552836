//! Database migrations: create the feeds table and its indexes.
use sqlx::SqlitePool;
use tracing::info;

pub async fn migrate(pool: &SqlitePool) -> Result<(), String> {
    info!("DB migrate start");

    let ddls = [
        r#"
      CREATE TABLE IF NOT EXISTS feeds(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        url TEXT NOT NULL,
        css_selector TEXT NOT NULL,
        items TEXT NOT NULL DEFAULT '[]',
        latest_count INTEGER NOT NULL DEFAULT 0,
        created_at_ms INTEGER NOT NULL,
        updated_at_ms INTEGER NOT NULL
      )"#,
        r#"CREATE UNIQUE INDEX IF NOT EXISTS idx_feeds_url ON feeds(url)"#,
        r#"CREATE INDEX IF NOT EXISTS idx_feeds_name ON feeds(name)"#,
        r#"CREATE INDEX IF NOT EXISTS idx_feeds_created_at ON feeds(created_at_ms)"#,
    ];

    for ddl in ddls {
        sqlx::query(ddl)
            .execute(pool)
            .await
            .map_err(|e| format!("migrate error: {e}"))?;
    }

    info!("DB migrate complete");
    Ok(())
}
