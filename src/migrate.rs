//! Schema migrations.
//!
//! The community table is stored as one SQLite table. Key attributes are
//! lifted into indexed columns; the full item lives in `item_json` in the
//! store's tagged attribute form.

use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    apply(&pool).await?;
    pool.close().await;
    Ok(())
}

/// Create tables and indexes on an open pool. Idempotent.
pub async fn apply(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS items (
            pk TEXT NOT NULL,
            sk TEXT NOT NULL,
            gsi1pk TEXT,
            gsi1sk TEXT,
            entity_type TEXT,
            item_json TEXT NOT NULL,
            PRIMARY KEY (pk, sk)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_items_gsi1 ON items(gsi1pk, gsi1sk)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_items_entity_type ON items(entity_type)")
        .execute(pool)
        .await?;

    Ok(())
}
