//! SQLite-backed [`Store`] implementation.
//!
//! Each item is one row in `items`. Point gets and index queries use the
//! indexed key columns; scans read every row in insertion (`rowid`) order
//! and apply the [`Filter`] in process. Counter adds run as a single
//! `UPDATE` over the stored JSON, so they are atomic without a transaction.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use community_guide_core::item::{
    string_attr, Item, PrimaryKey, ENTITY_TYPE, GSI1PK, GSI1SK, UPDATED_AT,
};
use community_guide_core::store::{Filter, Store};

/// SQLite implementation of the [`Store`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn decode_row(json: &str) -> Result<Item> {
    serde_json::from_str(json).context("malformed item_json row")
}

/// JSON path of a top-level attribute inside `item_json`.
fn attribute_path(attribute: &str) -> String {
    format!("$.\"{}\"", attribute.replace('"', ""))
}

fn decode_rows(rows: &[sqlx::sqlite::SqliteRow]) -> Result<Vec<Item>> {
    rows.iter()
        .map(|row| decode_row(&row.get::<String, _>("item_json")))
        .collect()
}

#[async_trait]
impl Store for SqliteStore {
    async fn get_item(&self, key: &PrimaryKey) -> Result<Option<Item>> {
        let row = sqlx::query("SELECT item_json FROM items WHERE pk = ? AND sk = ?")
            .bind(&key.pk)
            .bind(&key.sk)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => Ok(Some(decode_row(&row.get::<String, _>("item_json"))?)),
            None => Ok(None),
        }
    }

    async fn query_index(&self, partition: &str) -> Result<Vec<Item>> {
        let rows = sqlx::query(
            "SELECT item_json FROM items WHERE gsi1pk = ? ORDER BY gsi1sk, rowid",
        )
        .bind(partition)
        .fetch_all(&self.pool)
        .await?;
        decode_rows(&rows)
    }

    async fn scan(&self, filter: &Filter) -> Result<Vec<Item>> {
        let rows = sqlx::query("SELECT item_json FROM items ORDER BY rowid")
            .fetch_all(&self.pool)
            .await?;
        let items = decode_rows(&rows)?;
        Ok(items.into_iter().filter(|item| filter.matches(item)).collect())
    }

    async fn put_items(&self, items: &[Item]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for item in items {
            let key = PrimaryKey::of_item(item)
                .ok_or_else(|| anyhow!("item is missing PK/SK attributes"))?;
            let json = serde_json::to_string(item)?;
            sqlx::query(
                r#"
                INSERT INTO items (pk, sk, gsi1pk, gsi1sk, entity_type, item_json)
                VALUES (?, ?, ?, ?, ?, ?)
                ON CONFLICT(pk, sk) DO UPDATE SET
                    gsi1pk = excluded.gsi1pk,
                    gsi1sk = excluded.gsi1sk,
                    entity_type = excluded.entity_type,
                    item_json = excluded.item_json
                "#,
            )
            .bind(&key.pk)
            .bind(&key.sk)
            .bind(string_attr(item, GSI1PK))
            .bind(string_attr(item, GSI1SK))
            .bind(string_attr(item, ENTITY_TYPE))
            .bind(json)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn delete_items(&self, keys: &[PrimaryKey]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for key in keys {
            sqlx::query("DELETE FROM items WHERE pk = ? AND sk = ?")
                .bind(&key.pk)
                .bind(&key.sk)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn add_to_number(
        &self,
        key: &PrimaryKey,
        attribute: &str,
        delta: i64,
        updated_at: &str,
    ) -> Result<Option<i64>> {
        let path = attribute_path(attribute);
        let number_path = format!("{}.N", path);
        let row = sqlx::query(
            r#"
            UPDATE items SET item_json = json_set(
                item_json,
                ?, json_object('N', CAST(COALESCE(CAST(json_extract(item_json, ?) AS INTEGER), 0) + ? AS TEXT)),
                ?, json_object('S', ?)
            )
            WHERE pk = ? AND sk = ?
            RETURNING CAST(json_extract(item_json, ?) AS INTEGER) AS value
            "#,
        )
        .bind(&path)
        .bind(&number_path)
        .bind(delta)
        .bind(attribute_path(UPDATED_AT))
        .bind(updated_at)
        .bind(&key.pk)
        .bind(&key.sk)
        .bind(&number_path)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("failed to add to {} on {}", attribute, key.pk))?;
        Ok(row.map(|row| row.get::<i64, _>("value")))
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
