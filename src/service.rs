//! Wiring from configuration to a ready [`QueryRouter`].
//!
//! ```text
//! SqliteStore ──▶ ResilientStore ──▶ DataAccess ──▶ QueryRouter
//! ```
//!
//! The store handle is created once per process and shared; the core never
//! holds a global client.

use std::sync::Arc;

use anyhow::Result;

use community_guide_core::{DataAccess, QueryRouter, Store};

use crate::config::Config;
use crate::db;
use crate::migrate;
use crate::resilient::ResilientStore;
use crate::sqlite_store::SqliteStore;

/// Connect to the configured database, ensure the schema exists and wrap
/// the store with the configured retry policy.
pub async fn connect_store(config: &Config) -> Result<Arc<dyn Store>> {
    let pool = db::connect(config).await?;
    migrate::apply(&pool).await?;
    let store = ResilientStore::new(SqliteStore::new(pool), &config.store);
    Ok(Arc::new(store))
}

/// Data access over `store` with the configured failure mode.
pub fn data_access(config: &Config, store: Arc<dyn Store>) -> DataAccess {
    DataAccess::new(store).with_failure_mode(config.data.failure_mode)
}

pub async fn open_data_access(config: &Config) -> Result<DataAccess> {
    let store = connect_store(config).await?;
    Ok(data_access(config, store))
}

/// Router over `dal` with the configured vocabulary.
pub fn router(config: &Config, dal: DataAccess) -> QueryRouter {
    QueryRouter::new(dal).with_vocabulary(config.router.clone())
}

pub async fn open_router(config: &Config) -> Result<QueryRouter> {
    let dal = open_data_access(config).await?;
    Ok(router(config, dal))
}
