pub mod admin;
pub mod migrate;
pub mod serve;

use std::sync::Arc;

use crate::config;
use crate::database::{DatabaseManager, PgStore};

/// Postgres-backed store built from the global config
pub(crate) async fn pg_store() -> anyhow::Result<Arc<PgStore>> {
    let pool = DatabaseManager::connect(&config::config().database).await?;
    Ok(Arc::new(PgStore::new(pool)))
}
