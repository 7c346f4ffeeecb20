use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;
use crate::models::RelationType;

/// Creates the three relation tables if they do not exist yet.
///
/// Table and column names are an external contract: existing databases
/// built by other tooling are read as-is (`WORD` plus one value column).
pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    create_tables(&pool).await?;
    pool.close().await;
    Ok(())
}

pub async fn create_tables(pool: &SqlitePool) -> Result<()> {
    for relation in RelationType::ALL {
        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS {table} (WORD TEXT NOT NULL, {column} TEXT)",
            table = relation.table_name(),
            column = relation.value_column(),
        );
        sqlx::query(&ddl).execute(pool).await?;

        let index = format!(
            "CREATE INDEX IF NOT EXISTS idx_{table}_word ON {table}(WORD)",
            table = relation.table_name(),
        );
        sqlx::query(&index).execute(pool).await?;
    }
    Ok(())
}
