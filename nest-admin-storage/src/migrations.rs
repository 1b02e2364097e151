//! Database migration utilities

use crate::{Error, Result};
use sqlx::migrate::Migrator;
use sqlx::SqlitePool;
use tracing::info;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Migration utilities and helpers
pub struct Migrations;

impl Migrations {
    /// Apply every pending migration
    pub async fn run(pool: &SqlitePool) -> Result<()> {
        info!("Running database migrations");
        MIGRATOR
            .run(pool)
            .await
            .map_err(|e| Error::Migration(e.to_string()))?;
        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Get the current schema version
    pub async fn current_version(pool: &SqlitePool) -> Result<Option<i64>> {
        let tracked: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = '_sqlx_migrations')",
        )
        .fetch_one(pool)
        .await?;
        if !tracked {
            return Ok(None);
        }

        let version: Option<i64> =
            sqlx::query_scalar("SELECT MAX(version) FROM _sqlx_migrations WHERE success = 1")
                .fetch_one(pool)
                .await?;
        Ok(version)
    }

    /// Version of the newest embedded migration
    pub fn latest_version() -> Option<i64> {
        MIGRATOR.iter().map(|m| m.version).max()
    }

    /// Check if migrations are needed
    pub async fn needs_migration(pool: &SqlitePool) -> Result<bool> {
        let current = Self::current_version(pool).await?;
        Ok(current < Self::latest_version())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    #[tokio::test]
    async fn test_fresh_database_needs_migration() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to connect to test database");

        assert_eq!(Migrations::current_version(&pool).await.unwrap(), None);
        assert!(Migrations::needs_migration(&pool).await.unwrap());

        Migrations::run(&pool).await.expect("Failed to run migrations");
        assert_eq!(
            Migrations::current_version(&pool).await.unwrap(),
            Migrations::latest_version()
        );
        assert!(!Migrations::needs_migration(&pool).await.unwrap());
    }
}
