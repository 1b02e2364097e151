//! Storage manager wiring the pool, services and dispatcher together

use crate::dispatcher::Dispatcher;
use crate::migrations::Migrations;
use crate::repositories::*;
use crate::services::{ServiceContext, Services};
use crate::{Error, Result};
use nest_admin_core::pagination::ListingConfig;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Database configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub migrate_on_startup: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://nest-admin.db".to_string(),
            max_connections: 10,
            migrate_on_startup: true,
        }
    }
}

impl DatabaseConfig {
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(Error::Configuration("database url must not be empty".to_string()));
        }
        if self.max_connections == 0 {
            return Err(Error::Configuration(
                "max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// How long a writer waits for another connection's write lock
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection options shared by every pool on a database file.
///
/// Writers open `BEGIN IMMEDIATE` transactions, so contention is resolved
/// by waiting up to [`BUSY_TIMEOUT`] instead of failing with `SQLITE_BUSY`.
pub fn connect_options(url: &str) -> Result<SqliteConnectOptions> {
    Ok(SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT))
}

/// Main storage manager coordinating the pool and the handlers
pub struct StorageManager {
    pool: SqlitePool,
    services: Services,
    dispatcher: Arc<Dispatcher>,
}

impl StorageManager {
    /// Connect, optionally migrate, and register every handler
    pub async fn new(config: &DatabaseConfig, listing: ListingConfig) -> Result<Self> {
        config.validate()?;
        listing
            .validate()
            .map_err(|failure| Error::Configuration(failure.to_string()))?;

        info!("Connecting to database: {}", config.url);
        let options = connect_options(&config.url)?;
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;
        info!("Database connection established");

        let manager = Self::from_pool(pool, listing);
        if config.migrate_on_startup {
            manager.migrate().await?;
        } else if Migrations::needs_migration(&manager.pool).await? {
            warn!("Database schema is behind; run `nest-admin migrate`");
        }
        Ok(manager)
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: SqlitePool, listing: ListingConfig) -> Self {
        let services = Services::new(ServiceContext::new(pool.clone(), listing));
        let dispatcher = Arc::new(services.register_all(Dispatcher::builder()).build());
        Self {
            pool,
            services,
            dispatcher,
        }
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        Migrations::run(&self.pool).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        Arc::clone(&self.dispatcher)
    }

    /// Check database health
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }

    /// Get database statistics
    pub async fn stats(&self) -> Result<DatabaseStats> {
        Ok(DatabaseStats {
            schema_version: Migrations::current_version(&self.pool).await?,
            establishments_count: self.table_count::<EstablishmentRepository>().await?,
            addresses_count: self.table_count::<AddressRepository>().await?,
            contacts_count: self.table_count::<ContactRepository>().await?,
            phones_count: self.table_count::<PhoneRepository>().await?,
            members_count: self.table_count::<MemberRepository>().await?,
            employees_count: self.table_count::<EmployeeRepository>().await?,
            roles_count: self.table_count::<RoleRepository>().await?,
            social_media_count: self.table_count::<SocialMediaRepository>().await?,
        })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn table_count<R: Repository>(&self) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", R::TABLE);
        Ok(sqlx::query_scalar(&sql).fetch_one(&self.pool).await?)
    }
}

/// Database statistics
#[derive(Debug, Clone, Serialize)]
pub struct DatabaseStats {
    pub schema_version: Option<i64>,
    pub establishments_count: i64,
    pub addresses_count: i64,
    pub contacts_count: i64,
    pub phones_count: i64,
    pub members_count: i64,
    pub employees_count: i64,
    pub roles_count: i64,
    pub social_media_count: i64,
}
