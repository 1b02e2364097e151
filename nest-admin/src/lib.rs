//! Command line entry point for Nest Admin
//!
//! Loads configuration, opens the storage manager and runs maintenance
//! commands against the database.

pub mod config;
pub mod error;


pub use error::{Error, Result};

use nest_admin_storage::StorageManager;
use tracing::info;

/// Re-export the library crates for convenience
pub use nest_admin_core as core;
pub use nest_admin_storage as storage;

/// Open the configured database without touching its schema.
///
/// Migrations only run through an explicit [`StorageManager::migrate`], so a
/// health check against an old database reports it instead of upgrading it.
pub async fn open_storage(config: &config::Config) -> Result<StorageManager> {
    let mut database = config.database.clone();
    database.migrate_on_startup = false;

    info!("Opening database {}", database.url);
    Ok(StorageManager::new(&database, config.listing).await?)
}
