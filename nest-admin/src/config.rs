//! Configuration management for the command line tool

use crate::{Error, Result};
use nest_admin_core::pagination::ListingConfig;
use nest_admin_storage::DatabaseConfig;
use serde::{Deserialize, Serialize};

/// Environment variables look like `NEST_ADMIN_DATABASE__URL`
pub const ENV_PREFIX: &str = "NEST_ADMIN";

/// Default configuration file, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "nest-admin.toml";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub listing: ListingConfig,
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default file and the environment
    pub fn load() -> Result<Self> {
        Self::load_with(config::File::with_name(DEFAULT_CONFIG_FILE).required(false))
    }

    /// Load configuration from an explicit file and the environment
    pub fn load_from_file(path: &str) -> Result<Self> {
        Self::load_with(config::File::with_name(path).required(true))
    }

    fn load_with<S>(file: S) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let defaults = Config::default();
        let settings = config::Config::builder()
            .set_default("database.url", defaults.database.url)?
            .set_default(
                "database.max_connections",
                i64::from(defaults.database.max_connections),
            )?
            .set_default(
                "database.migrate_on_startup",
                defaults.database.migrate_on_startup,
            )?
            .set_default(
                "listing.default_page_size",
                i64::from(defaults.listing.default_page_size),
            )?
            .set_default(
                "listing.max_page_size",
                i64::from(defaults.listing.max_page_size),
            )?
            .set_default("logging.level", defaults.logging.level)?
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the storage layer cannot work with
    pub fn validate(&self) -> Result<()> {
        self.database.validate()?;
        self.listing
            .validate()
            .map_err(|failure| Error::Configuration(failure.to_string()))?;
        if self.logging.level.trim().is_empty() {
            return Err(Error::Configuration(
                "logging.level must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
