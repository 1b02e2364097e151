//! Error types for the command line tool

use thiserror::Error;

/// Application error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Config file error: {0}")]
    ConfigFile(#[from] config::ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] nest_admin_storage::Error),
}

/// Convenience result type for application operations
pub type Result<T> = std::result::Result<T, Error>;
