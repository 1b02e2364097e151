//! Error types for storage operations

use nest_admin_core::{ErrorKind, Failure};
use thiserror::Error;

/// Storage layer error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Corrupt {entity} row: {message}")]
    Corrupt { entity: String, message: String },

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

/// Convenience result type for storage operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Classify a raw driver error, separating constraint violations
    pub fn from_sqlx(error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::Database(db)
                if db.is_unique_violation() || db.is_foreign_key_violation() =>
            {
                Error::ConstraintViolation(db.message().to_string())
            }
            _ => Error::Database(error),
        }
    }

    pub fn corrupt(entity: &str, message: impl Into<String>) -> Self {
        Error::Corrupt {
            entity: entity.to_string(),
            message: message.into(),
        }
    }
}

impl From<Error> for Failure {
    fn from(error: Error) -> Self {
        match error {
            Error::ConstraintViolation(message) => {
                Failure::conflict("Persistence.ConstraintViolation", message)
            }
            Error::Database(e) => Failure::unexpected("Persistence.Database", e.to_string()),
            Error::Migration(message) => Failure::unexpected("Persistence.Migration", message),
            Error::Configuration(message) => {
                Failure::unexpected("Persistence.Configuration", message)
            }
            Error::Corrupt { entity, message } => Failure::new(
                ErrorKind::Unexpected,
                nest_admin_core::Error::new(format!("{entity}.Corrupt"), message),
            ),
        }
    }
}

/// Convert a driver error straight into a domain failure
pub(crate) fn db(error: sqlx::Error) -> Failure {
    Error::from_sqlx(error).into()
}
