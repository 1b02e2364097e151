//! Persistence layer for Nest Admin
//!
//! This crate provides SQLite repositories, the primary-record coordinator,
//! uniqueness checks and the command handlers that operate on establishments
//! and their dependent records. Every handler is reachable through the
//! typed [`dispatcher::Dispatcher`] built by [`StorageManager`].

#[macro_use]
pub mod dispatcher;

pub mod error;
pub mod locks;
pub mod manager;
pub mod migrations;
pub mod primary;
pub mod query;
pub mod repositories;
pub mod services;
pub mod uniqueness;

#[cfg(test)]
mod test_support;

pub use dispatcher::Dispatcher;
pub use error::{Error, Result};
pub use manager::{DatabaseConfig, StorageManager};

/// Re-export core types for convenience
pub use nest_admin_core as core;
