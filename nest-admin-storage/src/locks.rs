//! Per-establishment write locks
//!
//! Handlers that touch the dependent collections of one establishment take
//! its lock before opening their transaction, so two promotions for the same
//! parent run one after the other instead of racing for SQLite's write lock.

use dashmap::DashMap;
use nest_admin_core::ids::EstablishmentId;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::trace;

/// Async mutex per establishment, created on first use
#[derive(Debug, Default)]
pub struct ParentLocks {
    locks: DashMap<EstablishmentId, Arc<Mutex<()>>>,
}

impl ParentLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to the establishment's dependents
    pub async fn acquire(&self, establishment_id: EstablishmentId) -> OwnedMutexGuard<()> {
        let lock = self.locks.entry(establishment_id).or_default().clone();
        trace!("Waiting for lock on establishment {}", establishment_id);
        lock.lock_owned().await
    }

    /// Drop the lock of a deleted establishment
    pub fn forget(&self, establishment_id: EstablishmentId) {
        self.locks.remove(&establishment_id);
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
