//! Primary-flag coordination for dependent records
//!
//! The coordinator runs on the handler's open transaction. Before a record
//! is written with `is_primary = true` it clears the flag of the current
//! primary sibling; before a record is deleted it refuses to remove the
//! primary while siblings remain. Clearing and writing share the
//! transaction, so a failed write rolls the demotion back with it.

use crate::repositories::DependentRepository;
use nest_admin_core::primary::{ensure_deletable, PrimaryFlagged, PrimaryState};
use nest_admin_core::Outcome;
use sqlx::SqliteConnection;
use tracing::debug;

/// Keeps at most one primary record per establishment for repository `R`
#[derive(Debug, Default, Clone, Copy)]
pub struct PrimaryCoordinator<R> {
    repository: R,
}

impl<R> PrimaryCoordinator<R>
where
    R: DependentRepository,
    R::Entity: PrimaryFlagged<Id = R::Id>,
{
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Current primary state of `record`'s parent
    async fn state(&self, conn: &mut SqliteConnection, record: &R::Entity) -> Outcome<PrimaryState<R::Id>> {
        let parent = record.parent_id();
        let primaries = self.repository.find_primaries(conn, parent).await?;
        PrimaryState::from_primary_ids(<R::Entity as PrimaryFlagged>::FAMILY, parent, &primaries)
    }

    /// Prepare the write of `record`, demoting the previous primary when
    /// `record` takes the flag
    pub async fn before_write(&self, conn: &mut SqliteConnection, record: &R::Entity) -> Outcome<()> {
        if !record.is_primary() {
            return Ok(());
        }
        let state = self.state(conn, record).await?;
        let (_, demoted) = state.promote(record.record_id());
        if let Some(previous) = demoted {
            debug!(
                "Demoting {} {} in favour of {}",
                <R::Entity as PrimaryFlagged>::FAMILY,
                previous,
                record.record_id()
            );
            self.repository
                .set_non_primary_except(conn, record.parent_id(), record.record_id())
                .await?;
        }
        Ok(())
    }

    /// Refuse to delete the primary record while it has siblings
    pub async fn before_delete(&self, conn: &mut SqliteConnection, record: &R::Entity) -> Outcome<()> {
        let siblings = self
            .repository
            .count_siblings(conn, record.parent_id(), record.record_id())
            .await?;
        ensure_deletable(record, siblings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{PhoneRepository, Repository};
    use crate::test_support::{memory_pool, seed_establishment};
    use nest_admin_core::phone::EstablishmentPhone;
    use nest_admin_core::values::PhoneNumber;
    use nest_admin_core::ErrorKind;

    #[tokio::test]
    async fn test_promotion_and_guarded_delete() {
        let pool = memory_pool().await;
        let mut tx = pool.begin().await.unwrap();
        let parent = seed_establishment(&mut tx, "Harbor Inn").await;
        let coordinator = PrimaryCoordinator::new(PhoneRepository);

        let first = EstablishmentPhone::create(parent, PhoneNumber::create("0917-555-0101").unwrap(), true);
        coordinator.before_write(&mut tx, &first).await.unwrap();
        PhoneRepository.add(&mut tx, &first).await.unwrap();

        let second = EstablishmentPhone::create(parent, PhoneNumber::create("0917-555-0102").unwrap(), true);
        coordinator.before_write(&mut tx, &second).await.unwrap();
        PhoneRepository.add(&mut tx, &second).await.unwrap();

        let first = PhoneRepository.get_by_id(&mut tx, first.id()).await.unwrap();
        assert!(!first.is_primary());

        let refused = coordinator.before_delete(&mut tx, &second).await.unwrap_err();
        assert_eq!(refused.kind(), ErrorKind::Validation);
        assert!(refused.has_code("EstablishmentPhone.DeletionNotAllowed"));
        assert!(coordinator.before_delete(&mut tx, &first).await.is_ok());

        PhoneRepository.delete(&mut tx, first.id()).await.unwrap();
        assert!(coordinator.before_delete(&mut tx, &second).await.is_ok());
        tx.commit().await.unwrap();
    }
}
