/// Tests for the primary-flag helpers, run on the phone table
#[cfg(test)]
#[allow(clippy::module_inception)]
mod tests {
    use super::super::*;
    use crate::repositories::{EstablishmentRepository, Repository};
    use crate::test_support::{memory_pool, seed_establishment};
    use nest_admin_core::ids::EstablishmentId;
    use nest_admin_core::ErrorKind;

    fn phone(parent: EstablishmentId, number: &str, primary: bool) -> EstablishmentPhone {
        EstablishmentPhone::create(parent, PhoneNumber::create(number).unwrap(), primary)
    }

    #[tokio::test]
    async fn test_set_non_primary_except() {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let parent = seed_establishment(&mut conn, "Harbor Inn").await;
        let repo = PhoneRepository;

        let first = phone(parent, "+63 2 8123 4567", true);
        let second = phone(parent, "0917-555-0101", false);
        repo.add(&mut conn, &first).await.unwrap();
        repo.add(&mut conn, &second).await.unwrap();
        assert_eq!(repo.find_primaries(&mut conn, parent).await.unwrap(), vec![first.id()]);

        let cleared = repo.set_non_primary_except(&mut conn, parent, second.id()).await.unwrap();
        assert_eq!(cleared, 1);
        repo.update(&mut conn, &second.clone().with_primary(true)).await.unwrap();
        assert_eq!(repo.find_primaries(&mut conn, parent).await.unwrap(), vec![second.id()]);
        assert_eq!(repo.count_siblings(&mut conn, parent, second.id()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_second_primary_is_rejected_by_schema() {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let parent = seed_establishment(&mut conn, "Harbor Inn").await;
        let repo = PhoneRepository;

        repo.add(&mut conn, &phone(parent, "0917-555-0101", true)).await.unwrap();
        let failure = repo
            .add(&mut conn, &phone(parent, "0917-555-0102", true))
            .await
            .unwrap_err();
        assert_eq!(failure.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_phones_cascade_with_establishment() {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let parent = seed_establishment(&mut conn, "Harbor Inn").await;
        let repo = PhoneRepository;
        let line = phone(parent, "0917-555-0101", true);
        repo.add(&mut conn, &line).await.unwrap();

        EstablishmentRepository.delete(&mut conn, parent).await.unwrap();
        assert!(!repo.exists(&mut conn, line.id()).await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_parent_is_conflict() {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let failure = PhoneRepository
            .add(&mut conn, &phone(EstablishmentId::new(), "0917-555-0101", false))
            .await
            .unwrap_err();
        assert_eq!(failure.kind(), ErrorKind::Conflict);
    }
}
