/// Tests for establishment repository
#[cfg(test)]
#[allow(clippy::module_inception)]
mod tests {
    use super::super::*;
    use crate::repositories::Repository;
    use crate::test_support::memory_pool;
    use nest_admin_core::establishment::{EstablishmentField, EstablishmentFilter};
    use nest_admin_core::specification::{SortDir, Specification};
    use nest_admin_core::ErrorKind;

    fn establishment(name: &str, email: &str) -> Establishment {
        Establishment::create(
            EstablishmentName::create(name).unwrap(),
            EmailAddress::create(email).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_establishment_add_and_get() {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let repo = EstablishmentRepository;

        let harbor = establishment("Harbor Inn", "desk@harbor.example");
        repo.add(&mut conn, &harbor).await.expect("Failed to add establishment");

        let found = repo.get_by_id(&mut conn, harbor.id()).await.unwrap();
        assert_eq!(found, harbor);
        assert!(repo.exists(&mut conn, harbor.id()).await.unwrap());

        let missing = repo.get_by_id(&mut conn, EstablishmentId::new()).await.unwrap_err();
        assert_eq!(missing.kind(), ErrorKind::NotFound);
        assert!(missing.has_code("Establishment.NotFound"));
    }

    #[tokio::test]
    async fn test_establishment_update_and_delete() {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let repo = EstablishmentRepository;

        let harbor = establishment("Harbor Inn", "desk@harbor.example");
        repo.add(&mut conn, &harbor).await.unwrap();

        let active = harbor
            .with_status(EstablishmentStatus::Active)
            .unwrap()
            .with_name(EstablishmentName::create("Harbor Inn & Suites").unwrap());
        repo.update(&mut conn, &active).await.unwrap();
        let found = repo.get_by_id(&mut conn, active.id()).await.unwrap();
        assert_eq!(found.status(), EstablishmentStatus::Active);
        assert_eq!(found.name().as_str(), "Harbor Inn & Suites");

        repo.delete(&mut conn, active.id()).await.unwrap();
        let again = repo.delete(&mut conn, active.id()).await.unwrap_err();
        assert_eq!(again.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_duplicate_natural_key_is_conflict() {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let repo = EstablishmentRepository;

        repo.add(&mut conn, &establishment("Harbor Inn", "desk@harbor.example"))
            .await
            .unwrap();
        let failure = repo
            .add(&mut conn, &establishment("HARBOR INN", "desk@harbor.example"))
            .await
            .unwrap_err();
        assert_eq!(failure.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_list_and_count_share_criteria() {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let repo = EstablishmentRepository;

        for (name, email) in [
            ("Harbor Inn", "a@harbor.example"),
            ("Hill Inn", "b@hill.example"),
            ("Seaside Lodge", "c@seaside.example"),
            ("Old Mill Inn", "d@mill.example"),
        ] {
            repo.add(&mut conn, &establishment(name, email)).await.unwrap();
        }

        let filter = EstablishmentFilter {
            name: Some("INN".to_string()),
            ..Default::default()
        };
        let spec = Specification::<Establishment>::new(filter.criteria())
            .ordered_by(EstablishmentField::Name, SortDir::Asc)
            .with_paging(1, 2)
            .unwrap();

        let page = repo.list(&mut conn, &spec).await.unwrap();
        let names: Vec<_> = page.iter().map(|e| e.name().as_str()).collect();
        assert_eq!(names, vec!["Harbor Inn", "Hill Inn"]);
        assert_eq!(repo.count(&mut conn, &spec.without_paging()).await.unwrap(), 3);

        let last = repo
            .list(&mut conn, &spec.clone().with_paging(2, 2).unwrap())
            .await
            .unwrap();
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].name().as_str(), "Old Mill Inn");
    }
}
