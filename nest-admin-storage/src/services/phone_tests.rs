/// Tests for phone service
#[cfg(test)]
#[allow(clippy::module_inception)]
mod tests {
    use super::super::*;
    use crate::test_support::{memory_pool, seed_establishment};
    use nest_admin_core::pagination::ListingConfig;
    use nest_admin_core::primary::PrimaryFlagged;
    use nest_admin_core::ErrorKind;

    async fn setup_test_service() -> (PhoneService, EstablishmentId) {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let parent = seed_establishment(&mut conn, "Harbor View Inn").await;
        drop(conn);
        let service = PhoneService::new(ServiceContext::new(pool, ListingConfig::default()));
        (service, parent)
    }

    fn create(parent: EstablishmentId, number: &str, is_primary: bool) -> CreatePhone {
        CreatePhone {
            establishment_id: parent,
            phone_number: number.to_string(),
            is_primary,
        }
    }

    #[tokio::test]
    async fn test_phone_exists_query() {
        let (service, parent) = setup_test_service().await;
        let phone = service.create(create(parent, "(02) 8555-0101", true)).await.unwrap();

        let query = |excluded| PhoneExists {
            establishment_id: parent,
            phone_number: "02 8555 0101".to_string(),
            excluded,
        };
        assert!(service.exists(query(None)).await.unwrap());
        assert!(!service.exists(query(Some(phone.id()))).await.unwrap());

        let failure = service
            .exists(PhoneExists {
                establishment_id: parent,
                phone_number: "12".to_string(),
                excluded: None,
            })
            .await
            .unwrap_err();
        assert_eq!(failure.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_duplicate_digits_conflict() {
        let (service, parent) = setup_test_service().await;
        service.create(create(parent, "(02) 8555-0101", true)).await.unwrap();

        let failure = service
            .create(create(parent, "02.8555.0101", false))
            .await
            .unwrap_err();
        assert_eq!(failure.kind(), ErrorKind::Conflict);
        assert!(failure.has_code("EstablishmentPhone.AlreadyExists"));
    }

    #[tokio::test]
    async fn test_update_to_a_taken_number_leaves_flags_alone() {
        let (service, parent) = setup_test_service().await;
        let first = service.create(create(parent, "0917 555 0101", true)).await.unwrap();
        let second = service.create(create(parent, "0917 555 0102", false)).await.unwrap();

        let failure = service
            .update(UpdatePhone {
                id: second.id(),
                establishment_id: parent,
                phone_number: "0917 555 0101".to_string(),
                is_primary: true,
            })
            .await
            .unwrap_err();
        assert_eq!(failure.kind(), ErrorKind::Conflict);

        let first = service.get(GetPhone { id: first.id() }).await.unwrap();
        assert!(first.is_primary());
        let second = service.get(GetPhone { id: second.id() }).await.unwrap();
        assert!(!second.is_primary());
    }

    #[tokio::test]
    async fn test_demotion_is_allowed() {
        let (service, parent) = setup_test_service().await;
        let phone = service.create(create(parent, "0917 555 0101", true)).await.unwrap();

        let demoted = service
            .patch(PatchPhone {
                id: phone.id(),
                establishment_id: parent,
                phone_number: None,
                is_primary: Some(false),
            })
            .await
            .unwrap();
        assert!(!demoted.is_primary());
    }

    #[tokio::test]
    async fn test_delete_unknown_phone_is_not_found() {
        let (service, _) = setup_test_service().await;
        let failure = service
            .delete(DeletePhone {
                id: EstablishmentPhoneId::new(),
            })
            .await
            .unwrap_err();
        assert_eq!(failure.kind(), ErrorKind::NotFound);
        assert!(failure.has_code("EstablishmentPhone.NotFound"));
    }
}
