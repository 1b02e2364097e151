/// Tests for contact service
#[cfg(test)]
#[allow(clippy::module_inception)]
mod tests {
    use super::super::*;
    use crate::test_support::{memory_pool, seed_establishment};
    use nest_admin_core::contact::ContactFilter;
    use nest_admin_core::pagination::ListingConfig;
    use nest_admin_core::primary::PrimaryFlagged;
    use nest_admin_core::ErrorKind;

    async fn setup_test_service() -> (ContactService, EstablishmentId, EstablishmentId) {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let parent = seed_establishment(&mut conn, "Harbor View Inn").await;
        let other = seed_establishment(&mut conn, "Hillside Lodge").await;
        drop(conn);
        let service = ContactService::new(ServiceContext::new(pool, ListingConfig::default()));
        (service, parent, other)
    }

    fn create(parent: EstablishmentId, first: &str, phone: &str, is_primary: bool) -> CreateContact {
        CreateContact {
            establishment_id: parent,
            first_name: first.to_string(),
            middle_name: Some("Luz".to_string()),
            last_name: "Santos".to_string(),
            phone_number: phone.to_string(),
            is_primary,
        }
    }

    #[tokio::test]
    async fn test_duplicate_ignores_case_and_formatting() {
        let (service, parent, other) = setup_test_service().await;
        service
            .create(create(parent, "Maria", "0917 555 0101", true))
            .await
            .unwrap();

        let failure = service
            .create(create(parent, "MARIA", "0917-555-0101", false))
            .await
            .unwrap_err();
        assert_eq!(failure.kind(), ErrorKind::Conflict);
        assert!(failure.has_code("EstablishmentContact.AlreadyExists"));

        // Another establishment may list the same person
        assert!(service
            .create(create(other, "Maria", "0917 555 0101", true))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_patch_under_other_establishment_is_unauthorized() {
        let (service, parent, other) = setup_test_service().await;
        let contact = service
            .create(create(parent, "Maria", "0917 555 0101", true))
            .await
            .unwrap();

        let failure = service
            .patch(PatchContact {
                id: contact.id(),
                establishment_id: other,
                first_name: Some("Mara".to_string()),
                middle_name: None,
                last_name: None,
                phone_number: None,
                is_primary: None,
            })
            .await
            .unwrap_err();
        assert_eq!(failure.kind(), ErrorKind::Unauthorized);
        assert!(failure.has_code("EstablishmentContact.ParentMismatch"));
    }

    #[tokio::test]
    async fn test_update_promotes_and_demotes() {
        let (service, parent, _) = setup_test_service().await;
        let first = service
            .create(create(parent, "Maria", "0917 555 0101", true))
            .await
            .unwrap();
        let second = service
            .create(create(parent, "Jose", "0917 555 0102", false))
            .await
            .unwrap();

        let promoted = service
            .update(UpdateContact {
                id: second.id(),
                establishment_id: parent,
                first_name: "Jose".to_string(),
                middle_name: Some("Luz".to_string()),
                last_name: "Santos".to_string(),
                phone_number: "0917 555 0102".to_string(),
                is_primary: true,
            })
            .await
            .unwrap();
        assert!(promoted.is_primary());

        let first = service.get(GetContact { id: first.id() }).await.unwrap();
        assert!(!first.is_primary());
    }

    #[tokio::test]
    async fn test_patch_with_same_values_is_a_no_op() {
        let (service, parent, _) = setup_test_service().await;
        let contact = service
            .create(create(parent, "Maria", "0917 555 0101", true))
            .await
            .unwrap();

        let patched = service
            .patch(PatchContact {
                id: contact.id(),
                establishment_id: parent,
                first_name: Some("Maria".to_string()),
                middle_name: None,
                last_name: None,
                phone_number: Some("0917-555-0101".to_string()),
                is_primary: Some(true),
            })
            .await
            .unwrap();
        assert_eq!(patched, contact);
    }

    #[tokio::test]
    async fn test_list_by_name() {
        let (service, parent, _) = setup_test_service().await;
        service
            .create(create(parent, "Maria", "0917 555 0101", true))
            .await
            .unwrap();
        service
            .create(create(parent, "Jose", "0917 555 0102", false))
            .await
            .unwrap();

        let page = service
            .list(ListContacts {
                filter: ContactFilter {
                    name: Some("jos".to_string()),
                    ..ContactFilter::default()
                },
                page: PageRequest::default(),
            })
            .await
            .unwrap();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.items[0].person().first(), "Jose");
    }
}
