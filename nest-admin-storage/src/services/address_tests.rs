/// Tests for address service
#[cfg(test)]
#[allow(clippy::module_inception)]
mod tests {
    use super::super::*;
    use crate::test_support::{file_pool, memory_pool, seed_establishment};
    use nest_admin_core::pagination::ListingConfig;
    use nest_admin_core::primary::PrimaryFlagged;
    use nest_admin_core::ErrorKind;
    use std::sync::Arc;

    async fn setup_test_service() -> (AddressService, EstablishmentId) {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let parent = seed_establishment(&mut conn, "Harbor View Inn").await;
        drop(conn);
        let service = AddressService::new(ServiceContext::new(pool, ListingConfig::default()));
        (service, parent)
    }

    fn fields(city: &str, latitude: f64, longitude: f64) -> AddressFields {
        AddressFields {
            address_line: "1 Pier Road".into(),
            municipality: "Port Area".into(),
            city: city.into(),
            province: "Metro Manila".into(),
            region: "NCR".into(),
            country: "Philippines".into(),
            latitude,
            longitude,
        }
    }

    fn create(parent: EstablishmentId, latitude: f64, longitude: f64, is_primary: bool) -> CreateAddress {
        CreateAddress {
            establishment_id: parent,
            address: fields("Manila", latitude, longitude),
            is_primary,
        }
    }

    #[tokio::test]
    async fn test_promotion_scenario() {
        let (service, parent) = setup_test_service().await;

        let a = service.create(create(parent, 10.0, 20.0, true)).await.unwrap();
        assert!(a.is_primary());

        let failure = service
            .create(create(parent, 10.0, 20.0, false))
            .await
            .unwrap_err();
        assert_eq!(failure.kind(), ErrorKind::Conflict);
        assert!(failure.has_code("EstablishmentAddress.AlreadyExists"));

        let c = service.create(create(parent, 30.0, 40.0, true)).await.unwrap();
        assert!(c.is_primary());

        let a = service.get(GetAddress { id: a.id() }).await.unwrap();
        assert!(!a.is_primary());

        let primaries = service
            .count(CountAddresses {
                filter: AddressFilter {
                    establishment_id: Some(parent),
                    is_primary: Some(true),
                    ..AddressFilter::default()
                },
            })
            .await
            .unwrap();
        assert_eq!(primaries, 1);
    }

    #[tokio::test]
    async fn test_primary_delete_requires_demotion() {
        let (service, parent) = setup_test_service().await;
        let primary = service.create(create(parent, 10.0, 20.0, true)).await.unwrap();
        let other = service.create(create(parent, 30.0, 40.0, false)).await.unwrap();

        let failure = service
            .delete(DeleteAddress { id: primary.id() })
            .await
            .unwrap_err();
        assert_eq!(failure.kind(), ErrorKind::Validation);
        assert!(failure.has_code("EstablishmentAddress.DeletionNotAllowed"));

        service
            .patch(PatchAddress {
                id: other.id(),
                establishment_id: parent,
                patch: AddressPatch::default(),
                is_primary: Some(true),
            })
            .await
            .unwrap();
        service.delete(DeleteAddress { id: primary.id() }).await.unwrap();

        // The last remaining address may go even though it is primary
        service.delete(DeleteAddress { id: other.id() }).await.unwrap();
        let remaining = service
            .count(CountAddresses::default())
            .await
            .unwrap();
        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    async fn test_unknown_establishment_is_not_found() {
        let (service, _) = setup_test_service().await;
        let failure = service
            .create(create(EstablishmentId::new(), 10.0, 20.0, true))
            .await
            .unwrap_err();
        assert_eq!(failure.kind(), ErrorKind::NotFound);
        assert!(failure.has_code("Establishment.NotFound"));
    }

    #[tokio::test]
    async fn test_invalid_fields_are_reported_together() {
        let (service, parent) = setup_test_service().await;
        let mut command = create(parent, 95.0, 20.0, false);
        command.address.city = String::new();

        let failure = service.create(command).await.unwrap_err();
        assert_eq!(failure.kind(), ErrorKind::Validation);
        assert!(failure.errors().len() >= 2);
    }

    #[tokio::test]
    async fn test_update_under_other_establishment_is_unauthorized() {
        let (service, parent) = setup_test_service().await;
        let address = service.create(create(parent, 10.0, 20.0, true)).await.unwrap();

        let failure = service
            .update(UpdateAddress {
                id: address.id(),
                establishment_id: EstablishmentId::new(),
                address: fields("Makati", 10.0, 20.0),
                is_primary: true,
            })
            .await
            .unwrap_err();
        assert_eq!(failure.kind(), ErrorKind::Unauthorized);
        assert!(failure.has_code("EstablishmentAddress.ParentMismatch"));

        let stored = service.get(GetAddress { id: address.id() }).await.unwrap();
        assert_eq!(stored.address().city(), "Manila");
    }

    #[tokio::test]
    async fn test_self_update_is_not_a_conflict() {
        let (service, parent) = setup_test_service().await;
        let address = service.create(create(parent, 10.0, 20.0, true)).await.unwrap();

        let unchanged = service
            .update(UpdateAddress {
                id: address.id(),
                establishment_id: parent,
                address: fields("Manila", 10.0, 20.0),
                is_primary: true,
            })
            .await
            .unwrap();
        assert_eq!(unchanged, address);

        let moved = service
            .update(UpdateAddress {
                id: address.id(),
                establishment_id: parent,
                address: fields("Makati", 10.0, 20.0),
                is_primary: true,
            })
            .await
            .unwrap();
        assert_eq!(moved.address().city(), "Makati");
    }

    #[tokio::test]
    async fn test_patch_keeps_unspecified_fields() {
        let (service, parent) = setup_test_service().await;
        let address = service.create(create(parent, 10.0, 20.0, false)).await.unwrap();

        let patched = service
            .patch(PatchAddress {
                id: address.id(),
                establishment_id: parent,
                patch: AddressPatch {
                    city: Some("Pasay".into()),
                    ..AddressPatch::default()
                },
                is_primary: None,
            })
            .await
            .unwrap();
        assert_eq!(patched.address().city(), "Pasay");
        assert_eq!(patched.address().coordinates(), address.address().coordinates());
        assert!(!patched.is_primary());
    }

    #[tokio::test]
    async fn test_list_filters_by_city() {
        let (service, parent) = setup_test_service().await;
        service.create(create(parent, 10.0, 20.0, true)).await.unwrap();
        service
            .create(CreateAddress {
                establishment_id: parent,
                address: fields("Cebu City", 10.3, 123.9),
                is_primary: false,
            })
            .await
            .unwrap();

        let page = service
            .list(ListAddresses {
                filter: AddressFilter {
                    city: Some("cebu".into()),
                    ..AddressFilter::default()
                },
                page: PageRequest::new(1, 10),
            })
            .await
            .unwrap();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.items[0].address().city(), "Cebu City");
    }

    #[tokio::test]
    async fn test_concurrent_promotions_leave_one_primary() {
        let (pool, _temp_file) = file_pool(4).await;
        let mut conn = pool.acquire().await.unwrap();
        let parent = seed_establishment(&mut conn, "Harbor View Inn").await;
        drop(conn);
        let service = Arc::new(AddressService::new(ServiceContext::new(
            pool,
            ListingConfig::default(),
        )));

        let mut tasks = Vec::new();
        for i in 0..8 {
            let service = Arc::clone(&service);
            tasks.push(tokio::spawn(async move {
                service
                    .create(create(parent, f64::from(i), f64::from(i) * 2.0, true))
                    .await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let page = service
            .list(ListAddresses {
                filter: AddressFilter {
                    establishment_id: Some(parent),
                    ..AddressFilter::default()
                },
                page: PageRequest::new(1, 20),
            })
            .await
            .unwrap();
        assert_eq!(page.total_count, 8);
        assert_eq!(page.items.iter().filter(|a| a.is_primary()).count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_writes_across_establishments() {
        let (pool, _temp_file) = file_pool(4).await;
        let mut conn = pool.acquire().await.unwrap();
        let mut parents = Vec::new();
        for name in ["Harbor View Inn", "Hillside Lodge", "Bayside Hotel", "Riverbend Suites"] {
            parents.push(seed_establishment(&mut conn, name).await);
        }
        drop(conn);
        let service = Arc::new(AddressService::new(ServiceContext::new(
            pool,
            ListingConfig::default(),
        )));

        let mut tasks = Vec::new();
        for i in 0..16u32 {
            let service = Arc::clone(&service);
            let parent = parents[i as usize % parents.len()];
            let offset = f64::from(i);
            tasks.push(tokio::spawn(async move {
                service.create(create(parent, offset, offset + 1.0, true)).await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        for parent in parents {
            let page = service
                .list(ListAddresses {
                    filter: AddressFilter {
                        establishment_id: Some(parent),
                        ..AddressFilter::default()
                    },
                    page: PageRequest::new(1, 20),
                })
                .await
                .unwrap();
            assert_eq!(page.total_count, 4);
            assert_eq!(page.items.iter().filter(|a| a.is_primary()).count(), 1);
        }
    }
}
