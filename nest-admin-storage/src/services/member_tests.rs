/// Tests for member service
#[cfg(test)]
#[allow(clippy::module_inception)]
mod tests {
    use super::super::*;
    use crate::test_support::{memory_pool, seed_employee, seed_establishment, seed_role};
    use nest_admin_core::employee::Employee;
    use nest_admin_core::pagination::ListingConfig;
    use nest_admin_core::ErrorKind;

    struct Fixture {
        service: MemberService,
        establishment: EstablishmentId,
        employee: Employee,
        colleague: Employee,
        outsider: Employee,
    }

    async fn setup_test_service() -> Fixture {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let establishment = seed_establishment(&mut conn, "Harbor View Inn").await;
        let elsewhere = seed_establishment(&mut conn, "Hillside Lodge").await;
        let role = seed_role(&mut conn, "Front Desk").await;
        let employee = seed_employee(&mut conn, "EMP-001", role, establishment).await;
        let colleague = seed_employee(&mut conn, "EMP-002", role, establishment).await;
        let outsider = seed_employee(&mut conn, "EMP-003", role, elsewhere).await;
        drop(conn);
        Fixture {
            service: MemberService::new(ServiceContext::new(pool, ListingConfig::default())),
            establishment,
            employee,
            colleague,
            outsider,
        }
    }

    fn create(establishment: EstablishmentId, employee: &Employee) -> CreateMember {
        CreateMember {
            establishment_id: establishment,
            employee_id: employee.id(),
            title: "Night Manager".to_string(),
            description: String::new(),
            tag: "night-shift".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_exists_for_employee() {
        let fixture = setup_test_service().await;
        let member = fixture
            .service
            .create(create(fixture.establishment, &fixture.employee))
            .await
            .unwrap();
        assert_eq!(member.employee_id(), fixture.employee.id());

        let query = MemberExistsForEmployee {
            establishment_id: fixture.establishment,
            employee_id: fixture.employee.id(),
            excluded: None,
        };
        assert!(fixture.service.exists_for_employee(query).await.unwrap());
        assert!(!fixture
            .service
            .exists_for_employee(MemberExistsForEmployee {
                excluded: Some(member.id()),
                ..query
            })
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_employee_of_other_establishment_is_rejected() {
        let fixture = setup_test_service().await;
        let failure = fixture
            .service
            .create(create(fixture.establishment, &fixture.outsider))
            .await
            .unwrap_err();
        assert_eq!(failure.kind(), ErrorKind::Validation);
        assert!(failure.has_code("EstablishmentMember.EmployeeNotInEstablishment"));
    }

    #[tokio::test]
    async fn test_second_membership_conflicts() {
        let fixture = setup_test_service().await;
        fixture
            .service
            .create(create(fixture.establishment, &fixture.employee))
            .await
            .unwrap();

        let failure = fixture
            .service
            .create(create(fixture.establishment, &fixture.employee))
            .await
            .unwrap_err();
        assert_eq!(failure.kind(), ErrorKind::Conflict);
        assert!(failure.has_code("EstablishmentMember.AlreadyExists"));
    }

    #[tokio::test]
    async fn test_invalid_fields_are_combined() {
        let fixture = setup_test_service().await;
        let mut command = create(fixture.establishment, &fixture.employee);
        command.title = String::new();
        command.tag = "two words".to_string();

        let failure = fixture.service.create(command).await.unwrap_err();
        assert_eq!(failure.kind(), ErrorKind::Validation);
        assert!(failure.errors().len() >= 2);
    }

    #[tokio::test]
    async fn test_patch_reassigns_employee() {
        let fixture = setup_test_service().await;
        let member = fixture
            .service
            .create(create(fixture.establishment, &fixture.employee))
            .await
            .unwrap();

        let patched = fixture
            .service
            .patch(PatchMember {
                id: member.id(),
                establishment_id: fixture.establishment,
                employee_id: Some(fixture.colleague.id()),
                title: None,
                description: Some("Covers weekends".to_string()),
                tag: None,
            })
            .await
            .unwrap();
        assert_eq!(patched.employee_id(), fixture.colleague.id());
        assert_eq!(patched.description().as_str(), "Covers weekends");
        assert_eq!(patched.title().as_str(), "Night Manager");

        let failure = fixture
            .service
            .patch(PatchMember {
                id: member.id(),
                establishment_id: fixture.establishment,
                employee_id: Some(fixture.outsider.id()),
                title: None,
                description: None,
                tag: None,
            })
            .await
            .unwrap_err();
        assert_eq!(failure.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_list_by_tag() {
        let fixture = setup_test_service().await;
        fixture
            .service
            .create(create(fixture.establishment, &fixture.employee))
            .await
            .unwrap();
        let mut day = create(fixture.establishment, &fixture.colleague);
        day.tag = "day-shift".to_string();
        fixture.service.create(day).await.unwrap();

        let page = fixture
            .service
            .list(ListMembers {
                filter: MemberFilter {
                    tag: Some("night-shift".to_string()),
                    ..MemberFilter::default()
                },
                page: PageRequest::default(),
            })
            .await
            .unwrap();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.items[0].employee_id(), fixture.employee.id());

        let all = fixture
            .service
            .count(CountMembers {
                filter: MemberFilter {
                    establishment_id: Some(fixture.establishment),
                    ..MemberFilter::default()
                },
            })
            .await
            .unwrap();
        assert_eq!(all, 2);
    }
}
