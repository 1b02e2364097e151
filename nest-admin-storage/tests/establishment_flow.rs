//! End-to-end flows through the storage manager's dispatcher

use nest_admin_core::pagination::{ListingConfig, PageRequest};
use nest_admin_core::phone::PhoneFilter;
use nest_admin_core::primary::PrimaryFlagged;
use nest_admin_core::ErrorKind;
use nest_admin_storage::services::employee::{CreateEmployee, DeleteEmployee};
use nest_admin_storage::services::establishment::{
    CreateEstablishment, DeleteEstablishment, GetEstablishment,
};
use nest_admin_storage::services::member::{CreateMember, MemberExistsForEmployee};
use nest_admin_storage::services::phone::{CreatePhone, DeletePhone, ListPhones, PhoneExists};
use nest_admin_storage::services::role::CreateRole;
use nest_admin_storage::{DatabaseConfig, StorageManager};
use tempfile::NamedTempFile;

async fn setup_manager() -> (StorageManager, NamedTempFile) {
    let temp_file = NamedTempFile::new().expect("Failed to create temp file");
    let config = DatabaseConfig {
        url: format!("sqlite://{}", temp_file.path().display()),
        max_connections: 4,
        migrate_on_startup: true,
    };
    let manager = StorageManager::new(&config, ListingConfig::default())
        .await
        .expect("Failed to create storage manager");
    (manager, temp_file)
}

#[tokio::test]
async fn test_establishment_lifecycle_through_dispatcher() {
    let (manager, _temp_file) = setup_manager().await;
    let dispatcher = manager.dispatcher();

    let establishment = dispatcher
        .send(CreateEstablishment {
            name: "Harbor View Inn".to_string(),
            email: "desk@harborview.ph".to_string(),
        })
        .await
        .unwrap();
    let role = dispatcher
        .send(CreateRole {
            role_name: "Night Auditor".to_string(),
        })
        .await
        .unwrap();

    // Second primary phone takes the flag from the first
    let first = dispatcher
        .send(CreatePhone {
            establishment_id: establishment.id(),
            phone_number: "+63 2 8123 4567".to_string(),
            is_primary: true,
        })
        .await
        .unwrap();
    let second = dispatcher
        .send(CreatePhone {
            establishment_id: establishment.id(),
            phone_number: "(02) 8765-4321".to_string(),
            is_primary: true,
        })
        .await
        .unwrap();

    let primaries = dispatcher
        .send(ListPhones {
            filter: PhoneFilter {
                establishment_id: Some(establishment.id()),
                is_primary: Some(true),
                ..PhoneFilter::default()
            },
            page: PageRequest::default(),
        })
        .await
        .unwrap();
    assert_eq!(primaries.total_count, 1);
    assert_eq!(primaries.items[0].id(), second.id());
    assert!(primaries.items[0].is_primary());

    assert!(dispatcher
        .send(PhoneExists {
            establishment_id: establishment.id(),
            phone_number: "63-2-8123-4567".to_string(),
            excluded: None,
        })
        .await
        .unwrap());

    let employee = dispatcher
        .send(CreateEmployee {
            employee_number: "emp-100".to_string(),
            first_name: "Maria".to_string(),
            middle_name: None,
            last_name: "Santos".to_string(),
            email: "maria.santos@harborview.ph".to_string(),
            role_id: role.id(),
            establishment_id: establishment.id(),
        })
        .await
        .unwrap();
    dispatcher
        .send(CreateMember {
            establishment_id: establishment.id(),
            employee_id: employee.id(),
            title: "Night Manager".to_string(),
            description: String::new(),
            tag: "night-shift".to_string(),
        })
        .await
        .unwrap();

    let refused = dispatcher
        .send(DeleteEstablishment {
            id: establishment.id(),
        })
        .await
        .unwrap_err();
    assert_eq!(refused.kind(), ErrorKind::Conflict);
    assert!(refused.has_code("Establishment.HasEmployees"));

    dispatcher
        .send(DeleteEmployee { id: employee.id() })
        .await
        .unwrap();
    assert!(!dispatcher
        .send(MemberExistsForEmployee {
            establishment_id: establishment.id(),
            employee_id: employee.id(),
            excluded: None,
        })
        .await
        .unwrap());

    // The non-primary phone can go; the establishment takes the rest with it
    dispatcher
        .send(DeletePhone { id: first.id() })
        .await
        .unwrap();
    dispatcher
        .send(DeleteEstablishment {
            id: establishment.id(),
        })
        .await
        .unwrap();

    let failure = dispatcher
        .send(GetEstablishment {
            id: establishment.id(),
        })
        .await
        .unwrap_err();
    assert_eq!(failure.kind(), ErrorKind::NotFound);

    let stats = manager.stats().await.unwrap();
    assert_eq!(stats.establishments_count, 0);
    assert_eq!(stats.phones_count, 0);
    assert_eq!(stats.members_count, 0);
    assert_eq!(stats.roles_count, 1);
}
