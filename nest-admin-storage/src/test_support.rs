//! Shared fixtures for storage tests

use crate::manager::connect_options;
use crate::migrations::Migrations;
use crate::repositories::{EmployeeRepository, EstablishmentRepository, Repository, RoleRepository};
use nest_admin_core::employee::Employee;
use nest_admin_core::establishment::Establishment;
use nest_admin_core::ids::{EmployeeRoleId, EstablishmentId};
use nest_admin_core::role::EmployeeRole;
use nest_admin_core::values::{EmailAddress, EmployeeNumber, EstablishmentName, PersonName, RoleName};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{SqliteConnection, SqlitePool};
use tempfile::NamedTempFile;

/// Migrated in-memory database behind a single connection
pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to connect to test database");
    Migrations::run(&pool).await.expect("Failed to run migrations");
    pool
}

/// Migrated file database that several connections can share
pub async fn file_pool(max_connections: u32) -> (SqlitePool, NamedTempFile) {
    let temp_file = NamedTempFile::new().expect("Failed to create temp file");
    let database_url = format!("sqlite://{}", temp_file.path().display());
    let options = connect_options(&database_url).expect("Invalid test database url");
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .expect("Failed to connect to test database");
    Migrations::run(&pool).await.expect("Failed to run migrations");
    (pool, temp_file)
}

pub async fn seed_establishment(conn: &mut SqliteConnection, name: &str) -> EstablishmentId {
    let email = format!("{}@example.com", name.to_lowercase().replace(' ', "."));
    let establishment = Establishment::create(
        EstablishmentName::create(name).unwrap(),
        EmailAddress::create(&email).unwrap(),
    );
    EstablishmentRepository
        .add(conn, &establishment)
        .await
        .expect("Failed to seed establishment");
    establishment.id()
}

pub async fn seed_role(conn: &mut SqliteConnection, name: &str) -> EmployeeRoleId {
    let role = EmployeeRole::create(RoleName::create(name).unwrap());
    RoleRepository.add(conn, &role).await.expect("Failed to seed role");
    role.id()
}

pub async fn seed_employee(
    conn: &mut SqliteConnection,
    number: &str,
    role_id: EmployeeRoleId,
    establishment_id: EstablishmentId,
) -> Employee {
    let employee = Employee::create(
        EmployeeNumber::create(number).unwrap(),
        PersonName::create("Ana", None, "Reyes").unwrap(),
        EmailAddress::create(&format!("{}@example.com", number.to_lowercase())).unwrap(),
        role_id,
        establishment_id,
    );
    EmployeeRepository
        .add(conn, &employee)
        .await
        .expect("Failed to seed employee");
    employee
}
