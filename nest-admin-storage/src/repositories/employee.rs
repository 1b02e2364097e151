//! Employee repository implementation

use super::{id_column, optional_text, stored, Repository};
use crate::error::db;
use crate::Result;
use async_trait::async_trait;
use nest_admin_core::employee::{Employee, EmployeeStatus};
use nest_admin_core::ids::EmployeeId;
use nest_admin_core::values::{EmailAddress, EmployeeNumber, PersonName};
use nest_admin_core::Outcome;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use tracing::{debug, info};

const ENTITY: &str = "Employee";

/// Repository for employee entities
#[derive(Debug, Default, Clone, Copy)]
pub struct EmployeeRepository;

#[async_trait]
impl Repository for EmployeeRepository {
    type Entity = Employee;
    type Id = EmployeeId;

    const TABLE: &'static str = "employees";
    const COLUMNS: &'static str = "id, employee_number, first_name, middle_name, last_name, \
                                   email, role_id, establishment_id, status";

    fn from_row(row: &SqliteRow) -> Result<Employee> {
        let number: String = row.try_get("employee_number")?;
        let first: String = row.try_get("first_name")?;
        let middle = optional_text(row.try_get("middle_name")?);
        let last: String = row.try_get("last_name")?;
        let email: String = row.try_get("email")?;
        let status: i32 = row.try_get("status")?;
        Ok(Employee::restore(
            id_column(row, ENTITY, "id")?,
            stored(ENTITY, EmployeeNumber::create(&number))?,
            stored(ENTITY, PersonName::create(&first, middle.as_deref(), &last))?,
            stored(ENTITY, EmailAddress::create(&email))?,
            id_column(row, ENTITY, "role_id")?,
            id_column(row, ENTITY, "establishment_id")?,
            stored(ENTITY, EmployeeStatus::from_id(status))?,
        ))
    }

    async fn add(&self, conn: &mut SqliteConnection, entity: &Employee) -> Outcome<()> {
        debug!("Creating employee: {} ({})", entity.employee_number(), entity.id());
        let name = entity.name();
        sqlx::query(
            r#"
            INSERT INTO employees (
                id, employee_number, first_name, middle_name, last_name,
                email, role_id, establishment_id, status
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(entity.id().to_string())
        .bind(entity.employee_number().as_str())
        .bind(name.first())
        .bind(name.middle().unwrap_or_default())
        .bind(name.last())
        .bind(entity.email().as_str())
        .bind(entity.role_id().to_string())
        .bind(entity.establishment_id().to_string())
        .bind(entity.status().id())
        .execute(&mut *conn)
        .await
        .map_err(db)?;
        info!("Created employee: {} ({})", entity.employee_number(), entity.id());
        Ok(())
    }

    async fn update(&self, conn: &mut SqliteConnection, entity: &Employee) -> Outcome<Employee> {
        debug!("Updating employee: {}", entity.id());
        let name = entity.name();
        let result = sqlx::query(
            r#"
            UPDATE employees
            SET employee_number = ?2, first_name = ?3, middle_name = ?4, last_name = ?5,
                email = ?6, role_id = ?7, establishment_id = ?8, status = ?9
            WHERE id = ?1
            "#,
        )
        .bind(entity.id().to_string())
        .bind(entity.employee_number().as_str())
        .bind(name.first())
        .bind(name.middle().unwrap_or_default())
        .bind(name.last())
        .bind(entity.email().as_str())
        .bind(entity.role_id().to_string())
        .bind(entity.establishment_id().to_string())
        .bind(entity.status().id())
        .execute(&mut *conn)
        .await
        .map_err(db)?;
        if result.rows_affected() == 0 {
            return Err(super::not_found::<Employee>(entity.id()));
        }
        Ok(entity.clone())
    }
}
