//! Employee role repository implementation

use super::{id_column, stored, Repository};
use crate::error::db;
use crate::Result;
use async_trait::async_trait;
use nest_admin_core::ids::EmployeeRoleId;
use nest_admin_core::role::EmployeeRole;
use nest_admin_core::values::RoleName;
use nest_admin_core::Outcome;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use tracing::debug;

const ENTITY: &str = "EmployeeRole";

/// Repository for employee roles
#[derive(Debug, Default, Clone, Copy)]
pub struct RoleRepository;

#[async_trait]
impl Repository for RoleRepository {
    type Entity = EmployeeRole;
    type Id = EmployeeRoleId;

    const TABLE: &'static str = "employee_roles";
    const COLUMNS: &'static str = "id, role_name";

    fn from_row(row: &SqliteRow) -> Result<EmployeeRole> {
        let name: String = row.try_get("role_name")?;
        Ok(EmployeeRole::restore(
            id_column(row, ENTITY, "id")?,
            stored(ENTITY, RoleName::create(&name))?,
        ))
    }

    async fn add(&self, conn: &mut SqliteConnection, entity: &EmployeeRole) -> Outcome<()> {
        debug!("Creating role: {} ({})", entity.name(), entity.id());
        sqlx::query("INSERT INTO employee_roles (id, role_name) VALUES (?1, ?2)")
            .bind(entity.id().to_string())
            .bind(entity.name().as_str())
            .execute(&mut *conn)
            .await
            .map_err(db)?;
        Ok(())
    }

    async fn update(&self, conn: &mut SqliteConnection, entity: &EmployeeRole) -> Outcome<EmployeeRole> {
        debug!("Updating role: {}", entity.id());
        let result = sqlx::query("UPDATE employee_roles SET role_name = ?2 WHERE id = ?1")
            .bind(entity.id().to_string())
            .bind(entity.name().as_str())
            .execute(&mut *conn)
            .await
            .map_err(db)?;
        if result.rows_affected() == 0 {
            return Err(super::not_found::<EmployeeRole>(entity.id()));
        }
        Ok(entity.clone())
    }
}
