//! Employee role service

use super::{duplicate, ServiceContext};
use crate::error::db;
use crate::repositories::{EmployeeRepository, Repository, RoleRepository};
use nest_admin_core::employee::EmployeeField;
use nest_admin_core::ids::{EmployeeRoleId, TypedId};
use nest_admin_core::pagination::{Page, PageRequest};
use nest_admin_core::role::{EmployeeRole, RoleFilter};
use nest_admin_core::specification::{same_values, Criteria, Specification};
use nest_admin_core::values::RoleName;
use nest_admin_core::{Failure, Outcome};
use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRole {
    pub role_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRole {
    pub id: EmployeeRoleId,
    pub role_name: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeleteRole {
    pub id: EmployeeRoleId,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GetRole {
    pub id: EmployeeRoleId,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListRoles {
    #[serde(flatten)]
    pub filter: RoleFilter,
    #[serde(flatten)]
    pub page: PageRequest,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CountRoles {
    #[serde(flatten)]
    pub filter: RoleFilter,
}

/// Service for employee roles
#[derive(Debug, Clone)]
pub struct RoleService {
    context: ServiceContext,
    repository: RoleRepository,
}

impl RoleService {
    pub fn new(context: ServiceContext) -> Self {
        Self {
            context,
            repository: RoleRepository,
        }
    }

    pub async fn create(&self, command: CreateRole) -> Outcome<EmployeeRole> {
        let role = EmployeeRole::create(RoleName::create(&command.role_name)?);

        let mut tx = self.context.begin().await?;
        let saved = self.save(&mut tx, role, None).await?;
        tx.commit().await.map_err(db)?;

        info!("Created role {} ({})", saved.name(), saved.id());
        Ok(saved)
    }

    pub async fn update(&self, command: UpdateRole) -> Outcome<EmployeeRole> {
        let name = RoleName::create(&command.role_name)?;

        let mut tx = self.context.begin().await?;
        let existing = self.repository.get_by_id(&mut tx, command.id).await?;
        let saved = self
            .save(&mut tx, existing.clone().with_name(name), Some(&existing))
            .await?;
        tx.commit().await.map_err(db)?;

        info!("Updated role {}", saved.id());
        Ok(saved)
    }

    /// Delete a role no employee holds
    pub async fn delete(&self, command: DeleteRole) -> Outcome<()> {
        let mut tx = self.context.begin().await?;
        let holders = Specification::new(Criteria::eq(EmployeeField::RoleId, command.id.as_uuid()));
        let count = EmployeeRepository.count(&mut tx, &holders).await?;
        if count > 0 {
            return Err(Failure::conflict(
                "EmployeeRole.InUse",
                format!("Role {} is held by {count} employees", command.id),
            ));
        }
        self.repository.delete(&mut tx, command.id).await?;
        tx.commit().await.map_err(db)?;

        info!("Deleted role {}", command.id);
        Ok(())
    }

    pub async fn get(&self, query: GetRole) -> Outcome<EmployeeRole> {
        debug!("Getting role {}", query.id);
        self.context.get(&self.repository, query.id).await
    }

    pub async fn list(&self, query: ListRoles) -> Outcome<Page<EmployeeRole>> {
        self.context
            .list(&self.repository, query.filter.criteria(), &query.page)
            .await
    }

    pub async fn count(&self, query: CountRoles) -> Outcome<i64> {
        self.context.count(&self.repository, query.filter.criteria()).await
    }

    async fn save(
        &self,
        conn: &mut SqliteConnection,
        role: EmployeeRole,
        existing: Option<&EmployeeRole>,
    ) -> Outcome<EmployeeRole> {
        if let Some(existing) = existing {
            if same_values(existing, &role) {
                debug!("Role {} unchanged", existing.id());
                return Ok(existing.clone());
            }
        }

        let taken = self
            .context
            .uniqueness()
            .role(conn, role.name(), existing.map(EmployeeRole::id))
            .await?;
        if taken {
            return Err(duplicate::<EmployeeRole>(format!("name '{}'", role.name())));
        }

        match existing {
            Some(_) => self.repository.update(conn, &role).await,
            None => {
                self.repository.add(conn, &role).await?;
                Ok(role)
            }
        }
    }
}

handlers!(RoleService {
    CreateRole => EmployeeRole : create,
    UpdateRole => EmployeeRole : update,
    DeleteRole => () : delete,
    GetRole => EmployeeRole : get,
    ListRoles => Page<EmployeeRole> : list,
    CountRoles => i64 : count,
});
