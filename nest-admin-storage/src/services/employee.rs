//! Employee service

use super::{duplicate, ensure_establishment, ServiceContext};
use crate::error::db;
use crate::repositories::{EmployeeRepository, MemberRepository, Repository, RoleRepository};
use nest_admin_core::employee::{Employee, EmployeeFilter, EmployeeStatus};
use nest_admin_core::ids::{EmployeeId, EmployeeRoleId, EstablishmentId, TypedId};
use nest_admin_core::member::MemberField;
use nest_admin_core::pagination::{Page, PageRequest};
use nest_admin_core::specification::{same_values, Criteria, Specification};
use nest_admin_core::values::{EmailAddress, EmployeeNumber, PersonName};
use nest_admin_core::{Combine, Failure, Outcome};
use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEmployee {
    pub employee_number: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub email: String,
    pub role_id: EmployeeRoleId,
    pub establishment_id: EstablishmentId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateEmployee {
    pub id: EmployeeId,
    pub employee_number: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub email: String,
    pub role_id: EmployeeRoleId,
    pub establishment_id: EstablishmentId,
    pub status: EmployeeStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatchEmployee {
    pub id: EmployeeId,
    pub employee_number: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub role_id: Option<EmployeeRoleId>,
    pub establishment_id: Option<EstablishmentId>,
    pub status: Option<EmployeeStatus>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeleteEmployee {
    pub id: EmployeeId,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GetEmployee {
    pub id: EmployeeId,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListEmployees {
    #[serde(flatten)]
    pub filter: EmployeeFilter,
    #[serde(flatten)]
    pub page: PageRequest,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CountEmployees {
    #[serde(flatten)]
    pub filter: EmployeeFilter,
}

/// Service for employees
#[derive(Debug, Clone)]
pub struct EmployeeService {
    context: ServiceContext,
    repository: EmployeeRepository,
}

impl EmployeeService {
    pub fn new(context: ServiceContext) -> Self {
        Self {
            context,
            repository: EmployeeRepository,
        }
    }

    pub async fn create(&self, command: CreateEmployee) -> Outcome<Employee> {
        let (number, name, email) = (
            EmployeeNumber::create(&command.employee_number),
            PersonName::create(
                &command.first_name,
                command.middle_name.as_deref(),
                &command.last_name,
            ),
            EmailAddress::create(&command.email),
        )
            .combine()?;
        let employee = Employee::create(number, name, email, command.role_id, command.establishment_id);

        let mut tx = self.context.begin().await?;
        let saved = self.save(&mut tx, employee, None).await?;
        tx.commit().await.map_err(db)?;

        info!(
            "Created employee {} ({}) for establishment {}",
            saved.employee_number(),
            saved.id(),
            saved.establishment_id()
        );
        Ok(saved)
    }

    pub async fn update(&self, command: UpdateEmployee) -> Outcome<Employee> {
        let (number, name, email) = (
            EmployeeNumber::create(&command.employee_number),
            PersonName::create(
                &command.first_name,
                command.middle_name.as_deref(),
                &command.last_name,
            ),
            EmailAddress::create(&command.email),
        )
            .combine()?;

        let mut tx = self.context.begin().await?;
        let existing = self.repository.get_by_id(&mut tx, command.id).await?;
        let updated = existing
            .clone()
            .with_employee_number(number)
            .with_name(name)
            .with_email(email)
            .with_role(command.role_id)
            .with_establishment(command.establishment_id)
            .with_status(command.status)?;
        let saved = self.save(&mut tx, updated, Some(&existing)).await?;
        tx.commit().await.map_err(db)?;

        info!("Updated employee {}", saved.id());
        Ok(saved)
    }

    pub async fn patch(&self, command: PatchEmployee) -> Outcome<Employee> {
        let mut tx = self.context.begin().await?;
        let existing = self.repository.get_by_id(&mut tx, command.id).await?;
        let (number, email, name) = (
            command
                .employee_number
                .as_deref()
                .map(EmployeeNumber::create)
                .transpose(),
            command.email.as_deref().map(EmailAddress::create).transpose(),
            existing.name().with_parts(
                command.first_name.as_deref(),
                command.middle_name.as_deref(),
                command.last_name.as_deref(),
            ),
        )
            .combine()?;

        let mut patched = existing.clone().with_name(name);
        if let Some(number) = number {
            patched = patched.with_employee_number(number);
        }
        if let Some(email) = email {
            patched = patched.with_email(email);
        }
        if let Some(role_id) = command.role_id {
            patched = patched.with_role(role_id);
        }
        if let Some(establishment_id) = command.establishment_id {
            patched = patched.with_establishment(establishment_id);
        }
        if let Some(status) = command.status {
            patched = patched.with_status(status)?;
        }
        let saved = self.save(&mut tx, patched, Some(&existing)).await?;
        tx.commit().await.map_err(db)?;

        info!("Patched employee {}", saved.id());
        Ok(saved)
    }

    /// Delete an employee and their memberships
    pub async fn delete(&self, command: DeleteEmployee) -> Outcome<()> {
        let mut tx = self.context.begin().await?;
        self.repository.delete(&mut tx, command.id).await?;
        tx.commit().await.map_err(db)?;

        info!("Deleted employee {}", command.id);
        Ok(())
    }

    pub async fn get(&self, query: GetEmployee) -> Outcome<Employee> {
        debug!("Getting employee {}", query.id);
        self.context.get(&self.repository, query.id).await
    }

    pub async fn list(&self, query: ListEmployees) -> Outcome<Page<Employee>> {
        self.context
            .list(&self.repository, query.filter.criteria(), &query.page)
            .await
    }

    pub async fn count(&self, query: CountEmployees) -> Outcome<i64> {
        self.context.count(&self.repository, query.filter.criteria()).await
    }

    async fn save(
        &self,
        conn: &mut SqliteConnection,
        employee: Employee,
        existing: Option<&Employee>,
    ) -> Outcome<Employee> {
        if let Some(existing) = existing {
            if same_values(existing, &employee) {
                debug!("Employee {} unchanged", existing.id());
                return Ok(existing.clone());
            }
        }

        if existing.map_or(true, |e| e.role_id() != employee.role_id())
            && !RoleRepository.exists(conn, employee.role_id()).await?
        {
            return Err(Failure::not_found(
                "Employee.RoleNotFound",
                format!("Employee role with id {} was not found", employee.role_id()),
            ));
        }

        match existing {
            None => {
                ensure_establishment(conn, employee.establishment_id(), "Employee.EstablishmentNotFound")
                    .await?;
            }
            Some(existing) if existing.establishment_id() != employee.establishment_id() => {
                ensure_establishment(conn, employee.establishment_id(), "Employee.EstablishmentNotFound")
                    .await?;
                self.ensure_no_memberships(conn, existing).await?;
            }
            Some(_) => {}
        }

        let taken = self
            .context
            .uniqueness()
            .employee(
                conn,
                employee.employee_number(),
                employee.name(),
                employee.email(),
                employee.establishment_id(),
                existing.map(Employee::id),
            )
            .await?;
        if taken {
            return Err(duplicate::<Employee>(format!(
                "number {} in establishment {}",
                employee.employee_number(),
                employee.establishment_id()
            )));
        }

        match existing {
            Some(_) => self.repository.update(conn, &employee).await,
            None => {
                self.repository.add(conn, &employee).await?;
                Ok(employee)
            }
        }
    }

    /// An employee cannot move to another establishment while still a
    /// member of the current one
    async fn ensure_no_memberships(&self, conn: &mut SqliteConnection, employee: &Employee) -> Outcome<()> {
        let memberships = Specification::new(Criteria::eq(MemberField::EmployeeId, employee.id().as_uuid()));
        let count = MemberRepository.count(conn, &memberships).await?;
        if count > 0 {
            return Err(Failure::conflict(
                "Employee.HasMemberships",
                format!(
                    "Employee {} is still a member of establishment {}",
                    employee.id(),
                    employee.establishment_id()
                ),
            ));
        }
        Ok(())
    }
}

handlers!(EmployeeService {
    CreateEmployee => Employee : create,
    UpdateEmployee => Employee : update,
    PatchEmployee => Employee : patch,
    DeleteEmployee => () : delete,
    GetEmployee => Employee : get,
    ListEmployees => Page<Employee> : list,
    CountEmployees => i64 : count,
});

#[cfg(test)]
mod tests {
    include!("employee_tests.rs");
}
