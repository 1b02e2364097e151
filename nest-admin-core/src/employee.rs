//! Employee aggregate root
//!
//! Employees belong to one establishment and hold one role. Their
//! employment status moves through an explicit allow-list, like the
//! establishment lifecycle.

use crate::ids::{EmployeeId, EmployeeRoleId, EstablishmentId, TypedId};
use crate::specification::{Criteria, Queryable, Value};
use crate::values::{EmailAddress, EmployeeNumber, PersonName};
use crate::{Failure, Outcome};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Employment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmployeeStatus {
    Active,
    OnLeave,
    Suspended,
    Terminated,
}

impl EmployeeStatus {
    pub fn id(self) -> i32 {
        match self {
            EmployeeStatus::Active => 1,
            EmployeeStatus::OnLeave => 2,
            EmployeeStatus::Suspended => 3,
            EmployeeStatus::Terminated => 4,
        }
    }

    pub fn from_id(id: i32) -> Outcome<Self> {
        match id {
            1 => Ok(EmployeeStatus::Active),
            2 => Ok(EmployeeStatus::OnLeave),
            3 => Ok(EmployeeStatus::Suspended),
            4 => Ok(EmployeeStatus::Terminated),
            other => Err(Failure::validation(
                "EmployeeStatus.Unknown",
                format!("{other} is not a valid employee status"),
            )),
        }
    }

    pub fn allowed_transitions(self) -> &'static [EmployeeStatus] {
        use self::EmployeeStatus::*;
        match self {
            Active => &[OnLeave, Suspended, Terminated],
            OnLeave => &[Active, Terminated],
            Suspended => &[Active, Terminated],
            Terminated => &[],
        }
    }

    pub fn validate_transition(self, next: EmployeeStatus) -> Outcome<()> {
        if self == next || self.allowed_transitions().contains(&next) {
            return Ok(());
        }
        Err(Failure::validation(
            "EmployeeStatus.InvalidTransition",
            format!("Employee cannot move from {self:?} to {next:?}"),
        ))
    }
}

impl fmt::Display for EmployeeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Represents an employee of an establishment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Employee {
    id: EmployeeId,
    employee_number: EmployeeNumber,
    name: PersonName,
    email: EmailAddress,
    role_id: EmployeeRoleId,
    establishment_id: EstablishmentId,
    status: EmployeeStatus,
}

impl Employee {
    /// New employees start out active
    pub fn create(
        employee_number: EmployeeNumber,
        name: PersonName,
        email: EmailAddress,
        role_id: EmployeeRoleId,
        establishment_id: EstablishmentId,
    ) -> Self {
        Self {
            id: EmployeeId::new(),
            employee_number,
            name,
            email,
            role_id,
            establishment_id,
            status: EmployeeStatus::Active,
        }
    }

    /// Rebuild a persisted employee
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: EmployeeId,
        employee_number: EmployeeNumber,
        name: PersonName,
        email: EmailAddress,
        role_id: EmployeeRoleId,
        establishment_id: EstablishmentId,
        status: EmployeeStatus,
    ) -> Self {
        Self {
            id,
            employee_number,
            name,
            email,
            role_id,
            establishment_id,
            status,
        }
    }

    pub fn id(&self) -> EmployeeId {
        self.id
    }

    pub fn employee_number(&self) -> &EmployeeNumber {
        &self.employee_number
    }

    pub fn name(&self) -> &PersonName {
        &self.name
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn role_id(&self) -> EmployeeRoleId {
        self.role_id
    }

    pub fn establishment_id(&self) -> EstablishmentId {
        self.establishment_id
    }

    pub fn status(&self) -> EmployeeStatus {
        self.status
    }

    #[must_use]
    pub fn with_employee_number(self, employee_number: EmployeeNumber) -> Self {
        Self { employee_number, ..self }
    }

    #[must_use]
    pub fn with_name(self, name: PersonName) -> Self {
        Self { name, ..self }
    }

    #[must_use]
    pub fn with_email(self, email: EmailAddress) -> Self {
        Self { email, ..self }
    }

    #[must_use]
    pub fn with_role(self, role_id: EmployeeRoleId) -> Self {
        Self { role_id, ..self }
    }

    #[must_use]
    pub fn with_establishment(self, establishment_id: EstablishmentId) -> Self {
        Self { establishment_id, ..self }
    }

    pub fn with_status(self, status: EmployeeStatus) -> Outcome<Self> {
        self.status.validate_transition(status)?;
        Ok(Self { status, ..self })
    }
}

entity_fields!(EmployeeField {
    Id => "id",
    EmployeeNumber => "employee_number",
    FirstName => "first_name",
    MiddleName => "middle_name",
    LastName => "last_name",
    Email => "email",
    RoleId => "role_id",
    EstablishmentId => "establishment_id",
    Status => "status",
});

impl Queryable for Employee {
    type Field = EmployeeField;
    const ENTITY: &'static str = "Employee";

    fn id_field() -> EmployeeField {
        EmployeeField::Id
    }

    fn value_of(&self, field: EmployeeField) -> Value {
        match field {
            EmployeeField::Id => self.id.as_uuid().into(),
            EmployeeField::EmployeeNumber => self.employee_number.as_str().into(),
            EmployeeField::FirstName => self.name.first().into(),
            EmployeeField::MiddleName => self.name.middle().unwrap_or_default().into(),
            EmployeeField::LastName => self.name.last().into(),
            EmployeeField::Email => self.email.as_str().into(),
            EmployeeField::RoleId => self.role_id.as_uuid().into(),
            EmployeeField::EstablishmentId => self.establishment_id.as_uuid().into(),
            EmployeeField::Status => i64::from(self.status.id()).into(),
        }
    }
}

/// Listing filter for employees
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeFilter {
    pub establishment_id: Option<EstablishmentId>,
    pub role_id: Option<EmployeeRoleId>,
    pub employee_number: Option<String>,
    /// Matches first or last name
    pub name: Option<String>,
    pub email: Option<String>,
    pub status: Option<EmployeeStatus>,
}

impl EmployeeFilter {
    pub fn criteria(&self) -> Criteria<EmployeeField> {
        Criteria::All
            .and_maybe(self.establishment_id, |id| {
                Criteria::eq(EmployeeField::EstablishmentId, id.as_uuid())
            })
            .and_maybe(self.role_id, |id| Criteria::eq(EmployeeField::RoleId, id.as_uuid()))
            .and_maybe(self.employee_number.clone(), |n| {
                Criteria::contains(EmployeeField::EmployeeNumber, n)
            })
            .and_maybe(self.name.clone(), |n| {
                Criteria::contains(EmployeeField::FirstName, n.clone())
                    .or(Criteria::contains(EmployeeField::LastName, n))
            })
            .and_maybe(self.email.clone(), |e| Criteria::contains(EmployeeField::Email, e))
            .and_maybe(self.status, |s| Criteria::eq(EmployeeField::Status, i64::from(s.id())))
    }
}
