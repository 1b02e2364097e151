//! Employee roles

use crate::ids::{EmployeeRoleId, TypedId};
use crate::specification::{Criteria, Queryable, Value};
use crate::values::RoleName;
use serde::{Deserialize, Serialize};

/// A staff role shared by every establishment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeRole {
    id: EmployeeRoleId,
    name: RoleName,
}

impl EmployeeRole {
    pub fn create(name: RoleName) -> Self {
        Self::restore(EmployeeRoleId::new(), name)
    }

    pub fn restore(id: EmployeeRoleId, name: RoleName) -> Self {
        Self { id, name }
    }

    pub fn id(&self) -> EmployeeRoleId {
        self.id
    }

    pub fn name(&self) -> &RoleName {
        &self.name
    }

    #[must_use]
    pub fn with_name(self, name: RoleName) -> Self {
        Self { name, ..self }
    }
}

entity_fields!(RoleField {
    Id => "id",
    RoleName => "role_name",
});

impl Queryable for EmployeeRole {
    type Field = RoleField;
    const ENTITY: &'static str = "EmployeeRole";

    fn id_field() -> RoleField {
        RoleField::Id
    }

    fn value_of(&self, field: RoleField) -> Value {
        match field {
            RoleField::Id => self.id.as_uuid().into(),
            RoleField::RoleName => self.name.as_str().into(),
        }
    }
}

/// Listing filter for roles
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleFilter {
    pub role_name: Option<String>,
}

impl RoleFilter {
    pub fn criteria(&self) -> Criteria<RoleField> {
        Criteria::All.and_maybe(self.role_name.clone(), |n| Criteria::contains(RoleField::RoleName, n))
    }
}
