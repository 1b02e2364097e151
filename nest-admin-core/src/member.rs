//! Establishment members
//!
//! A member links an employee to an establishment with a title, a
//! description and a tag. The employee must already work for that
//! establishment.

use crate::employee::Employee;
use crate::ids::{EmployeeId, EstablishmentId, EstablishmentMemberId, TypedId};
use crate::specification::{Criteria, Queryable, Value};
use crate::values::{MemberDescription, MemberTag, MemberTitle};
use crate::{Failure, Outcome};
use serde::{Deserialize, Serialize};

/// Represents an establishment member
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstablishmentMember {
    id: EstablishmentMemberId,
    establishment_id: EstablishmentId,
    employee_id: EmployeeId,
    title: MemberTitle,
    description: MemberDescription,
    tag: MemberTag,
}

/// Check that `employee` works for `establishment_id`
pub fn ensure_employee_belongs(employee: &Employee, establishment_id: EstablishmentId) -> Outcome<()> {
    if employee.establishment_id() != establishment_id {
        return Err(Failure::validation(
            "EstablishmentMember.EmployeeNotInEstablishment",
            format!(
                "Employee {} does not belong to establishment {}",
                employee.id(),
                establishment_id
            ),
        ));
    }
    Ok(())
}

impl EstablishmentMember {
    pub fn create(
        establishment_id: EstablishmentId,
        employee: &Employee,
        title: MemberTitle,
        description: MemberDescription,
        tag: MemberTag,
    ) -> Outcome<Self> {
        ensure_employee_belongs(employee, establishment_id)?;
        Ok(Self::restore(
            EstablishmentMemberId::new(),
            establishment_id,
            employee.id(),
            title,
            description,
            tag,
        ))
    }

    pub fn restore(
        id: EstablishmentMemberId,
        establishment_id: EstablishmentId,
        employee_id: EmployeeId,
        title: MemberTitle,
        description: MemberDescription,
        tag: MemberTag,
    ) -> Self {
        Self {
            id,
            establishment_id,
            employee_id,
            title,
            description,
            tag,
        }
    }

    pub fn id(&self) -> EstablishmentMemberId {
        self.id
    }

    pub fn establishment_id(&self) -> EstablishmentId {
        self.establishment_id
    }

    pub fn employee_id(&self) -> EmployeeId {
        self.employee_id
    }

    pub fn title(&self) -> &MemberTitle {
        &self.title
    }

    pub fn description(&self) -> &MemberDescription {
        &self.description
    }

    pub fn tag(&self) -> &MemberTag {
        &self.tag
    }

    /// Reassign to another employee of the same establishment
    pub fn with_employee(self, employee: &Employee) -> Outcome<Self> {
        ensure_employee_belongs(employee, self.establishment_id)?;
        Ok(Self {
            employee_id: employee.id(),
            ..self
        })
    }

    #[must_use]
    pub fn with_title(self, title: MemberTitle) -> Self {
        Self { title, ..self }
    }

    #[must_use]
    pub fn with_description(self, description: MemberDescription) -> Self {
        Self { description, ..self }
    }

    #[must_use]
    pub fn with_tag(self, tag: MemberTag) -> Self {
        Self { tag, ..self }
    }
}

entity_fields!(MemberField {
    Id => "id",
    EstablishmentId => "establishment_id",
    EmployeeId => "employee_id",
    Title => "title",
    Description => "description",
    Tag => "tag",
});

impl Queryable for EstablishmentMember {
    type Field = MemberField;
    const ENTITY: &'static str = "EstablishmentMember";

    fn id_field() -> MemberField {
        MemberField::Id
    }

    fn value_of(&self, field: MemberField) -> Value {
        match field {
            MemberField::Id => self.id.as_uuid().into(),
            MemberField::EstablishmentId => self.establishment_id.as_uuid().into(),
            MemberField::EmployeeId => self.employee_id.as_uuid().into(),
            MemberField::Title => self.title.as_str().into(),
            MemberField::Description => self.description.as_str().into(),
            MemberField::Tag => self.tag.as_str().into(),
        }
    }
}

/// Listing filter for members
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemberFilter {
    pub establishment_id: Option<EstablishmentId>,
    pub employee_id: Option<EmployeeId>,
    pub title: Option<String>,
    pub tag: Option<String>,
}

impl MemberFilter {
    pub fn criteria(&self) -> Criteria<MemberField> {
        Criteria::All
            .and_maybe(self.establishment_id, |id| {
                Criteria::eq(MemberField::EstablishmentId, id.as_uuid())
            })
            .and_maybe(self.employee_id, |id| Criteria::eq(MemberField::EmployeeId, id.as_uuid()))
            .and_maybe(self.title.clone(), |t| Criteria::contains(MemberField::Title, t))
            .and_maybe(self.tag.clone(), |t| Criteria::eq(MemberField::Tag, t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::EmployeeRoleId;
    use crate::values::{EmailAddress, EmployeeNumber, PersonName};

    fn employee_of(establishment_id: EstablishmentId) -> Employee {
        Employee::create(
            EmployeeNumber::create("EMP-100").unwrap(),
            PersonName::create("Lito", None, "Garcia").unwrap(),
            EmailAddress::create("lito@example.com").unwrap(),
            EmployeeRoleId::new(),
            establishment_id,
        )
    }

    fn values() -> (MemberTitle, MemberDescription, MemberTag) {
        (
            MemberTitle::create("Head Chef").unwrap(),
            MemberDescription::create("Runs the kitchen").unwrap(),
            MemberTag::create("kitchen").unwrap(),
        )
    }

    #[test]
    fn test_member_requires_employee_of_same_establishment() {
        let establishment = EstablishmentId::new();
        let (title, description, tag) = values();
        let outsider = employee_of(EstablishmentId::new());
        let failure =
            EstablishmentMember::create(establishment, &outsider, title, description, tag).unwrap_err();
        assert!(failure.has_code("EstablishmentMember.EmployeeNotInEstablishment"));

        let (title, description, tag) = values();
        let insider = employee_of(establishment);
        let member = EstablishmentMember::create(establishment, &insider, title, description, tag).unwrap();
        assert_eq!(member.employee_id(), insider.id());
        assert!(member.with_employee(&outsider).is_err());
    }
}
