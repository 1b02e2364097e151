//! Establishment contact persons

use crate::ids::{EstablishmentContactId, EstablishmentId, TypedId};
use crate::primary::PrimaryFlagged;
use crate::specification::{Criteria, Queryable, Value};
use crate::values::{PersonName, PhoneNumber};
use serde::{Deserialize, Serialize};

/// A person to reach at an establishment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstablishmentContact {
    id: EstablishmentContactId,
    establishment_id: EstablishmentId,
    person: PersonName,
    phone: PhoneNumber,
    is_primary: bool,
}

impl EstablishmentContact {
    pub fn create(
        establishment_id: EstablishmentId,
        person: PersonName,
        phone: PhoneNumber,
        is_primary: bool,
    ) -> Self {
        Self::restore(EstablishmentContactId::new(), establishment_id, person, phone, is_primary)
    }

    pub fn restore(
        id: EstablishmentContactId,
        establishment_id: EstablishmentId,
        person: PersonName,
        phone: PhoneNumber,
        is_primary: bool,
    ) -> Self {
        Self {
            id,
            establishment_id,
            person,
            phone,
            is_primary,
        }
    }

    pub fn id(&self) -> EstablishmentContactId {
        self.id
    }

    pub fn establishment_id(&self) -> EstablishmentId {
        self.establishment_id
    }

    pub fn person(&self) -> &PersonName {
        &self.person
    }

    pub fn phone(&self) -> &PhoneNumber {
        &self.phone
    }

    #[must_use]
    pub fn with_person(self, person: PersonName) -> Self {
        Self { person, ..self }
    }

    #[must_use]
    pub fn with_phone(self, phone: PhoneNumber) -> Self {
        Self { phone, ..self }
    }

    #[must_use]
    pub fn with_primary(self, is_primary: bool) -> Self {
        Self { is_primary, ..self }
    }
}

impl PrimaryFlagged for EstablishmentContact {
    type Id = EstablishmentContactId;
    const FAMILY: &'static str = "EstablishmentContact";

    fn record_id(&self) -> EstablishmentContactId {
        self.id
    }

    fn parent_id(&self) -> EstablishmentId {
        self.establishment_id
    }

    fn is_primary(&self) -> bool {
        self.is_primary
    }
}

entity_fields!(ContactField {
    Id => "id",
    EstablishmentId => "establishment_id",
    FirstName => "first_name",
    MiddleName => "middle_name",
    LastName => "last_name",
    PhoneNumber => "phone_number",
    IsPrimary => "is_primary",
});

impl Queryable for EstablishmentContact {
    type Field = ContactField;
    const ENTITY: &'static str = "EstablishmentContact";

    fn id_field() -> ContactField {
        ContactField::Id
    }

    fn value_of(&self, field: ContactField) -> Value {
        match field {
            ContactField::Id => self.id.as_uuid().into(),
            ContactField::EstablishmentId => self.establishment_id.as_uuid().into(),
            ContactField::FirstName => self.person.first().into(),
            ContactField::MiddleName => self.person.middle().unwrap_or_default().into(),
            ContactField::LastName => self.person.last().into(),
            ContactField::PhoneNumber => self.phone.digits().into(),
            ContactField::IsPrimary => self.is_primary.into(),
        }
    }
}

/// Listing filter for contacts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactFilter {
    pub establishment_id: Option<EstablishmentId>,
    /// Matches first, middle or last name
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub is_primary: Option<bool>,
}

impl ContactFilter {
    pub fn criteria(&self) -> Criteria<ContactField> {
        Criteria::All
            .and_maybe(self.establishment_id, |id| {
                Criteria::eq(ContactField::EstablishmentId, id.as_uuid())
            })
            .and_maybe(self.name.clone(), |n| {
                Criteria::contains(ContactField::FirstName, n.clone())
                    .or(Criteria::contains(ContactField::MiddleName, n.clone()))
                    .or(Criteria::contains(ContactField::LastName, n))
            })
            .and_maybe(self.phone_number.clone(), |p| {
                let digits: String = p.chars().filter(char::is_ascii_digit).collect();
                Criteria::contains(ContactField::PhoneNumber, digits)
            })
            .and_maybe(self.is_primary, |v| Criteria::eq(ContactField::IsPrimary, v))
    }
}
