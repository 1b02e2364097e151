//! Establishment phone numbers

use crate::ids::{EstablishmentId, EstablishmentPhoneId, TypedId};
use crate::primary::PrimaryFlagged;
use crate::specification::{Criteria, Queryable, Value};
use crate::values::PhoneNumber;
use serde::{Deserialize, Serialize};

/// A phone line of an establishment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstablishmentPhone {
    id: EstablishmentPhoneId,
    establishment_id: EstablishmentId,
    phone: PhoneNumber,
    is_primary: bool,
}

impl EstablishmentPhone {
    pub fn create(establishment_id: EstablishmentId, phone: PhoneNumber, is_primary: bool) -> Self {
        Self::restore(EstablishmentPhoneId::new(), establishment_id, phone, is_primary)
    }

    pub fn restore(
        id: EstablishmentPhoneId,
        establishment_id: EstablishmentId,
        phone: PhoneNumber,
        is_primary: bool,
    ) -> Self {
        Self {
            id,
            establishment_id,
            phone,
            is_primary,
        }
    }

    pub fn id(&self) -> EstablishmentPhoneId {
        self.id
    }

    pub fn establishment_id(&self) -> EstablishmentId {
        self.establishment_id
    }

    pub fn phone(&self) -> &PhoneNumber {
        &self.phone
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

impl PrimaryFlagged for EstablishmentPhone {
    type Id = EstablishmentPhoneId;
    const FAMILY: &'static str = "EstablishmentPhone";

    fn record_id(&self) -> EstablishmentPhoneId {
        self.id
    }

    fn parent_id(&self) -> EstablishmentId {
        self.establishment_id
    }

    fn is_primary(&self) -> bool {
        self.is_primary
    }
}

entity_fields!(PhoneField {
    Id => "id",
    EstablishmentId => "establishment_id",
    PhoneNumber => "phone_number",
    IsPrimary => "is_primary",
});

impl Queryable for EstablishmentPhone {
    type Field = PhoneField;
    const ENTITY: &'static str = "EstablishmentPhone";

    fn id_field() -> PhoneField {
        PhoneField::Id
    }

    fn value_of(&self, field: PhoneField) -> Value {
        match field {
            PhoneField::Id => self.id.as_uuid().into(),
            PhoneField::EstablishmentId => self.establishment_id.as_uuid().into(),
            PhoneField::PhoneNumber => self.phone.digits().into(),
            PhoneField::IsPrimary => self.is_primary.into(),
        }
    }
}

/// Listing filter for phones
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhoneFilter {
    pub establishment_id: Option<EstablishmentId>,
    pub phone_number: Option<String>,
    pub is_primary: Option<bool>,
}

impl PhoneFilter {
    pub fn criteria(&self) -> Criteria<PhoneField> {
        Criteria::All
            .and_maybe(self.establishment_id, |id| {
                Criteria::eq(PhoneField::EstablishmentId, id.as_uuid())
            })
            .and_maybe(self.phone_number.clone(), |p| {
                let digits: String = p.chars().filter(char::is_ascii_digit).collect();
                Criteria::contains(PhoneField::PhoneNumber, digits)
            })
            .and_maybe(self.is_primary, |v| Criteria::eq(PhoneField::IsPrimary, v))
    }
}
