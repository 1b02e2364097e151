//! Establishment addresses

use crate::ids::{EstablishmentAddressId, EstablishmentId, TypedId};
use crate::primary::PrimaryFlagged;
use crate::specification::{Criteria, Queryable, Value};
use crate::values::Address;
use serde::{Deserialize, Serialize};

/// An address owned by an establishment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstablishmentAddress {
    id: EstablishmentAddressId,
    establishment_id: EstablishmentId,
    address: Address,
    is_primary: bool,
}

impl EstablishmentAddress {
    pub fn create(establishment_id: EstablishmentId, address: Address, is_primary: bool) -> Self {
        Self::restore(EstablishmentAddressId::new(), establishment_id, address, is_primary)
    }

    pub fn restore(
        id: EstablishmentAddressId,
        establishment_id: EstablishmentId,
        address: Address,
        is_primary: bool,
    ) -> Self {
        Self {
            id,
            establishment_id,
            address,
            is_primary,
        }
    }

    pub fn id(&self) -> EstablishmentAddressId {
        self.id
    }

    pub fn establishment_id(&self) -> EstablishmentId {
        self.establishment_id
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    #[must_use]
    pub fn with_address(self, address: Address) -> Self {
        Self { address, ..self }
    }

    #[must_use]
    pub fn with_primary(self, is_primary: bool) -> Self {
        Self { is_primary, ..self }
    }
}

impl PrimaryFlagged for EstablishmentAddress {
    type Id = EstablishmentAddressId;
    const FAMILY: &'static str = "EstablishmentAddress";

    fn record_id(&self) -> EstablishmentAddressId {
        self.id
    }

    fn parent_id(&self) -> EstablishmentId {
        self.establishment_id
    }

    fn is_primary(&self) -> bool {
        self.is_primary
    }
}

entity_fields!(AddressField {
    Id => "id",
    EstablishmentId => "establishment_id",
    AddressLine => "address_line",
    Municipality => "municipality",
    City => "city",
    Province => "province",
    Region => "region",
    Country => "country",
    Latitude => "lat_e6",
    Longitude => "lon_e6",
    IsPrimary => "is_primary",
});

impl Queryable for EstablishmentAddress {
    type Field = AddressField;
    const ENTITY: &'static str = "EstablishmentAddress";

    fn id_field() -> AddressField {
        AddressField::Id
    }

    fn value_of(&self, field: AddressField) -> Value {
        match field {
            AddressField::Id => self.id.as_uuid().into(),
            AddressField::EstablishmentId => self.establishment_id.as_uuid().into(),
            AddressField::AddressLine => self.address.address_line().into(),
            AddressField::Municipality => self.address.municipality().into(),
            AddressField::City => self.address.city().into(),
            AddressField::Province => self.address.province().into(),
            AddressField::Region => self.address.region().into(),
            AddressField::Country => self.address.country().into(),
            AddressField::Latitude => self.address.coordinates().lat_e6().into(),
            AddressField::Longitude => self.address.coordinates().lon_e6().into(),
            AddressField::IsPrimary => self.is_primary.into(),
        }
    }
}

/// Listing filter for addresses
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddressFilter {
    pub establishment_id: Option<EstablishmentId>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub is_primary: Option<bool>,
}

impl AddressFilter {
    pub fn criteria(&self) -> Criteria<AddressField> {
        Criteria::All
            .and_maybe(self.establishment_id, |id| {
                Criteria::eq(AddressField::EstablishmentId, id.as_uuid())
            })
            .and_maybe(self.city.clone(), |v| Criteria::contains(AddressField::City, v))
            .and_maybe(self.province.clone(), |v| Criteria::contains(AddressField::Province, v))
            .and_maybe(self.region.clone(), |v| Criteria::contains(AddressField::Region, v))
            .and_maybe(self.country.clone(), |v| Criteria::contains(AddressField::Country, v))
            .and_maybe(self.is_primary, |v| Criteria::eq(AddressField::IsPrimary, v))
    }
}
