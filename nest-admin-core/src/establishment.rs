//! Establishment aggregate root
//!
//! An establishment owns its addresses, contacts, phones and members. Its
//! lifecycle status only moves along the transitions listed in
//! [`EstablishmentStatus::allowed_transitions`].
//!
//! ```rust
//! use nest_admin_core::establishment::{Establishment, EstablishmentStatus};
//! use nest_admin_core::values::{EmailAddress, EstablishmentName};
//!
//! let establishment = Establishment::create(
//!     EstablishmentName::create("Harbor View Inn").unwrap(),
//!     EmailAddress::create("desk@harborview.ph").unwrap(),
//! );
//! assert_eq!(establishment.status(), EstablishmentStatus::Pending);
//!
//! let active = establishment.with_status(EstablishmentStatus::Active).unwrap();
//! assert!(active.with_status(EstablishmentStatus::Pending).is_err());
//! ```

use crate::ids::{EstablishmentId, TypedId};
use crate::specification::{Criteria, Queryable, Value};
use crate::values::{EmailAddress, EstablishmentName};
use crate::{Failure, Outcome};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of an establishment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EstablishmentStatus {
    Pending,
    Active,
    Inactive,
    Suspended,
    Closed,
}

impl EstablishmentStatus {
    pub fn id(self) -> i32 {
        match self {
            EstablishmentStatus::Pending => 0,
            EstablishmentStatus::Active => 1,
            EstablishmentStatus::Inactive => 2,
            EstablishmentStatus::Suspended => 3,
            EstablishmentStatus::Closed => 4,
        }
    }

    pub fn from_id(id: i32) -> Outcome<Self> {
        match id {
            0 => Ok(EstablishmentStatus::Pending),
            1 => Ok(EstablishmentStatus::Active),
            2 => Ok(EstablishmentStatus::Inactive),
            3 => Ok(EstablishmentStatus::Suspended),
            4 => Ok(EstablishmentStatus::Closed),
            other => Err(Failure::validation(
                "EstablishmentStatus.Unknown",
                format!("{other} is not a valid establishment status"),
            )),
        }
    }

    /// Statuses reachable in one step
    pub fn allowed_transitions(self) -> &'static [EstablishmentStatus] {
        use self::EstablishmentStatus::*;
        match self {
            Pending => &[Active, Closed],
            Active => &[Inactive, Suspended, Closed],
            Inactive => &[Active, Closed],
            Suspended => &[Active, Closed],
            Closed => &[],
        }
    }

    /// Staying in the same status is always allowed
    pub fn can_transition_to(self, next: EstablishmentStatus) -> bool {
        self == next || self.allowed_transitions().contains(&next)
    }

    pub fn validate_transition(self, next: EstablishmentStatus) -> Outcome<()> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(Failure::validation(
                "EstablishmentStatus.InvalidTransition",
                format!("Establishment cannot move from {self} to {next}"),
            ))
        }
    }
}

impl fmt::Display for EstablishmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Represents an establishment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Establishment {
    id: EstablishmentId,
    name: EstablishmentName,
    email: EmailAddress,
    status: EstablishmentStatus,
}

impl Establishment {
    /// New establishments start out pending
    pub fn create(name: EstablishmentName, email: EmailAddress) -> Self {
        Self {
            id: EstablishmentId::new(),
            name,
            email,
            status: EstablishmentStatus::Pending,
        }
    }

    /// Rebuild a persisted establishment without replaying its history
    pub fn restore(
        id: EstablishmentId,
        name: EstablishmentName,
        email: EmailAddress,
        status: EstablishmentStatus,
    ) -> Self {
        Self {
            id,
            name,
            email,
            status,
        }
    }

    pub fn id(&self) -> EstablishmentId {
        self.id
    }

    pub fn name(&self) -> &EstablishmentName {
        &self.name
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn status(&self) -> EstablishmentStatus {
        self.status
    }

    #[must_use]
    pub fn with_name(self, name: EstablishmentName) -> Self {
        Self { name, ..self }
    }

    #[must_use]
    pub fn with_email(self, email: EmailAddress) -> Self {
        Self { email, ..self }
    }

    pub fn with_status(self, status: EstablishmentStatus) -> Outcome<Self> {
        self.status.validate_transition(status)?;
        Ok(Self { status, ..self })
    }
}

entity_fields!(
    /// Queryable fields of [`Establishment`]
    EstablishmentField {
        Id => "id",
        Name => "name",
        Email => "email",
        Status => "status",
    }
);

impl Queryable for Establishment {
    type Field = EstablishmentField;
    const ENTITY: &'static str = "Establishment";

    fn id_field() -> EstablishmentField {
        EstablishmentField::Id
    }

    fn value_of(&self, field: EstablishmentField) -> Value {
        match field {
            EstablishmentField::Id => self.id.as_uuid().into(),
            EstablishmentField::Name => self.name.as_str().into(),
            EstablishmentField::Email => self.email.as_str().into(),
            EstablishmentField::Status => i64::from(self.status.id()).into(),
        }
    }
}

/// Listing filter for establishments
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EstablishmentFilter {
    pub name: Option<String>,
    pub email: Option<String>,
    pub status: Option<EstablishmentStatus>,
}

impl EstablishmentFilter {
    pub fn criteria(&self) -> Criteria<EstablishmentField> {
        Criteria::All
            .and_maybe(self.name.clone(), |n| Criteria::contains(EstablishmentField::Name, n))
            .and_maybe(self.email.clone(), |e| Criteria::contains(EstablishmentField::Email, e))
            .and_maybe(self.status, |s| {
                Criteria::eq(EstablishmentField::Status, i64::from(s.id()))
            })
    }
}
