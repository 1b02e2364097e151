//! Strongly typed identifiers
//!
//! Each entity family gets its own UUID wrapper so an address id can never be
//! passed where an establishment id is expected.

use crate::{Failure, Outcome};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;
use uuid::Uuid;

/// Behaviour shared by every typed id
pub trait TypedId: Copy + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// Name used in error codes, e.g. `EstablishmentId`
    const LABEL: &'static str;

    fn from_uuid(id: Uuid) -> Self;

    fn as_uuid(&self) -> Uuid;

    /// Parse a textual id; malformed and nil ids fail validation
    fn parse(input: &str) -> Outcome<Self> {
        match Uuid::parse_str(input.trim()) {
            Ok(id) if !id.is_nil() => Ok(Self::from_uuid(id)),
            _ => Err(Failure::validation(
                format!("{}.Invalid", Self::LABEL),
                format!("'{}' is not a valid {}", input, Self::LABEL),
            )),
        }
    }
}

macro_rules! typed_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh random id
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl TypedId for $name {
            const LABEL: &'static str = stringify!($name);

            fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

typed_id!(
    /// Identifier of an establishment
    EstablishmentId
);
typed_id!(EstablishmentAddressId);
typed_id!(EstablishmentContactId);
typed_id!(EstablishmentPhoneId);
typed_id!(EstablishmentMemberId);
typed_id!(EmployeeId);
typed_id!(EmployeeRoleId);
typed_id!(
    /// Identifier of a social media platform
    SocialMediaId
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_parse_round_trips_display() {
        let id = EmployeeId::new();
        let parsed = EmployeeId::parse(&id.to_string()).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_parse_rejects_garbage_and_nil() {
        let failure = EstablishmentId::parse("not-a-uuid").unwrap_err();
        assert_eq!(failure.kind(), ErrorKind::Validation);
        assert!(failure.has_code("EstablishmentId.Invalid"));

        let nil = Uuid::nil().to_string();
        assert!(EmployeeRoleId::parse(&nil).is_err());
    }

    #[test]
    fn test_fresh_ids_differ() {
        assert_ne!(SocialMediaId::new(), SocialMediaId::default());
    }
}
