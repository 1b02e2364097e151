//! Validated value objects
//!
//! Values are immutable and can only be obtained through their `create`
//! factories, so an invalid name, phone or coordinate never exists at
//! runtime. Changing a value produces a new instance through a `with_*`
//! method that runs the full validation again.

mod address;
mod contact;
mod employee;
mod member;
mod names;
mod social;

pub use address::{Address, AddressFields, AddressPatch, Coordinates};
pub use contact::{EmailAddress, PhoneNumber};
pub use employee::EmployeeNumber;
pub use member::{MemberDescription, MemberTag, MemberTitle};
pub use names::{EstablishmentName, PersonName, RoleName};
pub use social::SocialMediaName;

use crate::{Failure, Outcome, ValidationErrors};
use regex::Regex;
use std::sync::OnceLock;

/// Record a length violation for `value`, counted in characters
pub(crate) fn check_length(
    errors: &mut ValidationErrors,
    code_prefix: &str,
    label: &str,
    value: &str,
    min: usize,
    max: usize,
) {
    let len = value.chars().count();
    if len == 0 && min > 0 {
        errors.ensure(
            false,
            format!("{code_prefix}.Required"),
            format!("{label} is required"),
        );
        return;
    }
    errors.ensure(
        len >= min && len <= max,
        format!("{code_prefix}.InvalidLength"),
        format!("{label} must be between {min} and {max} characters"),
    );
}

/// Compile a pattern once and hand out the cached instance
pub(crate) fn pattern(
    cell: &'static OnceLock<Result<Regex, regex::Error>>,
    source: &str,
) -> Outcome<&'static Regex> {
    cell.get_or_init(|| Regex::new(source))
        .as_ref()
        .map_err(|e| Failure::unexpected("Pattern.Invalid", e.to_string()))
}

/// Equality and hashing on the lowercase form of a text newtype
macro_rules! caseless_text {
    ($name:ident) => {
        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.0.to_lowercase() == other.0.to_lowercase()
            }
        }

        impl Eq for $name {}

        impl std::hash::Hash for $name {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                self.0.to_lowercase().hash(state);
            }
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

pub(crate) use caseless_text;
