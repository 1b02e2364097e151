use super::{caseless_text, check_length};
use crate::{Outcome, ValidationErrors};
use serde::Serialize;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Registered name of an establishment
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct EstablishmentName(String);

caseless_text!(EstablishmentName);

impl EstablishmentName {
    pub fn create(raw: &str) -> Outcome<Self> {
        let value = raw.trim();
        let mut errors = ValidationErrors::new();
        check_length(&mut errors, "EstablishmentName", "Establishment name", value, 3, 50);
        errors.ensure(
            value
                .chars()
                .all(|c| c.is_alphanumeric() || c.is_whitespace() || "&'.,-".contains(c)),
            "EstablishmentName.InvalidCharacters",
            "Establishment name may only contain letters, digits, spaces and & ' . , -",
        );
        errors.finish(|| Self(value.to_string()))
    }
}

/// Name of a staff role such as "Front Desk"
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct RoleName(String);

caseless_text!(RoleName);

impl RoleName {
    pub fn create(raw: &str) -> Outcome<Self> {
        let value = raw.trim();
        let mut errors = ValidationErrors::new();
        check_length(&mut errors, "RoleName", "Role name", value, 2, 50);
        errors.ensure(
            value
                .chars()
                .all(|c| c.is_alphanumeric() || c == ' ' || c == '-'),
            "RoleName.InvalidCharacters",
            "Role name may only contain letters, digits, spaces and hyphens",
        );
        errors.finish(|| Self(value.to_string()))
    }
}

/// First, optional middle, and last name of a person.
///
/// Two names are equal when all three parts match ignoring case.
#[derive(Debug, Clone, Serialize)]
pub struct PersonName {
    first: String,
    middle: Option<String>,
    last: String,
}

fn name_part(errors: &mut ValidationErrors, code: &str, label: &str, value: &str) {
    check_length(errors, code, label, value, 1, 100);
    errors.ensure(
        value
            .chars()
            .all(|c| c.is_alphabetic() || c == ' ' || c == '\'' || c == '.' || c == '-'),
        format!("{code}.InvalidCharacters"),
        format!("{label} may only contain letters, spaces and ' . -"),
    );
}

impl PersonName {
    pub fn create(first: &str, middle: Option<&str>, last: &str) -> Outcome<Self> {
        let first = first.trim();
        let last = last.trim();
        let middle = middle.map(str::trim).filter(|m| !m.is_empty());

        let mut errors = ValidationErrors::new();
        name_part(&mut errors, "PersonName.FirstName", "First name", first);
        if let Some(middle) = middle {
            name_part(&mut errors, "PersonName.MiddleName", "Middle name", middle);
        }
        name_part(&mut errors, "PersonName.LastName", "Last name", last);

        errors.finish(|| Self {
            first: first.to_string(),
            middle: middle.map(str::to_string),
            last: last.to_string(),
        })
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn middle(&self) -> Option<&str> {
        self.middle.as_deref()
    }

    pub fn last(&self) -> &str {
        &self.last
    }

    pub fn full_name(&self) -> String {
        match &self.middle {
            Some(middle) => format!("{} {} {}", self.first, middle, self.last),
            None => format!("{} {}", self.first, self.last),
        }
    }

    pub fn with_first_name(&self, first: &str) -> Outcome<Self> {
        Self::create(first, self.middle(), &self.last)
    }

    pub fn with_middle_name(&self, middle: Option<&str>) -> Outcome<Self> {
        Self::create(&self.first, middle, &self.last)
    }

    pub fn with_last_name(&self, last: &str) -> Outcome<Self> {
        Self::create(&self.first, self.middle(), last)
    }

    /// Replace whichever parts are given, keeping the others
    pub fn with_parts(
        &self,
        first: Option<&str>,
        middle: Option<&str>,
        last: Option<&str>,
    ) -> Outcome<Self> {
        Self::create(
            first.unwrap_or(&self.first),
            middle.or(self.middle()),
            last.unwrap_or(&self.last),
        )
    }

    fn key(&self) -> (String, String, String) {
        (
            self.first.to_lowercase(),
            self.middle.as_deref().unwrap_or_default().to_lowercase(),
            self.last.to_lowercase(),
        )
    }
}

impl PartialEq for PersonName {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for PersonName {}

impl Hash for PersonName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}
