use super::pattern;
use crate::{Failure, Outcome, ValidationErrors};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

static EMAIL_PATTERN: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();

/// Email address, stored trimmed and lowercased
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn create(raw: &str) -> Outcome<Self> {
        let value = raw.trim().to_lowercase();
        if value.is_empty() {
            return Err(Failure::validation(
                "EmailAddress.Required",
                "Email address is required",
            ));
        }
        let regex = pattern(
            &EMAIL_PATTERN,
            r"^[a-z0-9._%+\-]+@[a-z0-9\-]+(\.[a-z0-9\-]+)*\.[a-z]{2,}$",
        )?;
        let mut errors = ValidationErrors::new();
        errors.ensure(
            value.len() <= 254,
            "EmailAddress.TooLong",
            "Email address cannot exceed 254 characters",
        );
        errors.ensure(
            regex.is_match(&value),
            "EmailAddress.InvalidFormat",
            format!("'{}' is not a valid email address", raw.trim()),
        );
        errors.finish(|| Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Phone number normalised to its digits.
///
/// Input may use spaces, dashes, dots, parentheses and a leading `+`;
/// only the 7 to 15 digits are kept, and equality compares those digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub const MIN_DIGITS: usize = 7;
    pub const MAX_DIGITS: usize = 15;

    pub fn create(raw: &str) -> Outcome<Self> {
        let value = raw.trim();
        if value.is_empty() {
            return Err(Failure::validation(
                "PhoneNumber.Required",
                "Phone number is required",
            ));
        }

        let body = value.strip_prefix('+').unwrap_or(value);
        let digits: String = body.chars().filter(char::is_ascii_digit).collect();

        let mut errors = ValidationErrors::new();
        errors.ensure(
            body.chars()
                .all(|c| c.is_ascii_digit() || " -().".contains(c)),
            "PhoneNumber.InvalidCharacters",
            "Phone number may only contain digits, spaces, - . ( ) and a leading +",
        );
        errors.ensure(
            (Self::MIN_DIGITS..=Self::MAX_DIGITS).contains(&digits.len()),
            "PhoneNumber.InvalidLength",
            format!(
                "Phone number must have between {} and {} digits",
                Self::MIN_DIGITS,
                Self::MAX_DIGITS
            ),
        );
        errors.finish(|| Self(digits))
    }

    /// Normalised digit string
    pub fn digits(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
