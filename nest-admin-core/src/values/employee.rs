use super::check_length;
use crate::{Outcome, ValidationErrors};
use serde::Serialize;
use std::fmt;

/// Staff number, e.g. `EMP-0042`; stored upper-case
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EmployeeNumber(String);

impl EmployeeNumber {
    pub fn create(raw: &str) -> Outcome<Self> {
        let value = raw.trim().to_uppercase();
        let mut errors = ValidationErrors::new();
        check_length(&mut errors, "EmployeeNumber", "Employee number", &value, 3, 20);
        errors.ensure(
            value
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-'),
            "EmployeeNumber.InvalidCharacters",
            "Employee number may only contain letters, digits and hyphens",
        );
        errors.finish(|| Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmployeeNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_employee_number() {
        assert_eq!(EmployeeNumber::create(" emp-001 ").unwrap().as_str(), "EMP-001");
        assert!(EmployeeNumber::create("E1").is_err());
        assert!(EmployeeNumber::create("EMP 001").is_err());
    }
}
