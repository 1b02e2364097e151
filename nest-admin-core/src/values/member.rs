use super::check_length;
use crate::{Outcome, ValidationErrors};
use serde::Serialize;

/// Position of a member within an establishment, e.g. "Head Chef"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MemberTitle(String);

impl MemberTitle {
    pub fn create(raw: &str) -> Outcome<Self> {
        let value = raw.trim();
        let mut errors = ValidationErrors::new();
        check_length(&mut errors, "MemberTitle", "Member title", value, 1, 100);
        errors.finish(|| Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Free-form description; may be empty
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MemberDescription(String);

impl MemberDescription {
    pub fn create(raw: &str) -> Outcome<Self> {
        let value = raw.trim();
        let mut errors = ValidationErrors::new();
        check_length(&mut errors, "MemberDescription", "Member description", value, 0, 500);
        errors.finish(|| Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Short single-word label used to group members
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MemberTag(String);

impl MemberTag {
    pub fn create(raw: &str) -> Outcome<Self> {
        let value = raw.trim();
        let mut errors = ValidationErrors::new();
        check_length(&mut errors, "MemberTag", "Member tag", value, 1, 50);
        errors.ensure(
            !value.chars().any(char::is_whitespace),
            "MemberTag.ContainsWhitespace",
            "Member tag cannot contain whitespace",
        );
        errors.finish(|| Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_values() {
        assert!(MemberTitle::create("Head Chef").is_ok());
        assert!(MemberTitle::create(" ").unwrap_err().has_code("MemberTitle.Required"));
        assert_eq!(MemberDescription::create("").unwrap().as_str(), "");
        assert!(MemberDescription::create(&"x".repeat(501)).is_err());
        assert!(MemberTag::create("kitchen").is_ok());
        assert!(MemberTag::create("front desk")
            .unwrap_err()
            .has_code("MemberTag.ContainsWhitespace"));
    }
}
