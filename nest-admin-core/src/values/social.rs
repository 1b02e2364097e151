use super::check_length;
use crate::{Combine, Failure, Outcome, ValidationErrors};
use serde::Serialize;
use std::hash::{Hash, Hasher};
use url::Url;

/// Name and home page of a social media platform.
///
/// Names compare case-insensitively; the URL must be http or https.
#[derive(Debug, Clone, Serialize)]
pub struct SocialMediaName {
    name: String,
    platform_url: Url,
}

fn parse_platform_url(raw: &str) -> Outcome<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| {
        Failure::validation(
            "SocialMediaName.InvalidUrl",
            format!("'{}' is not a valid URL: {}", raw.trim(), e),
        )
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Failure::validation(
            "SocialMediaName.UnsupportedScheme",
            format!("Platform URL must use http or https, not {other}"),
        )),
    }
}

impl SocialMediaName {
    pub fn create(name: &str, platform_url: &str) -> Outcome<Self> {
        let name = name.trim();
        let mut errors = ValidationErrors::new();
        check_length(&mut errors, "SocialMediaName.Name", "Platform name", name, 2, 50);
        let (name, platform_url) = (
            errors.finish(|| name.to_string()),
            parse_platform_url(platform_url),
        )
            .combine()?;
        Ok(Self { name, platform_url })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn platform_url(&self) -> &Url {
        &self.platform_url
    }

    pub fn with_name(&self, name: &str) -> Outcome<Self> {
        Self::create(name, self.platform_url.as_str())
    }

    pub fn with_platform_url(&self, platform_url: &str) -> Outcome<Self> {
        Self::create(&self.name, platform_url)
    }
}

impl PartialEq for SocialMediaName {
    fn eq(&self, other: &Self) -> bool {
        self.name.to_lowercase() == other.name.to_lowercase() && self.platform_url == other.platform_url
    }
}

impl Eq for SocialMediaName {}

impl Hash for SocialMediaName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.to_lowercase().hash(state);
        self.platform_url.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_social_media_name() {
        let a = SocialMediaName::create("Instagram", "https://instagram.com").unwrap();
        let b = SocialMediaName::create("INSTAGRAM", "https://instagram.com/").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.platform_url().host_str(), Some("instagram.com"));
    }

    #[test]
    fn test_social_media_name_errors_are_combined() {
        let failure = SocialMediaName::create("X", "ftp://files.example").unwrap_err();
        assert!(failure.has_code("SocialMediaName.Name.InvalidLength"));
        assert!(failure.has_code("SocialMediaName.UnsupportedScheme"));
        assert!(SocialMediaName::create("Threads", "not a url").is_err());
    }
}
