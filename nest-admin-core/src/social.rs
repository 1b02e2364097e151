//! Social media platforms

use crate::ids::{SocialMediaId, TypedId};
use crate::specification::{Criteria, Queryable, Value};
use crate::values::SocialMediaName;
use serde::{Deserialize, Serialize};

/// A social media platform establishments can link to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SocialMediaPlatform {
    id: SocialMediaId,
    name: SocialMediaName,
}

impl SocialMediaPlatform {
    pub fn create(name: SocialMediaName) -> Self {
        Self::restore(SocialMediaId::new(), name)
    }

    pub fn restore(id: SocialMediaId, name: SocialMediaName) -> Self {
        Self { id, name }
    }

    pub fn id(&self) -> SocialMediaId {
        self.id
    }

    pub fn name(&self) -> &SocialMediaName {
        &self.name
    }

    #[must_use]
    pub fn with_name(self, name: SocialMediaName) -> Self {
        Self { name, ..self }
    }
}

entity_fields!(SocialMediaField {
    Id => "id",
    Name => "name",
    PlatformUrl => "platform_url",
});

impl Queryable for SocialMediaPlatform {
    type Field = SocialMediaField;
    const ENTITY: &'static str = "SocialMediaPlatform";

    fn id_field() -> SocialMediaField {
        SocialMediaField::Id
    }

    fn value_of(&self, field: SocialMediaField) -> Value {
        match field {
            SocialMediaField::Id => self.id.as_uuid().into(),
            SocialMediaField::Name => self.name.name().into(),
            SocialMediaField::PlatformUrl => self.name.platform_url().as_str().into(),
        }
    }
}

/// Listing filter for platforms
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SocialMediaFilter {
    pub name: Option<String>,
}

impl SocialMediaFilter {
    pub fn criteria(&self) -> Criteria<SocialMediaField> {
        Criteria::All.and_maybe(self.name.clone(), |n| Criteria::contains(SocialMediaField::Name, n))
    }
}
