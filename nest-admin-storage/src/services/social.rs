//! Social media platform service

use super::{duplicate, ServiceContext};
use crate::error::db;
use crate::repositories::{Repository, SocialMediaRepository};
use nest_admin_core::ids::SocialMediaId;
use nest_admin_core::pagination::{Page, PageRequest};
use nest_admin_core::social::{SocialMediaFilter, SocialMediaPlatform};
use nest_admin_core::specification::same_values;
use nest_admin_core::values::SocialMediaName;
use nest_admin_core::Outcome;
use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSocialMedia {
    pub name: String,
    pub platform_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSocialMedia {
    pub id: SocialMediaId,
    pub name: String,
    pub platform_url: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeleteSocialMedia {
    pub id: SocialMediaId,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GetSocialMedia {
    pub id: SocialMediaId,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListSocialMedia {
    #[serde(flatten)]
    pub filter: SocialMediaFilter,
    #[serde(flatten)]
    pub page: PageRequest,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CountSocialMedia {
    #[serde(flatten)]
    pub filter: SocialMediaFilter,
}

/// Service for social media platforms
#[derive(Debug, Clone)]
pub struct SocialMediaService {
    context: ServiceContext,
    repository: SocialMediaRepository,
}

impl SocialMediaService {
    pub fn new(context: ServiceContext) -> Self {
        Self {
            context,
            repository: SocialMediaRepository,
        }
    }

    pub async fn create(&self, command: CreateSocialMedia) -> Outcome<SocialMediaPlatform> {
        let name = SocialMediaName::create(&command.name, &command.platform_url)?;
        let platform = SocialMediaPlatform::create(name);

        let mut tx = self.context.begin().await?;
        let saved = self.save(&mut tx, platform, None).await?;
        tx.commit().await.map_err(db)?;

        info!("Created social media platform {} ({})", saved.name().name(), saved.id());
        Ok(saved)
    }

    pub async fn update(&self, command: UpdateSocialMedia) -> Outcome<SocialMediaPlatform> {
        let name = SocialMediaName::create(&command.name, &command.platform_url)?;

        let mut tx = self.context.begin().await?;
        let existing = self.repository.get_by_id(&mut tx, command.id).await?;
        let saved = self
            .save(&mut tx, existing.clone().with_name(name), Some(&existing))
            .await?;
        tx.commit().await.map_err(db)?;

        info!("Updated social media platform {}", saved.id());
        Ok(saved)
    }

    pub async fn delete(&self, command: DeleteSocialMedia) -> Outcome<()> {
        let mut tx = self.context.begin().await?;
        self.repository.delete(&mut tx, command.id).await?;
        tx.commit().await.map_err(db)?;

        info!("Deleted social media platform {}", command.id);
        Ok(())
    }

    pub async fn get(&self, query: GetSocialMedia) -> Outcome<SocialMediaPlatform> {
        debug!("Getting social media platform {}", query.id);
        self.context.get(&self.repository, query.id).await
    }

    pub async fn list(&self, query: ListSocialMedia) -> Outcome<Page<SocialMediaPlatform>> {
        self.context
            .list(&self.repository, query.filter.criteria(), &query.page)
            .await
    }

    pub async fn count(&self, query: CountSocialMedia) -> Outcome<i64> {
        self.context.count(&self.repository, query.filter.criteria()).await
    }

    async fn save(
        &self,
        conn: &mut SqliteConnection,
        platform: SocialMediaPlatform,
        existing: Option<&SocialMediaPlatform>,
    ) -> Outcome<SocialMediaPlatform> {
        if let Some(existing) = existing {
            if same_values(existing, &platform) {
                debug!("Social media platform {} unchanged", existing.id());
                return Ok(existing.clone());
            }
        }

        let taken = self
            .context
            .uniqueness()
            .social_media(conn, platform.name(), existing.map(SocialMediaPlatform::id))
            .await?;
        if taken {
            return Err(duplicate::<SocialMediaPlatform>(format!(
                "name '{}'",
                platform.name().name()
            )));
        }

        match existing {
            Some(_) => self.repository.update(conn, &platform).await,
            None => {
                self.repository.add(conn, &platform).await?;
                Ok(platform)
            }
        }
    }
}

handlers!(SocialMediaService {
    CreateSocialMedia => SocialMediaPlatform : create,
    UpdateSocialMedia => SocialMediaPlatform : update,
    DeleteSocialMedia => () : delete,
    GetSocialMedia => SocialMediaPlatform : get,
    ListSocialMedia => Page<SocialMediaPlatform> : list,
    CountSocialMedia => i64 : count,
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::memory_pool;
    use nest_admin_core::pagination::ListingConfig;
    use nest_admin_core::ErrorKind;

    async fn setup_test_service() -> SocialMediaService {
        let pool = memory_pool().await;
        SocialMediaService::new(ServiceContext::new(pool, ListingConfig::default()))
    }

    fn create(name: &str, url: &str) -> CreateSocialMedia {
        CreateSocialMedia {
            name: name.to_string(),
            platform_url: url.to_string(),
        }
    }

    #[tokio::test]
    async fn test_platform_lifecycle() {
        let service = setup_test_service().await;
        let platform = service
            .create(create("Facebook", "https://facebook.com"))
            .await
            .unwrap();

        let failure = service
            .create(create("FACEBOOK", "https://fb.com"))
            .await
            .unwrap_err();
        assert_eq!(failure.kind(), ErrorKind::Conflict);

        let same = service
            .update(UpdateSocialMedia {
                id: platform.id(),
                name: "Facebook".to_string(),
                platform_url: "https://facebook.com/".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(same, platform);

        let moved = service
            .update(UpdateSocialMedia {
                id: platform.id(),
                name: "Facebook".to_string(),
                platform_url: "https://www.facebook.com".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(moved.name().platform_url().as_str(), "https://www.facebook.com/");

        service
            .delete(DeleteSocialMedia { id: platform.id() })
            .await
            .unwrap();
        let failure = service
            .get(GetSocialMedia { id: platform.id() })
            .await
            .unwrap_err();
        assert_eq!(failure.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_invalid_url_is_rejected() {
        let service = setup_test_service().await;
        let failure = service
            .create(create("Gopher", "gopher://example.com"))
            .await
            .unwrap_err();
        assert_eq!(failure.kind(), ErrorKind::Validation);
        assert_eq!(service.count(CountSocialMedia::default()).await.unwrap(), 0);
    }
}
