//! Social media platform repository implementation

use super::{id_column, stored, Repository};
use crate::error::db;
use crate::Result;
use async_trait::async_trait;
use nest_admin_core::ids::SocialMediaId;
use nest_admin_core::social::SocialMediaPlatform;
use nest_admin_core::values::SocialMediaName;
use nest_admin_core::Outcome;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use tracing::debug;

const ENTITY: &str = "SocialMediaPlatform";

/// Repository for social media platforms
#[derive(Debug, Default, Clone, Copy)]
pub struct SocialMediaRepository;

#[async_trait]
impl Repository for SocialMediaRepository {
    type Entity = SocialMediaPlatform;
    type Id = SocialMediaId;

    const TABLE: &'static str = "social_media_platforms";
    const COLUMNS: &'static str = "id, name, platform_url";

    fn from_row(row: &SqliteRow) -> Result<SocialMediaPlatform> {
        let name: String = row.try_get("name")?;
        let url: String = row.try_get("platform_url")?;
        Ok(SocialMediaPlatform::restore(
            id_column(row, ENTITY, "id")?,
            stored(ENTITY, SocialMediaName::create(&name, &url))?,
        ))
    }

    async fn add(&self, conn: &mut SqliteConnection, entity: &SocialMediaPlatform) -> Outcome<()> {
        debug!("Creating social media platform: {}", entity.name().name());
        sqlx::query("INSERT INTO social_media_platforms (id, name, platform_url) VALUES (?1, ?2, ?3)")
            .bind(entity.id().to_string())
            .bind(entity.name().name())
            .bind(entity.name().platform_url().as_str())
            .execute(&mut *conn)
            .await
            .map_err(db)?;
        Ok(())
    }

    async fn update(
        &self,
        conn: &mut SqliteConnection,
        entity: &SocialMediaPlatform,
    ) -> Outcome<SocialMediaPlatform> {
        debug!("Updating social media platform: {}", entity.id());
        let result =
            sqlx::query("UPDATE social_media_platforms SET name = ?2, platform_url = ?3 WHERE id = ?1")
                .bind(entity.id().to_string())
                .bind(entity.name().name())
                .bind(entity.name().platform_url().as_str())
                .execute(&mut *conn)
                .await
                .map_err(db)?;
        if result.rows_affected() == 0 {
            return Err(super::not_found::<SocialMediaPlatform>(entity.id()));
        }
        Ok(entity.clone())
    }
}
