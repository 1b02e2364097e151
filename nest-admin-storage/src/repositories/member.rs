//! Establishment member repository implementation

use super::{id_column, stored, Repository};
use crate::error::db;
use crate::Result;
use async_trait::async_trait;
use nest_admin_core::ids::EstablishmentMemberId;
use nest_admin_core::member::EstablishmentMember;
use nest_admin_core::values::{MemberDescription, MemberTag, MemberTitle};
use nest_admin_core::Outcome;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use tracing::debug;

const ENTITY: &str = "EstablishmentMember";

/// Repository for establishment members
#[derive(Debug, Default, Clone, Copy)]
pub struct MemberRepository;

#[async_trait]
impl Repository for MemberRepository {
    type Entity = EstablishmentMember;
    type Id = EstablishmentMemberId;

    const TABLE: &'static str = "establishment_members";
    const COLUMNS: &'static str = "id, establishment_id, employee_id, title, description, tag";

    fn from_row(row: &SqliteRow) -> Result<EstablishmentMember> {
        let title: String = row.try_get("title")?;
        let description: String = row.try_get("description")?;
        let tag: String = row.try_get("tag")?;
        Ok(EstablishmentMember::restore(
            id_column(row, ENTITY, "id")?,
            id_column(row, ENTITY, "establishment_id")?,
            id_column(row, ENTITY, "employee_id")?,
            stored(ENTITY, MemberTitle::create(&title))?,
            stored(ENTITY, MemberDescription::create(&description))?,
            stored(ENTITY, MemberTag::create(&tag))?,
        ))
    }

    async fn add(&self, conn: &mut SqliteConnection, entity: &EstablishmentMember) -> Outcome<()> {
        debug!(
            "Adding employee {} as member of establishment {}",
            entity.employee_id(),
            entity.establishment_id()
        );
        sqlx::query(
            r#"
            INSERT INTO establishment_members (id, establishment_id, employee_id, title, description, tag)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(entity.id().to_string())
        .bind(entity.establishment_id().to_string())
        .bind(entity.employee_id().to_string())
        .bind(entity.title().as_str())
        .bind(entity.description().as_str())
        .bind(entity.tag().as_str())
        .execute(&mut *conn)
        .await
        .map_err(db)?;
        Ok(())
    }

    async fn update(
        &self,
        conn: &mut SqliteConnection,
        entity: &EstablishmentMember,
    ) -> Outcome<EstablishmentMember> {
        debug!("Updating member {}", entity.id());
        let result = sqlx::query(
            r#"
            UPDATE establishment_members
            SET employee_id = ?2, title = ?3, description = ?4, tag = ?5
            WHERE id = ?1
            "#,
        )
        .bind(entity.id().to_string())
        .bind(entity.employee_id().to_string())
        .bind(entity.title().as_str())
        .bind(entity.description().as_str())
        .bind(entity.tag().as_str())
        .execute(&mut *conn)
        .await
        .map_err(db)?;
        if result.rows_affected() == 0 {
            return Err(super::not_found::<EstablishmentMember>(entity.id()));
        }
        Ok(entity.clone())
    }
}
