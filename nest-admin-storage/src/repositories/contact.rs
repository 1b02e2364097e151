//! Establishment contact repository implementation

use super::{id_column, optional_text, stored, DependentRepository, Repository};
use crate::error::db;
use crate::Result;
use async_trait::async_trait;
use nest_admin_core::contact::EstablishmentContact;
use nest_admin_core::ids::EstablishmentContactId;
use nest_admin_core::primary::PrimaryFlagged;
use nest_admin_core::values::{PersonName, PhoneNumber};
use nest_admin_core::Outcome;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use tracing::debug;

const ENTITY: &str = "EstablishmentContact";

/// Repository for establishment contact persons
#[derive(Debug, Default, Clone, Copy)]
pub struct ContactRepository;

#[async_trait]
impl Repository for ContactRepository {
    type Entity = EstablishmentContact;
    type Id = EstablishmentContactId;

    const TABLE: &'static str = "establishment_contacts";
    const COLUMNS: &'static str =
        "id, establishment_id, first_name, middle_name, last_name, phone_number, is_primary";

    fn from_row(row: &SqliteRow) -> Result<EstablishmentContact> {
        let first: String = row.try_get("first_name")?;
        let middle = optional_text(row.try_get("middle_name")?);
        let last: String = row.try_get("last_name")?;
        let phone: String = row.try_get("phone_number")?;
        Ok(EstablishmentContact::restore(
            id_column(row, ENTITY, "id")?,
            id_column(row, ENTITY, "establishment_id")?,
            stored(ENTITY, PersonName::create(&first, middle.as_deref(), &last))?,
            stored(ENTITY, PhoneNumber::create(&phone))?,
            row.try_get("is_primary")?,
        ))
    }

    async fn add(&self, conn: &mut SqliteConnection, entity: &EstablishmentContact) -> Outcome<()> {
        debug!(
            "Creating contact {} for establishment {}",
            entity.id(),
            entity.establishment_id()
        );
        let person = entity.person();
        sqlx::query(
            r#"
            INSERT INTO establishment_contacts (
                id, establishment_id, first_name, middle_name, last_name, phone_number, is_primary
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(entity.id().to_string())
        .bind(entity.establishment_id().to_string())
        .bind(person.first())
        .bind(person.middle().unwrap_or_default())
        .bind(person.last())
        .bind(entity.phone().digits())
        .bind(entity.is_primary())
        .execute(&mut *conn)
        .await
        .map_err(db)?;
        Ok(())
    }

    async fn update(
        &self,
        conn: &mut SqliteConnection,
        entity: &EstablishmentContact,
    ) -> Outcome<EstablishmentContact> {
        debug!("Updating contact {}", entity.id());
        let person = entity.person();
        let result = sqlx::query(
            r#"
            UPDATE establishment_contacts
            SET first_name = ?2, middle_name = ?3, last_name = ?4, phone_number = ?5, is_primary = ?6
            WHERE id = ?1
            "#,
        )
        .bind(entity.id().to_string())
        .bind(person.first())
        .bind(person.middle().unwrap_or_default())
        .bind(person.last())
        .bind(entity.phone().digits())
        .bind(entity.is_primary())
        .execute(&mut *conn)
        .await
        .map_err(db)?;
        if result.rows_affected() == 0 {
            return Err(super::not_found::<EstablishmentContact>(entity.id()));
        }
        Ok(entity.clone())
    }
}

impl DependentRepository for ContactRepository {}
