//! Establishment phone repository implementation

use super::{id_column, stored, DependentRepository, Repository};
use crate::error::db;
use crate::Result;
use async_trait::async_trait;
use nest_admin_core::ids::EstablishmentPhoneId;
use nest_admin_core::phone::EstablishmentPhone;
use nest_admin_core::primary::PrimaryFlagged;
use nest_admin_core::values::PhoneNumber;
use nest_admin_core::Outcome;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use tracing::debug;

const ENTITY: &str = "EstablishmentPhone";

/// Repository for establishment phone numbers
#[derive(Debug, Default, Clone, Copy)]
pub struct PhoneRepository;

#[async_trait]
impl Repository for PhoneRepository {
    type Entity = EstablishmentPhone;
    type Id = EstablishmentPhoneId;

    const TABLE: &'static str = "establishment_phones";
    const COLUMNS: &'static str = "id, establishment_id, phone_number, is_primary";

    fn from_row(row: &SqliteRow) -> Result<EstablishmentPhone> {
        let phone: String = row.try_get("phone_number")?;
        Ok(EstablishmentPhone::restore(
            id_column(row, ENTITY, "id")?,
            id_column(row, ENTITY, "establishment_id")?,
            stored(ENTITY, PhoneNumber::create(&phone))?,
            row.try_get("is_primary")?,
        ))
    }

    async fn add(&self, conn: &mut SqliteConnection, entity: &EstablishmentPhone) -> Outcome<()> {
        debug!(
            "Creating phone {} for establishment {}",
            entity.id(),
            entity.establishment_id()
        );
        sqlx::query(
            "INSERT INTO establishment_phones (id, establishment_id, phone_number, is_primary) \
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(entity.id().to_string())
        .bind(entity.establishment_id().to_string())
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
        entity: &EstablishmentPhone,
    ) -> Outcome<EstablishmentPhone> {
        debug!("Updating phone {}", entity.id());
        let result = sqlx::query(
            "UPDATE establishment_phones SET phone_number = ?2, is_primary = ?3 WHERE id = ?1",
        )
        .bind(entity.id().to_string())
        .bind(entity.phone().digits())
        .bind(entity.is_primary())
        .execute(&mut *conn)
        .await
        .map_err(db)?;
        if result.rows_affected() == 0 {
            return Err(super::not_found::<EstablishmentPhone>(entity.id()));
        }
        Ok(entity.clone())
    }
}

impl DependentRepository for PhoneRepository {}

#[cfg(test)]
mod tests {
    include!("phone_tests.rs");
}
