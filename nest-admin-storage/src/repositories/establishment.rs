//! Establishment repository implementation

use super::{id_column, stored, Repository};
use crate::error::db;
use crate::Result;
use async_trait::async_trait;
use nest_admin_core::establishment::{Establishment, EstablishmentStatus};
use nest_admin_core::ids::EstablishmentId;
use nest_admin_core::values::{EmailAddress, EstablishmentName};
use nest_admin_core::Outcome;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use tracing::{debug, info};

const ENTITY: &str = "Establishment";

/// Repository for establishment entities
#[derive(Debug, Default, Clone, Copy)]
pub struct EstablishmentRepository;

#[async_trait]
impl Repository for EstablishmentRepository {
    type Entity = Establishment;
    type Id = EstablishmentId;

    const TABLE: &'static str = "establishments";
    const COLUMNS: &'static str = "id, name, email, status";

    fn from_row(row: &SqliteRow) -> Result<Establishment> {
        let id = id_column(row, ENTITY, "id")?;
        let name: String = row.try_get("name")?;
        let email: String = row.try_get("email")?;
        let status: i32 = row.try_get("status")?;
        Ok(Establishment::restore(
            id,
            stored(ENTITY, EstablishmentName::create(&name))?,
            stored(ENTITY, EmailAddress::create(&email))?,
            stored(ENTITY, EstablishmentStatus::from_id(status))?,
        ))
    }

    async fn add(&self, conn: &mut SqliteConnection, entity: &Establishment) -> Outcome<()> {
        debug!("Creating establishment: {} ({})", entity.name(), entity.id());
        sqlx::query("INSERT INTO establishments (id, name, email, status) VALUES (?1, ?2, ?3, ?4)")
            .bind(entity.id().to_string())
            .bind(entity.name().as_str())
            .bind(entity.email().as_str())
            .bind(entity.status().id())
            .execute(&mut *conn)
            .await
            .map_err(db)?;
        info!("Created establishment: {} ({})", entity.name(), entity.id());
        Ok(())
    }

    async fn update(
        &self,
        conn: &mut SqliteConnection,
        entity: &Establishment,
    ) -> Outcome<Establishment> {
        debug!("Updating establishment: {}", entity.id());
        let result =
            sqlx::query("UPDATE establishments SET name = ?2, email = ?3, status = ?4 WHERE id = ?1")
                .bind(entity.id().to_string())
                .bind(entity.name().as_str())
                .bind(entity.email().as_str())
                .bind(entity.status().id())
                .execute(&mut *conn)
                .await
                .map_err(db)?;
        if result.rows_affected() == 0 {
            return Err(super::not_found::<Establishment>(entity.id()));
        }
        Ok(entity.clone())
    }
}
