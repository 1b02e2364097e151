//! Establishment address repository implementation

use super::{id_column, stored, DependentRepository, Repository};
use crate::error::db;
use crate::Result;
use async_trait::async_trait;
use nest_admin_core::address::EstablishmentAddress;
use nest_admin_core::ids::EstablishmentAddressId;
use nest_admin_core::primary::PrimaryFlagged;
use nest_admin_core::values::{Address, AddressFields, Coordinates};
use nest_admin_core::Outcome;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use tracing::debug;

const ENTITY: &str = "EstablishmentAddress";

/// Repository for establishment addresses
#[derive(Debug, Default, Clone, Copy)]
pub struct AddressRepository;

#[async_trait]
impl Repository for AddressRepository {
    type Entity = EstablishmentAddress;
    type Id = EstablishmentAddressId;

    const TABLE: &'static str = "establishment_addresses";
    const COLUMNS: &'static str = "id, establishment_id, address_line, municipality, city, \
                                   province, region, country, lat_e6, lon_e6, is_primary";

    fn from_row(row: &SqliteRow) -> Result<EstablishmentAddress> {
        let coordinates = stored(
            ENTITY,
            Coordinates::from_micro_degrees(row.try_get("lat_e6")?, row.try_get("lon_e6")?),
        )?;
        let fields = AddressFields {
            address_line: row.try_get("address_line")?,
            municipality: row.try_get("municipality")?,
            city: row.try_get("city")?,
            province: row.try_get("province")?,
            region: row.try_get("region")?,
            country: row.try_get("country")?,
            latitude: coordinates.latitude(),
            longitude: coordinates.longitude(),
        };
        Ok(EstablishmentAddress::restore(
            id_column(row, ENTITY, "id")?,
            id_column(row, ENTITY, "establishment_id")?,
            stored(ENTITY, Address::create(fields))?,
            row.try_get("is_primary")?,
        ))
    }

    async fn add(&self, conn: &mut SqliteConnection, entity: &EstablishmentAddress) -> Outcome<()> {
        debug!(
            "Creating address {} for establishment {}",
            entity.id(),
            entity.establishment_id()
        );
        let address = entity.address();
        sqlx::query(
            r#"
            INSERT INTO establishment_addresses (
                id, establishment_id, address_line, municipality, city,
                province, region, country, lat_e6, lon_e6, is_primary
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(entity.id().to_string())
        .bind(entity.establishment_id().to_string())
        .bind(address.address_line())
        .bind(address.municipality())
        .bind(address.city())
        .bind(address.province())
        .bind(address.region())
        .bind(address.country())
        .bind(address.coordinates().lat_e6())
        .bind(address.coordinates().lon_e6())
        .bind(entity.is_primary())
        .execute(&mut *conn)
        .await
        .map_err(db)?;
        Ok(())
    }

    async fn update(
        &self,
        conn: &mut SqliteConnection,
        entity: &EstablishmentAddress,
    ) -> Outcome<EstablishmentAddress> {
        debug!("Updating address {}", entity.id());
        let address = entity.address();
        let result = sqlx::query(
            r#"
            UPDATE establishment_addresses
            SET address_line = ?2, municipality = ?3, city = ?4, province = ?5,
                region = ?6, country = ?7, lat_e6 = ?8, lon_e6 = ?9, is_primary = ?10
            WHERE id = ?1
            "#,
        )
        .bind(entity.id().to_string())
        .bind(address.address_line())
        .bind(address.municipality())
        .bind(address.city())
        .bind(address.province())
        .bind(address.region())
        .bind(address.country())
        .bind(address.coordinates().lat_e6())
        .bind(address.coordinates().lon_e6())
        .bind(entity.is_primary())
        .execute(&mut *conn)
        .await
        .map_err(db)?;
        if result.rows_affected() == 0 {
            return Err(super::not_found::<EstablishmentAddress>(entity.id()));
        }
        Ok(entity.clone())
    }
}

impl DependentRepository for AddressRepository {}
