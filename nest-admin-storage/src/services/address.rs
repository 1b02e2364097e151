//! Establishment address service

use super::{duplicate, ensure_establishment, ensure_parent, ServiceContext};
use crate::error::db;
use crate::primary::PrimaryCoordinator;
use crate::repositories::{AddressRepository, Repository};
use nest_admin_core::address::{AddressFilter, EstablishmentAddress};
use nest_admin_core::ids::{EstablishmentAddressId, EstablishmentId};
use nest_admin_core::pagination::{Page, PageRequest};
use nest_admin_core::specification::same_values;
use nest_admin_core::values::{Address, AddressFields, AddressPatch};
use nest_admin_core::Outcome;
use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAddress {
    pub establishment_id: EstablishmentId,
    #[serde(flatten)]
    pub address: AddressFields,
    pub is_primary: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAddress {
    pub id: EstablishmentAddressId,
    pub establishment_id: EstablishmentId,
    #[serde(flatten)]
    pub address: AddressFields,
    pub is_primary: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchAddress {
    pub id: EstablishmentAddressId,
    pub establishment_id: EstablishmentId,
    #[serde(flatten)]
    pub patch: AddressPatch,
    pub is_primary: Option<bool>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeleteAddress {
    pub id: EstablishmentAddressId,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GetAddress {
    pub id: EstablishmentAddressId,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListAddresses {
    #[serde(flatten)]
    pub filter: AddressFilter,
    #[serde(flatten)]
    pub page: PageRequest,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CountAddresses {
    #[serde(flatten)]
    pub filter: AddressFilter,
}

/// Service for establishment addresses
#[derive(Debug, Clone)]
pub struct AddressService {
    context: ServiceContext,
    repository: AddressRepository,
    coordinator: PrimaryCoordinator<AddressRepository>,
}

impl AddressService {
    pub fn new(context: ServiceContext) -> Self {
        Self {
            context,
            repository: AddressRepository,
            coordinator: PrimaryCoordinator::new(AddressRepository),
        }
    }

    pub async fn create(&self, command: CreateAddress) -> Outcome<EstablishmentAddress> {
        let address = Address::create(command.address)?;
        let record = EstablishmentAddress::create(command.establishment_id, address, command.is_primary);

        let _guard = self.context.locks().acquire(command.establishment_id).await;
        let mut tx = self.context.begin().await?;
        let saved = self.save(&mut tx, record, None).await?;
        tx.commit().await.map_err(db)?;

        info!(
            "Created address {} for establishment {} (primary: {})",
            saved.id(),
            saved.establishment_id(),
            command.is_primary
        );
        Ok(saved)
    }

    pub async fn update(&self, command: UpdateAddress) -> Outcome<EstablishmentAddress> {
        let address = Address::create(command.address)?;

        let _guard = self.context.locks().acquire(command.establishment_id).await;
        let mut tx = self.context.begin().await?;
        let existing = self.repository.get_by_id(&mut tx, command.id).await?;
        ensure_parent::<EstablishmentAddress>(existing.establishment_id(), command.establishment_id)?;

        let updated = existing
            .clone()
            .with_address(address)
            .with_primary(command.is_primary);
        let saved = self.save(&mut tx, updated, Some(&existing)).await?;
        tx.commit().await.map_err(db)?;

        info!("Updated address {}", saved.id());
        Ok(saved)
    }

    pub async fn patch(&self, command: PatchAddress) -> Outcome<EstablishmentAddress> {
        let _guard = self.context.locks().acquire(command.establishment_id).await;
        let mut tx = self.context.begin().await?;
        let existing = self.repository.get_by_id(&mut tx, command.id).await?;
        ensure_parent::<EstablishmentAddress>(existing.establishment_id(), command.establishment_id)?;

        let mut patched = existing.clone();
        if !command.patch.is_empty() {
            let address = existing.address().with_patch(command.patch)?;
            patched = patched.with_address(address);
        }
        if let Some(is_primary) = command.is_primary {
            patched = patched.with_primary(is_primary);
        }
        let saved = self.save(&mut tx, patched, Some(&existing)).await?;
        tx.commit().await.map_err(db)?;

        info!("Patched address {}", saved.id());
        Ok(saved)
    }

    pub async fn delete(&self, command: DeleteAddress) -> Outcome<()> {
        let deleted = self
            .context
            .delete_dependent(&self.coordinator, &self.repository, command.id)
            .await?;
        info!(
            "Deleted address {} of establishment {}",
            command.id,
            deleted.establishment_id()
        );
        Ok(())
    }

    pub async fn get(&self, query: GetAddress) -> Outcome<EstablishmentAddress> {
        debug!("Getting address {}", query.id);
        self.context.get(&self.repository, query.id).await
    }

    pub async fn list(&self, query: ListAddresses) -> Outcome<Page<EstablishmentAddress>> {
        self.context
            .list(&self.repository, query.filter.criteria(), &query.page)
            .await
    }

    pub async fn count(&self, query: CountAddresses) -> Outcome<i64> {
        self.context.count(&self.repository, query.filter.criteria()).await
    }

    async fn save(
        &self,
        conn: &mut SqliteConnection,
        record: EstablishmentAddress,
        existing: Option<&EstablishmentAddress>,
    ) -> Outcome<EstablishmentAddress> {
        match existing {
            Some(existing) if same_values(existing, &record) => {
                debug!("Address {} unchanged", existing.id());
                return Ok(existing.clone());
            }
            Some(_) => {}
            None => {
                ensure_establishment(conn, record.establishment_id(), "Establishment.NotFound").await?;
            }
        }

        let coordinates = record.address().coordinates();
        let taken = self
            .context
            .uniqueness()
            .address(
                conn,
                coordinates,
                record.establishment_id(),
                existing.map(EstablishmentAddress::id),
            )
            .await?;
        if taken {
            return Err(duplicate::<EstablishmentAddress>(format!(
                "coordinates ({}, {})",
                coordinates.latitude(),
                coordinates.longitude()
            )));
        }

        self.coordinator.before_write(conn, &record).await?;
        match existing {
            Some(_) => self.repository.update(conn, &record).await,
            None => {
                self.repository.add(conn, &record).await?;
                Ok(record)
            }
        }
    }
}

handlers!(AddressService {
    CreateAddress => EstablishmentAddress : create,
    UpdateAddress => EstablishmentAddress : update,
    PatchAddress => EstablishmentAddress : patch,
    DeleteAddress => () : delete,
    GetAddress => EstablishmentAddress : get,
    ListAddresses => Page<EstablishmentAddress> : list,
    CountAddresses => i64 : count,
});
