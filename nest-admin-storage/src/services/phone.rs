//! Establishment phone service

use super::{duplicate, ensure_establishment, ensure_parent, ServiceContext};
use crate::error::db;
use crate::primary::PrimaryCoordinator;
use crate::repositories::{PhoneRepository, Repository};
use nest_admin_core::ids::{EstablishmentId, EstablishmentPhoneId};
use nest_admin_core::pagination::{Page, PageRequest};
use nest_admin_core::phone::{EstablishmentPhone, PhoneFilter};
use nest_admin_core::specification::same_values;
use nest_admin_core::values::PhoneNumber;
use nest_admin_core::Outcome;
use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePhone {
    pub establishment_id: EstablishmentId,
    pub phone_number: String,
    pub is_primary: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePhone {
    pub id: EstablishmentPhoneId,
    pub establishment_id: EstablishmentId,
    pub phone_number: String,
    pub is_primary: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchPhone {
    pub id: EstablishmentPhoneId,
    pub establishment_id: EstablishmentId,
    pub phone_number: Option<String>,
    pub is_primary: Option<bool>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeletePhone {
    pub id: EstablishmentPhoneId,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GetPhone {
    pub id: EstablishmentPhoneId,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListPhones {
    #[serde(flatten)]
    pub filter: PhoneFilter,
    #[serde(flatten)]
    pub page: PageRequest,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CountPhones {
    #[serde(flatten)]
    pub filter: PhoneFilter,
}

/// Whether an establishment already has a phone with these digits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhoneExists {
    pub establishment_id: EstablishmentId,
    pub phone_number: String,
    /// Phone to leave out of the check, usually the one being edited
    pub excluded: Option<EstablishmentPhoneId>,
}

/// Service for establishment phone lines
#[derive(Debug, Clone)]
pub struct PhoneService {
    context: ServiceContext,
    repository: PhoneRepository,
    coordinator: PrimaryCoordinator<PhoneRepository>,
}

impl PhoneService {
    pub fn new(context: ServiceContext) -> Self {
        Self {
            context,
            repository: PhoneRepository,
            coordinator: PrimaryCoordinator::new(PhoneRepository),
        }
    }

    pub async fn create(&self, command: CreatePhone) -> Outcome<EstablishmentPhone> {
        let phone = PhoneNumber::create(&command.phone_number)?;
        let record = EstablishmentPhone::create(command.establishment_id, phone, command.is_primary);

        let _guard = self.context.locks().acquire(command.establishment_id).await;
        let mut tx = self.context.begin().await?;
        let saved = self.save(&mut tx, record, None).await?;
        tx.commit().await.map_err(db)?;

        info!(
            "Created phone {} for establishment {} (primary: {})",
            saved.phone(),
            saved.establishment_id(),
            command.is_primary
        );
        Ok(saved)
    }

    pub async fn update(&self, command: UpdatePhone) -> Outcome<EstablishmentPhone> {
        let phone = PhoneNumber::create(&command.phone_number)?;

        let _guard = self.context.locks().acquire(command.establishment_id).await;
        let mut tx = self.context.begin().await?;
        let existing = self.repository.get_by_id(&mut tx, command.id).await?;
        ensure_parent::<EstablishmentPhone>(existing.establishment_id(), command.establishment_id)?;

        let updated = existing
            .clone()
            .with_phone(phone)
            .with_primary(command.is_primary);
        let saved = self.save(&mut tx, updated, Some(&existing)).await?;
        tx.commit().await.map_err(db)?;

        info!("Updated phone {}", saved.id());
        Ok(saved)
    }

    pub async fn patch(&self, command: PatchPhone) -> Outcome<EstablishmentPhone> {
        let phone = command.phone_number.as_deref().map(PhoneNumber::create).transpose()?;

        let _guard = self.context.locks().acquire(command.establishment_id).await;
        let mut tx = self.context.begin().await?;
        let existing = self.repository.get_by_id(&mut tx, command.id).await?;
        ensure_parent::<EstablishmentPhone>(existing.establishment_id(), command.establishment_id)?;

        let mut patched = existing.clone();
        if let Some(phone) = phone {
            patched = patched.with_phone(phone);
        }
        if let Some(is_primary) = command.is_primary {
            patched = patched.with_primary(is_primary);
        }
        let saved = self.save(&mut tx, patched, Some(&existing)).await?;
        tx.commit().await.map_err(db)?;

        info!("Patched phone {}", saved.id());
        Ok(saved)
    }

    pub async fn delete(&self, command: DeletePhone) -> Outcome<()> {
        let deleted = self
            .context
            .delete_dependent(&self.coordinator, &self.repository, command.id)
            .await?;
        info!(
            "Deleted phone {} of establishment {}",
            command.id,
            deleted.establishment_id()
        );
        Ok(())
    }

    pub async fn get(&self, query: GetPhone) -> Outcome<EstablishmentPhone> {
        debug!("Getting phone {}", query.id);
        self.context.get(&self.repository, query.id).await
    }

    pub async fn list(&self, query: ListPhones) -> Outcome<Page<EstablishmentPhone>> {
        self.context
            .list(&self.repository, query.filter.criteria(), &query.page)
            .await
    }

    pub async fn count(&self, query: CountPhones) -> Outcome<i64> {
        self.context.count(&self.repository, query.filter.criteria()).await
    }

    pub async fn exists(&self, query: PhoneExists) -> Outcome<bool> {
        let phone = PhoneNumber::create(&query.phone_number)?;
        let mut conn = self.context.connection().await?;
        self.context
            .uniqueness()
            .phone(&mut conn, &phone, query.establishment_id, query.excluded)
            .await
    }

    async fn save(
        &self,
        conn: &mut SqliteConnection,
        record: EstablishmentPhone,
        existing: Option<&EstablishmentPhone>,
    ) -> Outcome<EstablishmentPhone> {
        match existing {
            Some(existing) if same_values(existing, &record) => {
                debug!("Phone {} unchanged", existing.id());
                return Ok(existing.clone());
            }
            Some(_) => {}
            None => {
                ensure_establishment(conn, record.establishment_id(), "Establishment.NotFound").await?;
            }
        }

        let taken = self
            .context
            .uniqueness()
            .phone(
                conn,
                record.phone(),
                record.establishment_id(),
                existing.map(EstablishmentPhone::id),
            )
            .await?;
        if taken {
            return Err(duplicate::<EstablishmentPhone>(format!("number {}", record.phone())));
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

handlers!(PhoneService {
    CreatePhone => EstablishmentPhone : create,
    UpdatePhone => EstablishmentPhone : update,
    PatchPhone => EstablishmentPhone : patch,
    DeletePhone => () : delete,
    GetPhone => EstablishmentPhone : get,
    ListPhones => Page<EstablishmentPhone> : list,
    CountPhones => i64 : count,
    PhoneExists => bool : exists,
});

#[cfg(test)]
mod tests {
    include!("phone_tests.rs");
}
