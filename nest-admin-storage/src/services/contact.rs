//! Establishment contact service

use super::{duplicate, ensure_establishment, ensure_parent, ServiceContext};
use crate::error::db;
use crate::primary::PrimaryCoordinator;
use crate::repositories::{ContactRepository, Repository};
use nest_admin_core::contact::{ContactFilter, EstablishmentContact};
use nest_admin_core::ids::{EstablishmentContactId, EstablishmentId};
use nest_admin_core::pagination::{Page, PageRequest};
use nest_admin_core::specification::same_values;
use nest_admin_core::values::{PersonName, PhoneNumber};
use nest_admin_core::{Combine, Outcome};
use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateContact {
    pub establishment_id: EstablishmentId,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub phone_number: String,
    pub is_primary: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateContact {
    pub id: EstablishmentContactId,
    pub establishment_id: EstablishmentId,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub phone_number: String,
    pub is_primary: bool,
}

/// Partial contact update; `None` keeps the stored value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchContact {
    pub id: EstablishmentContactId,
    pub establishment_id: EstablishmentId,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub is_primary: Option<bool>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeleteContact {
    pub id: EstablishmentContactId,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GetContact {
    pub id: EstablishmentContactId,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListContacts {
    #[serde(flatten)]
    pub filter: ContactFilter,
    #[serde(flatten)]
    pub page: PageRequest,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CountContacts {
    #[serde(flatten)]
    pub filter: ContactFilter,
}

/// Service for establishment contact persons
#[derive(Debug, Clone)]
pub struct ContactService {
    context: ServiceContext,
    repository: ContactRepository,
    coordinator: PrimaryCoordinator<ContactRepository>,
}

impl ContactService {
    pub fn new(context: ServiceContext) -> Self {
        Self {
            context,
            repository: ContactRepository,
            coordinator: PrimaryCoordinator::new(ContactRepository),
        }
    }

    pub async fn create(&self, command: CreateContact) -> Outcome<EstablishmentContact> {
        let (person, phone) = (
            PersonName::create(
                &command.first_name,
                command.middle_name.as_deref(),
                &command.last_name,
            ),
            PhoneNumber::create(&command.phone_number),
        )
            .combine()?;
        let record = EstablishmentContact::create(command.establishment_id, person, phone, command.is_primary);

        let _guard = self.context.locks().acquire(command.establishment_id).await;
        let mut tx = self.context.begin().await?;
        let saved = self.save(&mut tx, record, None).await?;
        tx.commit().await.map_err(db)?;

        info!(
            "Created contact {} ({}) for establishment {}",
            saved.person(),
            saved.id(),
            saved.establishment_id()
        );
        Ok(saved)
    }

    pub async fn update(&self, command: UpdateContact) -> Outcome<EstablishmentContact> {
        let (person, phone) = (
            PersonName::create(
                &command.first_name,
                command.middle_name.as_deref(),
                &command.last_name,
            ),
            PhoneNumber::create(&command.phone_number),
        )
            .combine()?;

        let _guard = self.context.locks().acquire(command.establishment_id).await;
        let mut tx = self.context.begin().await?;
        let existing = self.repository.get_by_id(&mut tx, command.id).await?;
        ensure_parent::<EstablishmentContact>(existing.establishment_id(), command.establishment_id)?;

        let updated = existing
            .clone()
            .with_person(person)
            .with_phone(phone)
            .with_primary(command.is_primary);
        let saved = self.save(&mut tx, updated, Some(&existing)).await?;
        tx.commit().await.map_err(db)?;

        info!("Updated contact {}", saved.id());
        Ok(saved)
    }

    pub async fn patch(&self, command: PatchContact) -> Outcome<EstablishmentContact> {
        let _guard = self.context.locks().acquire(command.establishment_id).await;
        let mut tx = self.context.begin().await?;
        let existing = self.repository.get_by_id(&mut tx, command.id).await?;
        ensure_parent::<EstablishmentContact>(existing.establishment_id(), command.establishment_id)?;

        let (person, phone) = (
            existing.person().with_parts(
                command.first_name.as_deref(),
                command.middle_name.as_deref(),
                command.last_name.as_deref(),
            ),
            command.phone_number.as_deref().map(PhoneNumber::create).transpose(),
        )
            .combine()?;

        let mut patched = existing.clone().with_person(person);
        if let Some(phone) = phone {
            patched = patched.with_phone(phone);
        }
        if let Some(is_primary) = command.is_primary {
            patched = patched.with_primary(is_primary);
        }
        let saved = self.save(&mut tx, patched, Some(&existing)).await?;
        tx.commit().await.map_err(db)?;

        info!("Patched contact {}", saved.id());
        Ok(saved)
    }

    pub async fn delete(&self, command: DeleteContact) -> Outcome<()> {
        let deleted = self
            .context
            .delete_dependent(&self.coordinator, &self.repository, command.id)
            .await?;
        info!(
            "Deleted contact {} of establishment {}",
            command.id,
            deleted.establishment_id()
        );
        Ok(())
    }

    pub async fn get(&self, query: GetContact) -> Outcome<EstablishmentContact> {
        debug!("Getting contact {}", query.id);
        self.context.get(&self.repository, query.id).await
    }

    pub async fn list(&self, query: ListContacts) -> Outcome<Page<EstablishmentContact>> {
        self.context
            .list(&self.repository, query.filter.criteria(), &query.page)
            .await
    }

    pub async fn count(&self, query: CountContacts) -> Outcome<i64> {
        self.context.count(&self.repository, query.filter.criteria()).await
    }

    async fn save(
        &self,
        conn: &mut SqliteConnection,
        record: EstablishmentContact,
        existing: Option<&EstablishmentContact>,
    ) -> Outcome<EstablishmentContact> {
        match existing {
            Some(existing) if same_values(existing, &record) => {
                debug!("Contact {} unchanged", existing.id());
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
            .contact(
                conn,
                record.person(),
                record.phone(),
                record.establishment_id(),
                existing.map(EstablishmentContact::id),
            )
            .await?;
        if taken {
            return Err(duplicate::<EstablishmentContact>(format!(
                "name '{}' and phone {}",
                record.person(),
                record.phone()
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

handlers!(ContactService {
    CreateContact => EstablishmentContact : create,
    UpdateContact => EstablishmentContact : update,
    PatchContact => EstablishmentContact : patch,
    DeleteContact => () : delete,
    GetContact => EstablishmentContact : get,
    ListContacts => Page<EstablishmentContact> : list,
    CountContacts => i64 : count,
});

#[cfg(test)]
mod tests {
    include!("contact_tests.rs");
}
