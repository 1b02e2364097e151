//! Establishment service

use super::{duplicate, ServiceContext};
use crate::error::db;
use crate::repositories::{EmployeeRepository, EstablishmentRepository, Repository};
use nest_admin_core::employee::EmployeeField;
use nest_admin_core::establishment::{Establishment, EstablishmentFilter, EstablishmentStatus};
use nest_admin_core::ids::{EstablishmentId, TypedId};
use nest_admin_core::pagination::{Page, PageRequest};
use nest_admin_core::specification::{same_values, Criteria, Specification};
use nest_admin_core::values::{EmailAddress, EstablishmentName};
use nest_admin_core::{Combine, Failure, Outcome};
use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEstablishment {
    pub name: String,
    pub email: String,
}

/// Full replacement of an establishment's fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateEstablishment {
    pub id: EstablishmentId,
    pub name: String,
    pub email: String,
    pub status: EstablishmentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchEstablishment {
    pub id: EstablishmentId,
    pub name: Option<String>,
    pub email: Option<String>,
    pub status: Option<EstablishmentStatus>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeleteEstablishment {
    pub id: EstablishmentId,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GetEstablishment {
    pub id: EstablishmentId,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListEstablishments {
    #[serde(flatten)]
    pub filter: EstablishmentFilter,
    #[serde(flatten)]
    pub page: PageRequest,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CountEstablishments {
    #[serde(flatten)]
    pub filter: EstablishmentFilter,
}

/// Service for establishments, the aggregate roots
#[derive(Debug, Clone)]
pub struct EstablishmentService {
    context: ServiceContext,
    repository: EstablishmentRepository,
}

impl EstablishmentService {
    pub fn new(context: ServiceContext) -> Self {
        Self {
            context,
            repository: EstablishmentRepository,
        }
    }

    pub async fn create(&self, command: CreateEstablishment) -> Outcome<Establishment> {
        let (name, email) = (
            EstablishmentName::create(&command.name),
            EmailAddress::create(&command.email),
        )
            .combine()?;
        let establishment = Establishment::create(name, email);

        let mut tx = self.context.begin().await?;
        let saved = self.save(&mut tx, establishment, None).await?;
        tx.commit().await.map_err(db)?;

        info!("Created establishment {} ({})", saved.name(), saved.id());
        Ok(saved)
    }

    pub async fn update(&self, command: UpdateEstablishment) -> Outcome<Establishment> {
        let (name, email) = (
            EstablishmentName::create(&command.name),
            EmailAddress::create(&command.email),
        )
            .combine()?;

        let mut tx = self.context.begin().await?;
        let existing = self.repository.get_by_id(&mut tx, command.id).await?;
        let updated = existing
            .clone()
            .with_name(name)
            .with_email(email)
            .with_status(command.status)?;
        let saved = self.save(&mut tx, updated, Some(&existing)).await?;
        tx.commit().await.map_err(db)?;

        info!("Updated establishment {}", saved.id());
        Ok(saved)
    }

    pub async fn patch(&self, command: PatchEstablishment) -> Outcome<Establishment> {
        let (name, email) = (
            command.name.as_deref().map(EstablishmentName::create).transpose(),
            command.email.as_deref().map(EmailAddress::create).transpose(),
        )
            .combine()?;

        let mut tx = self.context.begin().await?;
        let existing = self.repository.get_by_id(&mut tx, command.id).await?;
        let mut patched = existing.clone();
        if let Some(name) = name {
            patched = patched.with_name(name);
        }
        if let Some(email) = email {
            patched = patched.with_email(email);
        }
        if let Some(status) = command.status {
            patched = patched.with_status(status)?;
        }
        let saved = self.save(&mut tx, patched, Some(&existing)).await?;
        tx.commit().await.map_err(db)?;

        info!("Patched establishment {}", saved.id());
        Ok(saved)
    }

    /// Delete an establishment together with its dependent records.
    ///
    /// Refused while employees still work for it.
    pub async fn delete(&self, command: DeleteEstablishment) -> Outcome<()> {
        let _guard = self.context.locks().acquire(command.id).await;
        let mut tx = self.context.begin().await?;

        let staff = Specification::new(Criteria::eq(EmployeeField::EstablishmentId, command.id.as_uuid()));
        let employees = EmployeeRepository.count(&mut tx, &staff).await?;
        if employees > 0 {
            return Err(Failure::conflict(
                "Establishment.HasEmployees",
                format!("Establishment {} still has {employees} employees", command.id),
            ));
        }

        self.repository.delete(&mut tx, command.id).await?;
        tx.commit().await.map_err(db)?;
        self.context.locks().forget(command.id);

        info!("Deleted establishment {}", command.id);
        Ok(())
    }

    pub async fn get(&self, query: GetEstablishment) -> Outcome<Establishment> {
        debug!("Getting establishment {}", query.id);
        self.context.get(&self.repository, query.id).await
    }

    pub async fn list(&self, query: ListEstablishments) -> Outcome<Page<Establishment>> {
        self.context
            .list(&self.repository, query.filter.criteria(), &query.page)
            .await
    }

    pub async fn count(&self, query: CountEstablishments) -> Outcome<i64> {
        self.context.count(&self.repository, query.filter.criteria()).await
    }

    /// Check the natural key and write, skipping unchanged records
    async fn save(
        &self,
        conn: &mut SqliteConnection,
        establishment: Establishment,
        existing: Option<&Establishment>,
    ) -> Outcome<Establishment> {
        if let Some(existing) = existing {
            if same_values(existing, &establishment) {
                debug!("Establishment {} unchanged", existing.id());
                return Ok(existing.clone());
            }
        }

        let taken = self
            .context
            .uniqueness()
            .establishment(
                conn,
                establishment.name(),
                establishment.email(),
                existing.map(Establishment::id),
            )
            .await?;
        if taken {
            return Err(duplicate::<Establishment>(format!(
                "name '{}' and email '{}'",
                establishment.name(),
                establishment.email()
            )));
        }

        match existing {
            Some(_) => self.repository.update(conn, &establishment).await,
            None => {
                self.repository.add(conn, &establishment).await?;
                Ok(establishment)
            }
        }
    }
}

handlers!(EstablishmentService {
    CreateEstablishment => Establishment : create,
    UpdateEstablishment => Establishment : update,
    PatchEstablishment => Establishment : patch,
    DeleteEstablishment => () : delete,
    GetEstablishment => Establishment : get,
    ListEstablishments => Page<Establishment> : list,
    CountEstablishments => i64 : count,
});

#[cfg(test)]
mod tests {
    include!("establishment_tests.rs");
}
