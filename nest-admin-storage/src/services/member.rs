//! Establishment member service

use super::{duplicate, ensure_establishment, ensure_parent, ServiceContext};
use crate::error::db;
use crate::repositories::{EmployeeRepository, MemberRepository, Repository};
use nest_admin_core::ids::{EmployeeId, EstablishmentId, EstablishmentMemberId};
use nest_admin_core::member::{EstablishmentMember, MemberFilter};
use nest_admin_core::pagination::{Page, PageRequest};
use nest_admin_core::specification::same_values;
use nest_admin_core::values::{MemberDescription, MemberTag, MemberTitle};
use nest_admin_core::{Combine, Outcome};
use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMember {
    pub establishment_id: EstablishmentId,
    pub employee_id: EmployeeId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub tag: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateMember {
    pub id: EstablishmentMemberId,
    pub establishment_id: EstablishmentId,
    pub employee_id: EmployeeId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub tag: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatchMember {
    pub id: EstablishmentMemberId,
    pub establishment_id: EstablishmentId,
    pub employee_id: Option<EmployeeId>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tag: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeleteMember {
    pub id: EstablishmentMemberId,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GetMember {
    pub id: EstablishmentMemberId,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListMembers {
    #[serde(flatten)]
    pub filter: MemberFilter,
    #[serde(flatten)]
    pub page: PageRequest,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CountMembers {
    #[serde(flatten)]
    pub filter: MemberFilter,
}

/// Whether the employee already has a membership in the establishment
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MemberExistsForEmployee {
    pub establishment_id: EstablishmentId,
    pub employee_id: EmployeeId,
    pub excluded: Option<EstablishmentMemberId>,
}

/// Service for establishment members
#[derive(Debug, Clone)]
pub struct MemberService {
    context: ServiceContext,
    repository: MemberRepository,
}

impl MemberService {
    pub fn new(context: ServiceContext) -> Self {
        Self {
            context,
            repository: MemberRepository,
        }
    }

    pub async fn create(&self, command: CreateMember) -> Outcome<EstablishmentMember> {
        let (title, description, tag) = (
            MemberTitle::create(&command.title),
            MemberDescription::create(&command.description),
            MemberTag::create(&command.tag),
        )
            .combine()?;

        let _guard = self.context.locks().acquire(command.establishment_id).await;
        let mut tx = self.context.begin().await?;
        ensure_establishment(&mut tx, command.establishment_id, "Establishment.NotFound").await?;
        let employee = EmployeeRepository.get_by_id(&mut tx, command.employee_id).await?;
        let member = EstablishmentMember::create(command.establishment_id, &employee, title, description, tag)?;
        let saved = self.save(&mut tx, member, None).await?;
        tx.commit().await.map_err(db)?;

        info!(
            "Added employee {} to establishment {} as {}",
            saved.employee_id(),
            saved.establishment_id(),
            saved.title().as_str()
        );
        Ok(saved)
    }

    pub async fn update(&self, command: UpdateMember) -> Outcome<EstablishmentMember> {
        let (title, description, tag) = (
            MemberTitle::create(&command.title),
            MemberDescription::create(&command.description),
            MemberTag::create(&command.tag),
        )
            .combine()?;

        let _guard = self.context.locks().acquire(command.establishment_id).await;
        let mut tx = self.context.begin().await?;
        let existing = self.repository.get_by_id(&mut tx, command.id).await?;
        ensure_parent::<EstablishmentMember>(existing.establishment_id(), command.establishment_id)?;

        let mut updated = existing
            .clone()
            .with_title(title)
            .with_description(description)
            .with_tag(tag);
        if command.employee_id != existing.employee_id() {
            let employee = EmployeeRepository.get_by_id(&mut tx, command.employee_id).await?;
            updated = updated.with_employee(&employee)?;
        }
        let saved = self.save(&mut tx, updated, Some(&existing)).await?;
        tx.commit().await.map_err(db)?;

        info!("Updated member {}", saved.id());
        Ok(saved)
    }

    pub async fn patch(&self, command: PatchMember) -> Outcome<EstablishmentMember> {
        let (title, description, tag) = (
            command.title.as_deref().map(MemberTitle::create).transpose(),
            command
                .description
                .as_deref()
                .map(MemberDescription::create)
                .transpose(),
            command.tag.as_deref().map(MemberTag::create).transpose(),
        )
            .combine()?;

        let _guard = self.context.locks().acquire(command.establishment_id).await;
        let mut tx = self.context.begin().await?;
        let existing = self.repository.get_by_id(&mut tx, command.id).await?;
        ensure_parent::<EstablishmentMember>(existing.establishment_id(), command.establishment_id)?;

        let mut patched = existing.clone();
        if let Some(title) = title {
            patched = patched.with_title(title);
        }
        if let Some(description) = description {
            patched = patched.with_description(description);
        }
        if let Some(tag) = tag {
            patched = patched.with_tag(tag);
        }
        if let Some(employee_id) = command.employee_id.filter(|id| *id != existing.employee_id()) {
            let employee = EmployeeRepository.get_by_id(&mut tx, employee_id).await?;
            patched = patched.with_employee(&employee)?;
        }
        let saved = self.save(&mut tx, patched, Some(&existing)).await?;
        tx.commit().await.map_err(db)?;

        info!("Patched member {}", saved.id());
        Ok(saved)
    }

    pub async fn delete(&self, command: DeleteMember) -> Outcome<()> {
        let mut tx = self.context.begin().await?;
        self.repository.delete(&mut tx, command.id).await?;
        tx.commit().await.map_err(db)?;

        info!("Deleted member {}", command.id);
        Ok(())
    }

    pub async fn get(&self, query: GetMember) -> Outcome<EstablishmentMember> {
        debug!("Getting member {}", query.id);
        self.context.get(&self.repository, query.id).await
    }

    pub async fn list(&self, query: ListMembers) -> Outcome<Page<EstablishmentMember>> {
        self.context
            .list(&self.repository, query.filter.criteria(), &query.page)
            .await
    }

    pub async fn count(&self, query: CountMembers) -> Outcome<i64> {
        self.context.count(&self.repository, query.filter.criteria()).await
    }

    pub async fn exists_for_employee(&self, query: MemberExistsForEmployee) -> Outcome<bool> {
        let mut conn = self.context.connection().await?;
        self.context
            .uniqueness()
            .member(&mut conn, query.employee_id, query.establishment_id, query.excluded)
            .await
    }

    async fn save(
        &self,
        conn: &mut SqliteConnection,
        member: EstablishmentMember,
        existing: Option<&EstablishmentMember>,
    ) -> Outcome<EstablishmentMember> {
        if let Some(existing) = existing {
            if same_values(existing, &member) {
                debug!("Member {} unchanged", existing.id());
                return Ok(existing.clone());
            }
        }

        let taken = self
            .context
            .uniqueness()
            .member(
                conn,
                member.employee_id(),
                member.establishment_id(),
                existing.map(EstablishmentMember::id),
            )
            .await?;
        if taken {
            return Err(duplicate::<EstablishmentMember>(format!(
                "employee {}",
                member.employee_id()
            )));
        }

        match existing {
            Some(_) => self.repository.update(conn, &member).await,
            None => {
                self.repository.add(conn, &member).await?;
                Ok(member)
            }
        }
    }
}

handlers!(MemberService {
    CreateMember => EstablishmentMember : create,
    UpdateMember => EstablishmentMember : update,
    PatchMember => EstablishmentMember : patch,
    DeleteMember => () : delete,
    GetMember => EstablishmentMember : get,
    ListMembers => Page<EstablishmentMember> : list,
    CountMembers => i64 : count,
    MemberExistsForEmployee => bool : exists_for_employee,
});
