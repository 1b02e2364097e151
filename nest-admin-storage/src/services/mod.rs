//! Command and query handlers
//!
//! One service per entity family. Every mutating handler follows the same
//! sequence: validate the input, open a transaction (after taking the
//! establishment lock for dependent records), check the parent and natural
//! key, let the primary coordinator demote a sibling when needed, write and
//! commit. Dropping the transaction without committing rolls everything
//! back. Queries run on a pooled connection and only use specifications.

pub mod address;
pub mod contact;
pub mod employee;
pub mod establishment;
pub mod member;
pub mod phone;
pub mod role;
pub mod social;

pub use address::AddressService;
pub use contact::ContactService;
pub use employee::EmployeeService;
pub use establishment::EstablishmentService;
pub use member::MemberService;
pub use phone::PhoneService;
pub use role::RoleService;
pub use social::SocialMediaService;

use crate::dispatcher::DispatcherBuilder;
use crate::error::db;
use crate::locks::ParentLocks;
use crate::primary::PrimaryCoordinator;
use crate::repositories::{DependentRepository, EstablishmentRepository, Repository};
use crate::uniqueness::UniquenessChecker;
use nest_admin_core::ids::EstablishmentId;
use nest_admin_core::pagination::{ListingConfig, Page, PageRequest};
use nest_admin_core::primary::PrimaryFlagged;
use nest_admin_core::specification::{Criteria, Queryable, Specification};
use nest_admin_core::{Failure, Outcome};
use sqlx::pool::PoolConnection;
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use std::sync::Arc;
use tracing::debug;

/// What every service needs to run its handlers
#[derive(Debug, Clone)]
pub struct ServiceContext {
    pool: SqlitePool,
    locks: Arc<ParentLocks>,
    listing: ListingConfig,
    uniqueness: UniquenessChecker,
}

impl ServiceContext {
    pub fn new(pool: SqlitePool, listing: ListingConfig) -> Self {
        Self {
            pool,
            locks: Arc::new(ParentLocks::new()),
            listing,
            uniqueness: UniquenessChecker,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn locks(&self) -> &ParentLocks {
        &self.locks
    }

    pub fn listing(&self) -> &ListingConfig {
        &self.listing
    }

    pub(crate) fn uniqueness(&self) -> &UniquenessChecker {
        &self.uniqueness
    }

    /// Pooled connection for queries
    pub(crate) async fn connection(&self) -> Outcome<PoolConnection<Sqlite>> {
        self.pool.acquire().await.map_err(db)
    }

    /// Write transaction holding the database write lock from its first statement
    pub(crate) async fn begin(&self) -> Outcome<Transaction<'static, Sqlite>> {
        self.pool.begin_with("BEGIN IMMEDIATE").await.map_err(db)
    }

    pub(crate) async fn get<R: Repository>(&self, repository: &R, id: R::Id) -> Outcome<R::Entity> {
        let mut conn = self.connection().await?;
        repository.get_by_id(&mut conn, id).await
    }

    /// Run the paged list and the unpaged count over the same criteria
    pub(crate) async fn list<R: Repository>(
        &self,
        repository: &R,
        criteria: Criteria<<R::Entity as Queryable>::Field>,
        page: &PageRequest,
    ) -> Outcome<Page<R::Entity>> {
        let spec = page.specification::<R::Entity>(criteria, &self.listing)?;
        let paging = spec.paging().ok_or_else(|| {
            Failure::unexpected("Specification.MissingPaging", "Listing specification has no paging")
        })?;
        let mut conn = self.connection().await?;
        let items = repository.list(&mut conn, &spec).await?;
        let total_count = repository.count(&mut conn, &spec.without_paging()).await?;
        debug!(
            "Listed {} of {} {} rows",
            items.len(),
            total_count,
            <R::Entity as Queryable>::ENTITY
        );
        Ok(Page::new(items, total_count, paging))
    }

    pub(crate) async fn count<R: Repository>(
        &self,
        repository: &R,
        criteria: Criteria<<R::Entity as Queryable>::Field>,
    ) -> Outcome<i64> {
        let mut conn = self.connection().await?;
        repository.count(&mut conn, &Specification::new(criteria)).await
    }

    /// Delete a primary-flagged record under its establishment's lock,
    /// refusing to remove the primary one while siblings remain
    pub(crate) async fn delete_dependent<R>(
        &self,
        coordinator: &PrimaryCoordinator<R>,
        repository: &R,
        id: R::Id,
    ) -> Outcome<R::Entity>
    where
        R: DependentRepository,
        R::Entity: PrimaryFlagged<Id = R::Id>,
    {
        let parent = self.get(repository, id).await?.parent_id();
        let _guard = self.locks.acquire(parent).await;
        let mut tx = self.begin().await?;

        let record = repository.get_by_id(&mut tx, id).await?;
        coordinator.before_delete(&mut tx, &record).await?;
        repository.delete(&mut tx, id).await?;
        tx.commit().await.map_err(db)?;
        Ok(record)
    }
}

/// Fail with `code` unless the establishment exists
pub(crate) async fn ensure_establishment(
    conn: &mut SqliteConnection,
    establishment_id: EstablishmentId,
    code: &str,
) -> Outcome<()> {
    if !EstablishmentRepository.exists(conn, establishment_id).await? {
        return Err(Failure::not_found(
            code,
            format!("Establishment with id {establishment_id} was not found"),
        ));
    }
    Ok(())
}

/// A dependent record may only be changed through its own establishment
pub(crate) fn ensure_parent<E: Queryable>(
    stored: EstablishmentId,
    requested: EstablishmentId,
) -> Outcome<()> {
    if stored != requested {
        return Err(Failure::unauthorized(
            format!("{}.ParentMismatch", E::ENTITY),
            format!(
                "{} belongs to establishment {stored}, not {requested}",
                E::ENTITY
            ),
        ));
    }
    Ok(())
}

/// Natural-key collision for entity `E`
pub(crate) fn duplicate<E: Queryable>(key: impl std::fmt::Display) -> Failure {
    Failure::conflict(
        format!("{}.AlreadyExists", E::ENTITY),
        format!("{} with {key} already exists", E::ENTITY),
    )
}

/// Every service, sharing one context
#[derive(Debug, Clone)]
pub struct Services {
    pub establishments: Arc<EstablishmentService>,
    pub addresses: Arc<AddressService>,
    pub contacts: Arc<ContactService>,
    pub phones: Arc<PhoneService>,
    pub members: Arc<MemberService>,
    pub employees: Arc<EmployeeService>,
    pub roles: Arc<RoleService>,
    pub social_media: Arc<SocialMediaService>,
}

impl Services {
    pub fn new(context: ServiceContext) -> Self {
        Self {
            establishments: Arc::new(EstablishmentService::new(context.clone())),
            addresses: Arc::new(AddressService::new(context.clone())),
            contacts: Arc::new(ContactService::new(context.clone())),
            phones: Arc::new(PhoneService::new(context.clone())),
            members: Arc::new(MemberService::new(context.clone())),
            employees: Arc::new(EmployeeService::new(context.clone())),
            roles: Arc::new(RoleService::new(context.clone())),
            social_media: Arc::new(SocialMediaService::new(context)),
        }
    }

    /// Register every command and query handler
    pub fn register_all(&self, builder: DispatcherBuilder) -> DispatcherBuilder {
        let builder = self.establishments.register_all(builder);
        let builder = self.addresses.register_all(builder);
        let builder = self.contacts.register_all(builder);
        let builder = self.phones.register_all(builder);
        let builder = self.members.register_all(builder);
        let builder = self.employees.register_all(builder);
        let builder = self.roles.register_all(builder);
        self.social_media.register_all(builder)
    }
}
