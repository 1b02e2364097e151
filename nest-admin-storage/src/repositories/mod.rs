//! Repository implementations for all domain entities
//!
//! Repositories are stateless: every call takes the connection to run on,
//! which is either a pooled connection for reads or the open transaction of
//! a command handler. All statements are built at runtime so the same
//! provided methods serve every table.

pub mod address;
pub mod contact;
pub mod employee;
pub mod establishment;
pub mod member;
pub mod phone;
pub mod role;
pub mod social;

pub use address::AddressRepository;
pub use contact::ContactRepository;
pub use employee::EmployeeRepository;
pub use establishment::EstablishmentRepository;
pub use member::MemberRepository;
pub use phone::PhoneRepository;
pub use role::RoleRepository;
pub use social::SocialMediaRepository;

use crate::error::db;
use crate::query;
use crate::{Error, Result};
use async_trait::async_trait;
use nest_admin_core::ids::{EstablishmentId, TypedId};
use nest_admin_core::specification::{Field, Queryable, Specification};
use nest_admin_core::{Failure, Outcome};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use tracing::debug;
use uuid::Uuid;

/// Persistence contract shared by every entity family
#[async_trait]
pub trait Repository: Send + Sync {
    type Entity: Queryable + Send + Sync;
    type Id: TypedId;

    const TABLE: &'static str;
    /// Column list in the order [`Repository::from_row`] reads them
    const COLUMNS: &'static str;

    fn column(field: <Self::Entity as Queryable>::Field) -> &'static str {
        field.name()
    }

    fn from_row(row: &SqliteRow) -> Result<Self::Entity>;

    async fn add(&self, conn: &mut SqliteConnection, entity: &Self::Entity) -> Outcome<()>;

    async fn update(&self, conn: &mut SqliteConnection, entity: &Self::Entity) -> Outcome<Self::Entity>;

    async fn find_by_id(
        &self,
        conn: &mut SqliteConnection,
        id: Self::Id,
    ) -> Outcome<Option<Self::Entity>> {
        debug!("Finding {} by ID: {}", <Self::Entity as Queryable>::ENTITY, id);
        let sql = format!("SELECT {} FROM {} WHERE id = ?1", Self::COLUMNS, Self::TABLE);
        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .fetch_optional(&mut *conn)
            .await
            .map_err(db)?;
        match row {
            Some(row) => Ok(Some(Self::from_row(&row)?)),
            None => Ok(None),
        }
    }

    /// Like [`Repository::find_by_id`], failing with `<Entity>.NotFound`
    async fn get_by_id(&self, conn: &mut SqliteConnection, id: Self::Id) -> Outcome<Self::Entity> {
        self.find_by_id(conn, id)
            .await?
            .ok_or_else(|| not_found::<Self::Entity>(id))
    }

    async fn exists(&self, conn: &mut SqliteConnection, id: Self::Id) -> Outcome<bool> {
        let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1)", Self::TABLE);
        sqlx::query_scalar(&sql)
            .bind(id.to_string())
            .fetch_one(&mut *conn)
            .await
            .map_err(db)
    }

    async fn delete(&self, conn: &mut SqliteConnection, id: Self::Id) -> Outcome<()> {
        debug!("Deleting {}: {}", <Self::Entity as Queryable>::ENTITY, id);
        let sql = format!("DELETE FROM {} WHERE id = ?1", Self::TABLE);
        let result = sqlx::query(&sql)
            .bind(id.to_string())
            .execute(&mut *conn)
            .await
            .map_err(db)?;
        if result.rows_affected() == 0 {
            return Err(not_found::<Self::Entity>(id));
        }
        Ok(())
    }

    async fn list(
        &self,
        conn: &mut SqliteConnection,
        spec: &Specification<Self::Entity>,
    ) -> Outcome<Vec<Self::Entity>> {
        debug!("Listing {} with {:?}", <Self::Entity as Queryable>::ENTITY, spec);
        let mut qb = query::select(Self::TABLE, Self::COLUMNS, spec, Self::column);
        let rows = qb.build().fetch_all(&mut *conn).await.map_err(db)?;
        rows.iter()
            .map(|row| Self::from_row(row).map_err(Failure::from))
            .collect()
    }

    async fn count(
        &self,
        conn: &mut SqliteConnection,
        spec: &Specification<Self::Entity>,
    ) -> Outcome<i64> {
        let mut qb = query::count(Self::TABLE, spec, Self::column);
        qb.build_query_scalar()
            .fetch_one(&mut *conn)
            .await
            .map_err(db)
    }

    /// Release a loaded entity from the persistence session.
    ///
    /// Rows are mapped into owned values, so nothing stays attached.
    fn detach(&self, _entity: &Self::Entity) {}
}

/// Repository of records that belong to an establishment and carry a
/// primary flag; the table has `establishment_id` and `is_primary` columns
#[async_trait]
pub trait DependentRepository: Repository {
    /// Clear the flag on every sibling of `excluded` under `parent`
    async fn set_non_primary_except(
        &self,
        conn: &mut SqliteConnection,
        parent: EstablishmentId,
        excluded: Self::Id,
    ) -> Outcome<u64> {
        let sql = format!(
            "UPDATE {} SET is_primary = 0 WHERE establishment_id = ?1 AND id <> ?2 AND is_primary = 1",
            Self::TABLE
        );
        let result = sqlx::query(&sql)
            .bind(parent.to_string())
            .bind(excluded.to_string())
            .execute(&mut *conn)
            .await
            .map_err(db)?;
        Ok(result.rows_affected())
    }

    /// Number of records under `parent` other than `excluding`
    async fn count_siblings(
        &self,
        conn: &mut SqliteConnection,
        parent: EstablishmentId,
        excluding: Self::Id,
    ) -> Outcome<i64> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE establishment_id = ?1 AND id <> ?2",
            Self::TABLE
        );
        sqlx::query_scalar(&sql)
            .bind(parent.to_string())
            .bind(excluding.to_string())
            .fetch_one(&mut *conn)
            .await
            .map_err(db)
    }

    /// Ids of the primary records under `parent`; more than one means the
    /// invariant is broken
    async fn find_primaries(
        &self,
        conn: &mut SqliteConnection,
        parent: EstablishmentId,
    ) -> Outcome<Vec<Self::Id>> {
        let sql = format!(
            "SELECT id FROM {} WHERE establishment_id = ?1 AND is_primary = 1",
            Self::TABLE
        );
        let ids: Vec<String> = sqlx::query_scalar(&sql)
            .bind(parent.to_string())
            .fetch_all(&mut *conn)
            .await
            .map_err(db)?;
        ids.iter()
            .map(|id| parse_id::<Self::Id>(<Self::Entity as Queryable>::ENTITY, id).map_err(Failure::from))
            .collect()
    }
}

pub(crate) fn not_found<E: Queryable>(id: impl std::fmt::Display) -> Failure {
    Failure::not_found(
        format!("{}.NotFound", E::ENTITY),
        format!("{} with id {} was not found", E::ENTITY, id),
    )
}

fn parse_id<I: TypedId>(entity: &str, raw: &str) -> Result<I> {
    Uuid::parse_str(raw)
        .map(I::from_uuid)
        .map_err(|e| Error::corrupt(entity, format!("invalid id '{raw}': {e}")))
}

/// Read a typed id column
pub(crate) fn id_column<I: TypedId>(row: &SqliteRow, entity: &str, column: &str) -> Result<I> {
    let raw: String = row.try_get(column)?;
    parse_id(entity, &raw)
}

/// Turn a stored value that no longer validates into a corrupt-row error
pub(crate) fn stored<T>(entity: &str, outcome: Outcome<T>) -> Result<T> {
    outcome.map_err(|failure| Error::corrupt(entity, failure.to_string()))
}

pub(crate) fn optional_text(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
