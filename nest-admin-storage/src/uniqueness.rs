//! Natural-key uniqueness checks
//!
//! Each check answers whether a persisted record other than `excluded`
//! already carries the given natural key. A hit is reported as `Ok(true)`;
//! turning it into a conflict is left to the command handler. When no id is
//! excluded a freshly generated one is used, which matches no stored row, so
//! create and update paths run the same statement.

use crate::error::db;
use nest_admin_core::ids::{
    EmployeeId, EmployeeRoleId, EstablishmentAddressId, EstablishmentContactId, EstablishmentId,
    EstablishmentMemberId, EstablishmentPhoneId, SocialMediaId, TypedId,
};
use nest_admin_core::values::{
    Coordinates, EmailAddress, EmployeeNumber, EstablishmentName, PersonName, PhoneNumber,
    RoleName, SocialMediaName,
};
use nest_admin_core::Outcome;
use sqlx::SqliteConnection;
use tracing::debug;

fn excluded_or_fresh<I: TypedId + Default>(excluded: Option<I>) -> String {
    excluded.unwrap_or_default().to_string()
}

/// Uniqueness checks for every entity family
#[derive(Debug, Default, Clone, Copy)]
pub struct UniquenessChecker;

impl UniquenessChecker {
    /// Establishment name (ignoring case) together with its email
    pub async fn establishment(
        &self,
        conn: &mut SqliteConnection,
        name: &EstablishmentName,
        email: &EmailAddress,
        excluded: Option<EstablishmentId>,
    ) -> Outcome<bool> {
        debug!("Checking establishment uniqueness: {} <{}>", name, email);
        sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM establishments
                WHERE LOWER(name) = LOWER(?1) AND email = ?2 AND id <> ?3
            )
            "#,
        )
        .bind(name.as_str())
        .bind(email.as_str())
        .bind(excluded_or_fresh(excluded))
        .fetch_one(&mut *conn)
        .await
        .map_err(db)
    }

    /// Address position within one establishment, at micro-degree precision
    pub async fn address(
        &self,
        conn: &mut SqliteConnection,
        coordinates: Coordinates,
        establishment_id: EstablishmentId,
        excluded: Option<EstablishmentAddressId>,
    ) -> Outcome<bool> {
        debug!(
            "Checking address uniqueness at ({}, {}) for establishment {}",
            coordinates.latitude(),
            coordinates.longitude(),
            establishment_id
        );
        sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM establishment_addresses
                WHERE establishment_id = ?1 AND lat_e6 = ?2 AND lon_e6 = ?3 AND id <> ?4
            )
            "#,
        )
        .bind(establishment_id.to_string())
        .bind(coordinates.lat_e6())
        .bind(coordinates.lon_e6())
        .bind(excluded_or_fresh(excluded))
        .fetch_one(&mut *conn)
        .await
        .map_err(db)
    }

    /// Contact person name (ignoring case) together with the phone digits
    pub async fn contact(
        &self,
        conn: &mut SqliteConnection,
        person: &PersonName,
        phone: &PhoneNumber,
        establishment_id: EstablishmentId,
        excluded: Option<EstablishmentContactId>,
    ) -> Outcome<bool> {
        debug!(
            "Checking contact uniqueness: {} / {} for establishment {}",
            person, phone, establishment_id
        );
        sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM establishment_contacts
                WHERE establishment_id = ?1
                  AND LOWER(first_name) = LOWER(?2)
                  AND LOWER(middle_name) = LOWER(?3)
                  AND LOWER(last_name) = LOWER(?4)
                  AND phone_number = ?5
                  AND id <> ?6
            )
            "#,
        )
        .bind(establishment_id.to_string())
        .bind(person.first())
        .bind(person.middle().unwrap_or_default())
        .bind(person.last())
        .bind(phone.digits())
        .bind(excluded_or_fresh(excluded))
        .fetch_one(&mut *conn)
        .await
        .map_err(db)
    }

    /// Phone digits within one establishment
    pub async fn phone(
        &self,
        conn: &mut SqliteConnection,
        phone: &PhoneNumber,
        establishment_id: EstablishmentId,
        excluded: Option<EstablishmentPhoneId>,
    ) -> Outcome<bool> {
        debug!(
            "Checking phone uniqueness: {} for establishment {}",
            phone, establishment_id
        );
        sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM establishment_phones
                WHERE establishment_id = ?1 AND phone_number = ?2 AND id <> ?3
            )
            "#,
        )
        .bind(establishment_id.to_string())
        .bind(phone.digits())
        .bind(excluded_or_fresh(excluded))
        .fetch_one(&mut *conn)
        .await
        .map_err(db)
    }

    /// One membership per employee and establishment
    pub async fn member(
        &self,
        conn: &mut SqliteConnection,
        employee_id: EmployeeId,
        establishment_id: EstablishmentId,
        excluded: Option<EstablishmentMemberId>,
    ) -> Outcome<bool> {
        debug!(
            "Checking membership uniqueness: employee {} in establishment {}",
            employee_id, establishment_id
        );
        sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM establishment_members
                WHERE establishment_id = ?1 AND employee_id = ?2 AND id <> ?3
            )
            "#,
        )
        .bind(establishment_id.to_string())
        .bind(employee_id.to_string())
        .bind(excluded_or_fresh(excluded))
        .fetch_one(&mut *conn)
        .await
        .map_err(db)
    }

    /// Employee number, name and email within one establishment
    pub async fn employee(
        &self,
        conn: &mut SqliteConnection,
        number: &EmployeeNumber,
        name: &PersonName,
        email: &EmailAddress,
        establishment_id: EstablishmentId,
        excluded: Option<EmployeeId>,
    ) -> Outcome<bool> {
        debug!(
            "Checking employee uniqueness: {} for establishment {}",
            number, establishment_id
        );
        sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM employees
                WHERE establishment_id = ?1
                  AND employee_number = ?2
                  AND LOWER(first_name) = LOWER(?3)
                  AND LOWER(middle_name) = LOWER(?4)
                  AND LOWER(last_name) = LOWER(?5)
                  AND email = ?6
                  AND id <> ?7
            )
            "#,
        )
        .bind(establishment_id.to_string())
        .bind(number.as_str())
        .bind(name.first())
        .bind(name.middle().unwrap_or_default())
        .bind(name.last())
        .bind(email.as_str())
        .bind(excluded_or_fresh(excluded))
        .fetch_one(&mut *conn)
        .await
        .map_err(db)
    }

    /// Role name, ignoring case
    pub async fn role(
        &self,
        conn: &mut SqliteConnection,
        name: &RoleName,
        excluded: Option<EmployeeRoleId>,
    ) -> Outcome<bool> {
        debug!("Checking role uniqueness: {}", name);
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM employee_roles WHERE LOWER(role_name) = LOWER(?1) AND id <> ?2)",
        )
        .bind(name.as_str())
        .bind(excluded_or_fresh(excluded))
        .fetch_one(&mut *conn)
        .await
        .map_err(db)
    }

    /// Platform name, ignoring case
    pub async fn social_media(
        &self,
        conn: &mut SqliteConnection,
        name: &SocialMediaName,
        excluded: Option<SocialMediaId>,
    ) -> Outcome<bool> {
        debug!("Checking social media platform uniqueness: {}", name.name());
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM social_media_platforms WHERE LOWER(name) = LOWER(?1) AND id <> ?2)",
        )
        .bind(name.name())
        .bind(excluded_or_fresh(excluded))
        .fetch_one(&mut *conn)
        .await
        .map_err(db)
    }
}
