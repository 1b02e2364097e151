//! Core domain models for Nest Admin
//!
//! This crate holds the validation kernel, value objects, entities and
//! query specifications used to administer establishments and their
//! dependent records. It performs no I/O; persistence lives in
//! `nest-admin-storage`.

#[macro_use]
mod macros;

pub mod error;
pub mod ids;
pub mod pagination;
pub mod primary;
pub mod specification;
pub mod values;

pub mod address;
pub mod contact;
pub mod employee;
pub mod establishment;
pub mod member;
pub mod phone;
pub mod role;
pub mod social;

pub use error::{combine, Combine, Error, ErrorKind, Failure, Outcome, ValidationErrors};
pub use ids::TypedId;
