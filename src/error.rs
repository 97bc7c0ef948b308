//! Error taxonomy.
//!
//! The store reports what the database said ([`StoreError`]); each service turns that
//! into the error its callers can act on. Internal variants carry no detail on purpose:
//! the detail is logged where the failure happened.

use thiserror::Error;
use uuid::Uuid;

use crate::domain::aggregates::ReconcileError;

/// SQLSTATE codes the store distinguishes.
pub mod sqlstate {
    pub const FOREIGN_KEY_VIOLATION: &str = "23503";
    pub const UNIQUE_VIOLATION: &str = "23505";
    pub const CHECK_VIOLATION: &str = "23514";
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("check constraint violated: {0}")]
    CheckViolation(String),

    #[error("foreign key violated: {0}")]
    ForeignKeyViolation(String),

    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("variant {0} not found")]
    MissingVariant(Uuid),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error("unreadable {column} value `{value}`")]
    Corrupt { column: &'static str, value: String },

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self { Self::NotFound { entity, id: id.to_string() } }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            let detail = db.constraint().map(str::to_string).unwrap_or_else(|| db.message().to_string());
            match db.code().as_deref() {
                Some(sqlstate::CHECK_VIOLATION) => return Self::CheckViolation(detail),
                Some(sqlstate::FOREIGN_KEY_VIOLATION) => return Self::ForeignKeyViolation(detail),
                Some(sqlstate::UNIQUE_VIOLATION) => return Self::UniqueViolation(detail),
                _ => {}
            }
        }
        Self::Database(err)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("{0}")]
    Validation(String),

    #[error("insufficient stock for one of the items")]
    InsufficientStock,

    #[error("variant {0} is no longer available")]
    VariantUnavailable(Uuid),

    #[error("order {0} not found")]
    NotFound(i64),

    #[error("failed to process order")]
    Internal,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatusError {
    #[error("{0}")]
    Validation(String),

    #[error("order {0} not found")]
    NotFound(i64),

    #[error("failed to update status")]
    Internal,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProductError {
    #[error("{0}")]
    Validation(String),

    #[error("product {0} not found")]
    NotFound(Uuid),

    #[error("{0}")]
    Conflict(String),

    #[error("referenced row conflict: {0}")]
    ReferentialConflict(String),

    #[error("failed to save product")]
    Internal,
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;
