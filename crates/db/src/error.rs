//! Mapping of database errors onto the core storage error.

use posrecon_core::repository::StoreError;
use sea_orm::{DbErr, SqlErr};

/// Converts a `SeaORM` error into a [`StoreError`].
///
/// Unique-constraint violations become `Conflict`, missing records become
/// `NotFound`, everything else is a backend failure.
#[must_use]
pub fn store_error(err: DbErr) -> StoreError {
    if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
        return StoreError::Conflict(detail);
    }
    match err {
        DbErr::RecordNotFound(msg) => StoreError::NotFound(msg),
        other => StoreError::backend(other.to_string()),
    }
}
