//! Translation from pool and Diesel errors into domain persistence errors.

use diesel::result::{DatabaseErrorKind, Error as DieselError};

use crate::domain::ports::PersistenceError;

use super::pool::PoolError;

/// Map a pool error to a persistence error.
pub(crate) fn map_pool_error(error: PoolError) -> PersistenceError {
    PersistenceError::connection(error.to_string())
}

/// Map a Diesel error to a persistence error.
///
/// Unique and foreign-key violations become [`PersistenceError::Conflict`]
/// so callers can surface them as HTTP 409; `NotFound` maps to
/// [`PersistenceError::NotFound`]; everything else is a query failure.
pub(crate) fn map_diesel_error(error: DieselError) -> PersistenceError {
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            PersistenceError::conflict(info.message().to_owned())
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            PersistenceError::conflict(info.message().to_owned())
        }
        DieselError::NotFound => PersistenceError::NotFound,
        other => PersistenceError::query(other.to_string()),
    }
}
