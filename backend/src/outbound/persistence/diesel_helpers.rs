//! Shared helpers for the Diesel repositories.
//!
//! - Error mapping from pool and Diesel errors to [`RepositoryError`]
//! - Pagination windows and count conversion
//! - Conversion failures for rows that no longer satisfy domain rules

use std::fmt::Display;

use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use tracing::{debug, warn};

use crate::domain::PageRequest;
use crate::domain::ports::RepositoryError;

use super::pool::PoolError;

/// Exclusion constraint rejecting overlapping active reservations.
pub const RESERVATION_OVERLAP_CONSTRAINT: &str = "reservations_no_overlap";

/// Map pool errors to connection failures.
pub fn map_pool_error(error: PoolError) -> RepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            RepositoryError::connection(message)
        }
    }
}

fn constraint_label(info: &dyn DatabaseErrorInformation) -> String {
    info.constraint_name()
        .map_or_else(|| info.message().to_owned(), str::to_owned)
}

/// Map Diesel errors to repository errors.
///
/// Unique violations and the reservation exclusion constraint become
/// [`RepositoryError::Duplicate`] so services can report a conflict.
pub fn map_diesel_error(error: DieselError) -> RepositoryError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                constraint = info.constraint_name(),
                "diesel operation failed"
            );
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => RepositoryError::query("record not found"),
        DieselError::QueryBuilderError(_) => RepositoryError::query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            RepositoryError::duplicate(constraint_label(&*info))
        }
        DieselError::DatabaseError(_, info)
            if info.constraint_name() == Some(RESERVATION_OVERLAP_CONSTRAINT) =>
        {
            RepositoryError::duplicate(RESERVATION_OVERLAP_CONSTRAINT)
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            warn!(
                constraint = info.constraint_name(),
                "foreign key violation reached the repository"
            );
            RepositoryError::query("referenced record does not exist")
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            RepositoryError::connection("database connection error")
        }
        _ => RepositoryError::query("database error"),
    }
}

/// Error for a stored row that fails domain validation.
pub fn invalid_row(entity: &str, id: impl Display, reason: impl Display) -> RepositoryError {
    RepositoryError::query(format!("stored {entity} {id} is invalid: {reason}"))
}

/// `(limit, offset)` for a page request.
pub fn page_window(page: PageRequest) -> (i64, i64) {
    let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);
    (i64::from(page.size()), offset)
}

/// Convert a `COUNT(*)` result; negative values cannot occur.
pub fn count_to_u64(count: i64) -> u64 {
    u64::try_from(count).unwrap_or_default()
}
