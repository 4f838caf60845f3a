//! Diesel and pool error mapping shared by the user and group adapters.
//!
//! Every mapped error is prefixed with the operation that failed, for example
//! `list groups: database error`. Raw driver messages are logged at debug
//! level rather than surfaced.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::domain::ports::RepositoryError;

use super::pool::PoolError;

/// Map a pool checkout or build failure to [`RepositoryError::StoreUnavailable`].
pub(crate) fn map_pool_error(error: PoolError, operation: &str) -> RepositoryError {
    let message = match error {
        PoolError::Checkout { message }
        | PoolError::Build { message }
        | PoolError::InvalidSettings { message } => message,
    };
    debug!(%operation, %message, "connection pool failure");
    RepositoryError::store_unavailable(format!("{operation}: {message}"))
}

/// Map a Diesel error, logging the driver detail.
pub(crate) fn map_diesel_error(error: diesel::result::Error, operation: &str) -> RepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), %operation, "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            %operation,
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation
            | DatabaseErrorKind::ForeignKeyViolation
            | DatabaseErrorKind::NotNullViolation
            | DatabaseErrorKind::CheckViolation,
            info,
        ) => RepositoryError::constraint_violation(format!(
            "{operation}: {}",
            info.constraint_name().unwrap_or("unnamed constraint")
        )),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            RepositoryError::store_unavailable(format!("{operation}: database connection error"))
        }
        DieselError::DeserializationError(_) => {
            RepositoryError::query(format!("{operation}: unreadable row"))
        }
        _ => RepositoryError::query(format!("{operation}: database error")),
    }
}

/// Run `future` under `deadline`, reporting expiry as
/// [`RepositoryError::Cancelled`].
pub(crate) async fn with_deadline<T, F>(
    deadline: Duration,
    operation: &str,
    future: F,
) -> Result<T, RepositoryError>
where
    F: Future<Output = Result<T, RepositoryError>>,
{
    match tokio::time::timeout(deadline, future).await {
        Ok(result) => result,
        Err(_) => {
            warn!(%operation, deadline_ms = deadline.as_millis(), "repository deadline expired");
            Err(RepositoryError::cancelled(operation))
        }
    }
}
