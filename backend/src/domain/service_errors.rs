//! Conversions from port and validation failures into domain [`Error`]s.

use pagination::PageRequestError;
use serde_json::json;

use super::ports::RepositoryError;
use super::{Error, GroupValidationError, UserValidationError};

/// Map a repository failure onto the transport-agnostic error payload.
pub(crate) fn map_repository_error(error: RepositoryError) -> Error {
    let message = error.to_string();
    match error {
        RepositoryError::InvalidIdentifier { value } => {
            Error::invalid_request(message).with_details(json!({ "id": value }))
        }
        RepositoryError::NotFound { entity, id } => {
            Error::not_found(message).with_details(json!({ "entity": entity, "id": id }))
        }
        RepositoryError::ConstraintViolation { .. } => Error::conflict(message),
        RepositoryError::StoreUnavailable { .. } | RepositoryError::Cancelled { .. } => {
            Error::service_unavailable(message)
        }
        RepositoryError::Query { .. } => Error::internal(message),
    }
}

impl From<UserValidationError> for Error {
    fn from(value: UserValidationError) -> Self {
        Self::invalid_request(value.to_string())
    }
}

impl From<GroupValidationError> for Error {
    fn from(value: GroupValidationError) -> Self {
        Self::invalid_request(value.to_string())
    }
}

impl From<PageRequestError> for Error {
    fn from(value: PageRequestError) -> Self {
        Self::invalid_request(value.to_string())
    }
}
