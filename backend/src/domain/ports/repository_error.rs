//! Error taxonomy shared by the user and group repositories.

use crate::domain::RecordKey;

use super::define_port_error;

define_port_error! {
    /// Failures raised by repository adapters.
    ///
    /// A malformed identifier is always [`RepositoryError::InvalidIdentifier`]
    /// and is detected before the store is touched. A well-formed identifier
    /// with no stored entity is [`RepositoryError::NotFound`].
    pub enum RepositoryError {
        /// External identifier is not 24 lowercase hex characters.
        InvalidIdentifier { value: String } => "invalid identifier {value:?}",
        /// No entity carries the given identity.
        NotFound { entity: String, id: String } => "{entity} {id} not found",
        /// The store could not be reached.
        StoreUnavailable { message: String } => "store unavailable: {message}",
        /// A store-level constraint rejected the write.
        ConstraintViolation { message: String } => "constraint violation: {message}",
        /// Any other store failure.
        Query { message: String } => "store query failed: {message}",
        /// The operation deadline expired before the store answered.
        Cancelled { operation: String } => "{operation}: cancelled",
    }
}

/// Decode an external identifier, mapping failures onto
/// [`RepositoryError::InvalidIdentifier`].
pub fn parse_identifier(raw: &str) -> Result<RecordKey, RepositoryError> {
    RecordKey::decode(raw).map_err(|_| RepositoryError::invalid_identifier(raw))
}
