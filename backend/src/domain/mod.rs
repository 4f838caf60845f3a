//! Domain primitives, ports, and use-case services.
//!
//! Purpose: define the user and group aggregates, the identity codec that
//! turns external identifiers into record keys, and the services that drive
//! the repository ports. Nothing here knows which store backs the ports.
//!
//! Public surface:
//! - [`RecordKey`] and [`RecordKeyGenerator`]: identity codec and key issuer.
//! - [`User`], [`Group`] and their drafts: validated aggregates.
//! - [`UserService`], [`GroupService`]: use cases over the ports.
//! - [`Error`], [`ErrorCode`]: transport-agnostic failure payload.

pub mod error;
pub mod group;
pub mod group_service;
pub mod identity;
pub mod ports;
mod service_errors;
pub mod user;
pub mod user_service;

pub use self::error::{Error, ErrorCode};
pub use self::group::{
    GROUP_NAME_MAX, GROUP_NAME_MIN, Group, GroupName, GroupUpdate, GroupValidationError, NewGroup,
};
pub use self::group_service::GroupService;
pub use self::identity::{
    ENCODED_KEY_LEN, IdentityError, RECORD_KEY_LEN, RecordKey, RecordKeyGenerator,
};
pub use self::user::{
    EMAIL_MAX, EmailAddress, NewUser, USER_NAME_MAX, USER_NAME_MIN, User, UserName,
    UserValidationError,
};
pub use self::user_service::{UserListQuery, UserService};

/// Result alias for use-case operations.
///
/// # Examples
/// ```
/// use user_management::domain::{Error, ServiceResult};
///
/// fn lookup() -> ServiceResult<()> {
///     Err(Error::not_found("user not found"))
/// }
/// assert!(lookup().is_err());
/// ```
pub type ServiceResult<T> = Result<T, Error>;
