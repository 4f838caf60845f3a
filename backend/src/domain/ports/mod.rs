//! Domain ports for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod group_repository;
mod repository_error;
mod user_repository;

#[cfg(test)]
pub use group_repository::MockGroupRepository;
pub use group_repository::GroupRepository;
pub use repository_error::{RepositoryError, parse_identifier};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::UserRepository;
