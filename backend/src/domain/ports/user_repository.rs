//! Port abstraction for user persistence adapters.

use async_trait::async_trait;
use pagination::OffsetWindow;

use crate::domain::{NewUser, User};

use super::RepositoryError;

/// Persistence contract for [`User`] records.
///
/// Identifiers arrive as their external encoding and are decoded by the
/// adapter, so every operation taking an id can fail with
/// [`RepositoryError::InvalidIdentifier`] without touching the store.
/// Windows are passed through unclamped; bounding page sizes is the
/// caller's job.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Assign a fresh identity to `draft` and store it.
    async fn create(&self, draft: &NewUser) -> Result<User, RepositoryError>;

    /// Fetch a user by external identifier.
    async fn find_by_id(&self, id: &str) -> Result<User, RepositoryError>;

    /// Return users in store order, skipping `window.offset()` and returning
    /// at most `window.limit()`.
    async fn list(&self, window: OffsetWindow) -> Result<Vec<User>, RepositoryError>;

    /// Case-insensitive literal substring match on name or email.
    async fn search(&self, term: &str, window: OffsetWindow)
    -> Result<Vec<User>, RepositoryError>;

    /// Total number of stored users.
    async fn count(&self) -> Result<u64, RepositoryError>;

    /// Number of users [`UserRepository::search`] would match with no window.
    async fn count_search(&self, term: &str) -> Result<u64, RepositoryError>;

    /// Replace name, email and active flag of the user with the same
    /// identity. Updating a missing identity succeeds without effect.
    async fn update(&self, user: &User) -> Result<(), RepositoryError>;

    /// Delete by identifier. Deleting a missing user succeeds.
    async fn delete(&self, id: &str) -> Result<(), RepositoryError>;
}
