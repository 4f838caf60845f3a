//! Port abstraction for group persistence adapters.
//!
//! Membership is changed one user at a time through
//! [`GroupRepository::add_member`] and [`GroupRepository::remove_member`].
//! Adapters must apply each as a single store-level mutation so concurrent
//! callers never lose each other's writes. Neither checks that the user
//! exists.

use async_trait::async_trait;
use pagination::OffsetWindow;

use crate::domain::{Group, GroupUpdate, NewGroup};

use super::RepositoryError;

/// Persistence contract for [`Group`] records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// Assign a fresh identity to `draft` and store it with its seed members.
    async fn create(&self, draft: &NewGroup) -> Result<Group, RepositoryError>;

    /// Fetch a group by external identifier.
    async fn find_by_id(&self, id: &str) -> Result<Group, RepositoryError>;

    /// Return groups in store order within `window`.
    async fn list(&self, window: OffsetWindow) -> Result<Vec<Group>, RepositoryError>;

    /// Total number of stored groups.
    async fn count(&self) -> Result<u64, RepositoryError>;

    /// Rename a group. Members are untouched. A missing group is a no-op.
    async fn update(&self, update: &GroupUpdate) -> Result<(), RepositoryError>;

    /// Delete by identifier. Deleting a missing group succeeds.
    async fn delete(&self, id: &str) -> Result<(), RepositoryError>;

    /// Add `user_id` to the group's members unless already present.
    ///
    /// Both identifiers must be well formed. A missing group is a no-op.
    async fn add_member(&self, group_id: &str, user_id: &str) -> Result<(), RepositoryError>;

    /// Remove `user_id` from the group's members. Absent members are ignored.
    async fn remove_member(&self, group_id: &str, user_id: &str) -> Result<(), RepositoryError>;
}
