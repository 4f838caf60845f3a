//! Group use cases.
//!
//! The group repository never looks at users. This service adds the
//! cross-aggregate checks callers usually want: a member must exist when it
//! is added, and [`GroupService::prune_dangling_members`] clears out members
//! whose user has since been deleted.

use std::sync::Arc;

use pagination::{Page, PageRequest};
use tracing::{debug, info};

use crate::domain::ports::{GroupRepository, RepositoryError, UserRepository};
use crate::domain::service_errors::map_repository_error;
use crate::domain::{Error, Group, GroupName, GroupUpdate, NewGroup, RecordKey};

/// Group service driving the group and user ports.
#[derive(Clone)]
pub struct GroupService<G, U> {
    groups: Arc<G>,
    users: Arc<U>,
}

impl<G, U> GroupService<G, U> {
    /// Create a service over the given repositories.
    pub fn new(groups: Arc<G>, users: Arc<U>) -> Self {
        Self { groups, users }
    }
}

impl<G, U> GroupService<G, U>
where
    G: GroupRepository,
    U: UserRepository,
{
    /// Store a new group. Seed members are not checked against users.
    pub async fn create(&self, draft: NewGroup) -> Result<Group, Error> {
        let group = self
            .groups
            .create(&draft)
            .await
            .map_err(map_repository_error)?;
        info!(group_id = %group.id(), members = group.members().len(), "group created");
        Ok(group)
    }

    /// Fetch a group by external identifier.
    pub async fn get(&self, id: &str) -> Result<Group, Error> {
        self.groups.find_by_id(id).await.map_err(map_repository_error)
    }

    /// Fetch one page of groups.
    pub async fn list(&self, request: PageRequest) -> Result<Page<Group>, Error> {
        let groups = self
            .groups
            .list(request.window())
            .await
            .map_err(map_repository_error)?;
        let total = self.groups.count().await.map_err(map_repository_error)?;
        Ok(Page::new(groups, request, total))
    }

    /// Rename an existing group and return its current state.
    pub async fn rename(&self, id: &str, name: GroupName) -> Result<Group, Error> {
        self.groups
            .find_by_id(id)
            .await
            .map_err(map_repository_error)?;
        self.groups
            .update(&GroupUpdate::new(id, name))
            .await
            .map_err(map_repository_error)?;
        info!(group_id = id, "group renamed");
        self.get(id).await
    }

    /// Delete a group. Missing groups are not an error.
    pub async fn delete(&self, id: &str) -> Result<(), Error> {
        self.groups.delete(id).await.map_err(map_repository_error)?;
        info!(group_id = id, "group deleted");
        Ok(())
    }

    /// Add an existing user to an existing group.
    ///
    /// The user is looked up first, then the group; either lookup failing
    /// stops the operation before any write. Adding a current member is a
    /// no-op.
    pub async fn add_member(&self, group_id: &str, user_id: &str) -> Result<(), Error> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(map_repository_error)?;
        self.groups
            .find_by_id(group_id)
            .await
            .map_err(map_repository_error)?;
        self.groups
            .add_member(group_id, user_id)
            .await
            .map_err(map_repository_error)?;
        info!(group_id, user_id, "member added");
        Ok(())
    }

    /// Remove a user from a group. Neither the user nor the membership has
    /// to exist.
    pub async fn remove_member(&self, group_id: &str, user_id: &str) -> Result<(), Error> {
        self.groups
            .remove_member(group_id, user_id)
            .await
            .map_err(map_repository_error)?;
        info!(group_id, user_id, "member removed");
        Ok(())
    }

    /// Remove members whose user no longer exists.
    ///
    /// Each removal is the same atomic operation as
    /// [`GroupService::remove_member`], so members added concurrently are
    /// never lost. Returns the identities that were removed.
    pub async fn prune_dangling_members(&self, group_id: &str) -> Result<Vec<RecordKey>, Error> {
        let group = self.get(group_id).await?;
        let mut pruned = Vec::new();

        for member in group.members() {
            let encoded = member.encode();
            match self.users.find_by_id(&encoded).await {
                Ok(_) => {}
                Err(RepositoryError::NotFound { .. }) => {
                    debug!(group_id, user_id = %encoded, "pruning dangling member");
                    self.groups
                        .remove_member(group_id, &encoded)
                        .await
                        .map_err(map_repository_error)?;
                    pruned.push(*member);
                }
                Err(other) => return Err(map_repository_error(other)),
            }
        }

        info!(group_id, pruned = pruned.len(), "dangling members pruned");
        Ok(pruned)
    }
}

#[cfg(test)]
#[path = "group_service_tests.rs"]
mod tests;
