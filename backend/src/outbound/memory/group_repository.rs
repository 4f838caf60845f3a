//! Mutex-guarded in-memory `GroupRepository`.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use pagination::OffsetWindow;

use crate::domain::ports::{GroupRepository, RepositoryError, parse_identifier};
use crate::domain::{Group, GroupName, GroupUpdate, NewGroup, RecordKey, RecordKeyGenerator};

use super::window_bounds;

#[derive(Debug, Clone)]
struct StoredGroup {
    id: RecordKey,
    name: GroupName,
    members: BTreeSet<RecordKey>,
}

impl StoredGroup {
    fn snapshot(&self) -> Group {
        Group::new(self.id, self.name.clone(), self.members.clone())
    }
}

/// In-memory implementation of the [`GroupRepository`] port.
///
/// Membership updates happen under the store mutex, so each add or remove
/// is atomic with respect to every other call.
#[derive(Debug, Default)]
pub struct InMemoryGroupRepository {
    groups: Mutex<Vec<StoredGroup>>,
    keys: Arc<RecordKeyGenerator>,
}

impl InMemoryGroupRepository {
    /// Create an empty repository issuing identities from `keys`.
    pub fn new(keys: Arc<RecordKeyGenerator>) -> Self {
        Self {
            groups: Mutex::new(Vec::new()),
            keys,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<StoredGroup>> {
        self.groups.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_group(&self, key: RecordKey, change: impl FnOnce(&mut StoredGroup)) {
        if let Some(group) = self.lock().iter_mut().find(|group| group.id == key) {
            change(group);
        }
    }
}

#[async_trait]
impl GroupRepository for InMemoryGroupRepository {
    async fn create(&self, draft: &NewGroup) -> Result<Group, RepositoryError> {
        let stored = StoredGroup {
            id: self.keys.next_key(),
            name: draft.name.clone(),
            members: draft.members.clone(),
        };
        let group = stored.snapshot();
        self.lock().push(stored);
        Ok(group)
    }

    async fn find_by_id(&self, id: &str) -> Result<Group, RepositoryError> {
        let key = parse_identifier(id)?;
        self.lock()
            .iter()
            .find(|group| group.id == key)
            .map(StoredGroup::snapshot)
            .ok_or_else(|| RepositoryError::not_found("group", id))
    }

    async fn list(&self, window: OffsetWindow) -> Result<Vec<Group>, RepositoryError> {
        let groups = self.lock();
        let (start, take) = window_bounds(groups.len(), window.offset(), window.limit());
        Ok(groups
            .iter()
            .skip(start)
            .take(take)
            .map(StoredGroup::snapshot)
            .collect())
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(u64::try_from(self.lock().len()).unwrap_or(u64::MAX))
    }

    async fn update(&self, update: &GroupUpdate) -> Result<(), RepositoryError> {
        let key = parse_identifier(&update.id)?;
        self.with_group(key, |group| group.name = update.name.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        let key = parse_identifier(id)?;
        self.lock().retain(|group| group.id != key);
        Ok(())
    }

    async fn add_member(&self, group_id: &str, user_id: &str) -> Result<(), RepositoryError> {
        let key = parse_identifier(group_id)?;
        let member = parse_identifier(user_id)?;
        self.with_group(key, |group| {
            group.members.insert(member);
        });
        Ok(())
    }

    async fn remove_member(&self, group_id: &str, user_id: &str) -> Result<(), RepositoryError> {
        let key = parse_identifier(group_id)?;
        let member = parse_identifier(user_id)?;
        self.with_group(key, |group| {
            group.members.remove(&member);
        });
        Ok(())
    }
}
