//! Mutex-guarded in-memory `UserRepository`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use pagination::OffsetWindow;

use crate::domain::ports::{RepositoryError, UserRepository, parse_identifier};
use crate::domain::{NewUser, RecordKeyGenerator, User};

use super::window_bounds;

/// In-memory implementation of the [`UserRepository`] port.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
    keys: Arc<RecordKeyGenerator>,
}

impl InMemoryUserRepository {
    /// Create an empty repository issuing identities from `keys`.
    pub fn new(keys: Arc<RecordKeyGenerator>) -> Self {
        Self {
            users: Mutex::new(Vec::new()),
            keys,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<User>> {
        self.users.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn matches(user: &User, needle: &str) -> bool {
    user.name().as_ref().to_lowercase().contains(needle)
        || user.email().as_ref().to_lowercase().contains(needle)
}

fn page(users: impl Iterator<Item = User>, len: usize, window: OffsetWindow) -> Vec<User> {
    let (start, take) = window_bounds(len, window.offset(), window.limit());
    users.skip(start).take(take).collect()
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, draft: &NewUser) -> Result<User, RepositoryError> {
        let user = User::new(self.keys.next_key(), draft.clone());
        self.lock().push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> Result<User, RepositoryError> {
        let key = parse_identifier(id)?;
        self.lock()
            .iter()
            .find(|user| *user.id() == key)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("user", id))
    }

    async fn list(&self, window: OffsetWindow) -> Result<Vec<User>, RepositoryError> {
        let users = self.lock();
        Ok(page(users.iter().cloned(), users.len(), window))
    }

    async fn search(
        &self,
        term: &str,
        window: OffsetWindow,
    ) -> Result<Vec<User>, RepositoryError> {
        let needle = term.to_lowercase();
        let users = self.lock();
        let matched: Vec<User> = users
            .iter()
            .filter(|user| matches(user, &needle))
            .cloned()
            .collect();
        let len = matched.len();
        Ok(page(matched.into_iter(), len, window))
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(u64::try_from(self.lock().len()).unwrap_or(u64::MAX))
    }

    async fn count_search(&self, term: &str) -> Result<u64, RepositoryError> {
        let needle = term.to_lowercase();
        let total = self
            .lock()
            .iter()
            .filter(|user| matches(user, &needle))
            .count();
        Ok(u64::try_from(total).unwrap_or(u64::MAX))
    }

    async fn update(&self, user: &User) -> Result<(), RepositoryError> {
        if let Some(slot) = self
            .lock()
            .iter_mut()
            .find(|stored| stored.id() == user.id())
        {
            *slot = user.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        let key = parse_identifier(id)?;
        self.lock().retain(|user| *user.id() != key);
        Ok(())
    }
}
