//! User use cases.
//!
//! Wraps a [`UserRepository`] with the checks the repository leaves to its
//! callers: existence before update, and the page/search bookkeeping that
//! turns a [`PageRequest`] into a [`Page`].

use std::sync::Arc;

use pagination::{Page, PageRequest};
use tracing::info;

use crate::domain::ports::UserRepository;
use crate::domain::service_errors::map_repository_error;
use crate::domain::{Error, NewUser, User};

/// Listing parameters for [`UserService::list`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserListQuery {
    pub page: PageRequest,
    pub search: Option<String>,
}

impl UserListQuery {
    /// List everything on `page`.
    pub fn new(page: PageRequest) -> Self {
        Self { page, search: None }
    }

    /// Restrict the listing to users matching `term`.
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Search term, ignoring blank input.
    pub fn term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .filter(|term| !term.trim().is_empty())
    }
}

/// User service driving the [`UserRepository`] port.
#[derive(Clone)]
pub struct UserService<U> {
    users: Arc<U>,
}

impl<U> UserService<U> {
    /// Create a service over the given repository.
    pub fn new(users: Arc<U>) -> Self {
        Self { users }
    }
}

impl<U> UserService<U>
where
    U: UserRepository,
{
    /// Store a new user.
    pub async fn create(&self, draft: NewUser) -> Result<User, Error> {
        let user = self
            .users
            .create(&draft)
            .await
            .map_err(map_repository_error)?;
        info!(user_id = %user.id(), "user created");
        Ok(user)
    }

    /// Fetch a user by external identifier.
    pub async fn get(&self, id: &str) -> Result<User, Error> {
        self.users.find_by_id(id).await.map_err(map_repository_error)
    }

    /// Fetch one page of users, optionally filtered by a search term.
    ///
    /// The total comes from a second query and may not match the page
    /// contents exactly if writes happen in between.
    pub async fn list(&self, query: &UserListQuery) -> Result<Page<User>, Error> {
        let window = query.page.window();
        let (users, total) = match query.term() {
            Some(term) => {
                let users = self
                    .users
                    .search(term, window)
                    .await
                    .map_err(map_repository_error)?;
                let total = self
                    .users
                    .count_search(term)
                    .await
                    .map_err(map_repository_error)?;
                (users, total)
            }
            None => {
                let users = self
                    .users
                    .list(window)
                    .await
                    .map_err(map_repository_error)?;
                let total = self.users.count().await.map_err(map_repository_error)?;
                (users, total)
            }
        };
        Ok(Page::new(users, query.page, total))
    }

    /// Replace every field of an existing user.
    ///
    /// Fails with a not-found error when no user has the identifier.
    pub async fn update(&self, id: &str, draft: NewUser) -> Result<User, Error> {
        let existing = self
            .users
            .find_by_id(id)
            .await
            .map_err(map_repository_error)?;
        let updated = existing.replaced_with(draft);
        self.users
            .update(&updated)
            .await
            .map_err(map_repository_error)?;
        info!(user_id = %updated.id(), "user updated");
        Ok(updated)
    }

    /// Delete a user. Missing users are not an error.
    ///
    /// Group memberships naming the user are left in place.
    pub async fn delete(&self, id: &str) -> Result<(), Error> {
        self.users.delete(id).await.map_err(map_repository_error)?;
        info!(user_id = id, "user deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "user_service_tests.rs"]
mod tests;
