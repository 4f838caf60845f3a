//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use std::sync::Arc;

use async_trait::async_trait;
use diesel::dsl::count_star;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::Bool;
use diesel_async::RunQueryDsl;
use pagination::OffsetWindow;
use tracing::debug;

use crate::domain::ports::{RepositoryError, UserRepository, parse_identifier};
use crate::domain::{NewUser, RecordKeyGenerator, User};

use super::diesel_helpers::{sql_bound, total_from};
use super::error_mapping::{map_diesel_error, map_pool_error, with_deadline};
use super::models::{NewUserRow, UserChangeset, UserRow};
use super::pool::DbPool;
use super::schema::users;

/// Diesel-backed implementation of the [`UserRepository`] port.
///
/// Listing and search are ordered by primary key, so consecutive windows
/// over an unchanged table never repeat or skip a row.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
    keys: Arc<RecordKeyGenerator>,
}

impl DieselUserRepository {
    /// Create a repository issuing identities from `keys`.
    pub fn new(pool: DbPool, keys: Arc<RecordKeyGenerator>) -> Self {
        Self { pool, keys }
    }
}

type SearchFilter = Box<dyn BoxableExpression<users::table, Pg, SqlType = Bool>>;

/// Escape `%`, `_` and `\` so `term` matches literally inside `ILIKE`.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn matches_term(term: &str) -> SearchFilter {
    let pattern = like_pattern(term);
    Box::new(users::name.ilike(pattern.clone()).or(users::email.ilike(pattern)))
}

fn rows_to_users(rows: Vec<UserRow>, operation: &str) -> Result<Vec<User>, RepositoryError> {
    rows.into_iter()
        .map(|row| {
            row.into_user()
                .map_err(|err| RepositoryError::query(format!("{operation}: {err}")))
        })
        .collect()
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, draft: &NewUser) -> Result<User, RepositoryError> {
        const OPERATION: &str = "create user";
        let id = self.keys.next_key();
        with_deadline(self.pool.query_timeout(), OPERATION, async {
            let mut conn = self
                .pool
                .get()
                .await
                .map_err(|err| map_pool_error(err, OPERATION))?;
            let row = NewUserRow {
                id: id.as_slice(),
                name: draft.name.as_ref(),
                email: draft.email.as_ref(),
                is_active: draft.is_active,
            };
            diesel::insert_into(users::table)
                .values(&row)
                .execute(&mut conn)
                .await
                .map_err(|err| map_diesel_error(err, OPERATION))?;
            debug!(user_id = %id, "user row inserted");
            Ok(User::new(id, draft.clone()))
        })
        .await
    }

    async fn find_by_id(&self, id: &str) -> Result<User, RepositoryError> {
        const OPERATION: &str = "find user";
        let key = parse_identifier(id)?;
        with_deadline(self.pool.query_timeout(), OPERATION, async {
            let mut conn = self
                .pool
                .get()
                .await
                .map_err(|err| map_pool_error(err, OPERATION))?;
            let row = users::table
                .filter(users::id.eq(key.as_slice()))
                .select(UserRow::as_select())
                .first(&mut conn)
                .await
                .optional()
                .map_err(|err| map_diesel_error(err, OPERATION))?
                .ok_or_else(|| RepositoryError::not_found("user", id))?;
            row.into_user()
                .map_err(|err| RepositoryError::query(format!("{OPERATION}: {err}")))
        })
        .await
    }

    async fn list(&self, window: OffsetWindow) -> Result<Vec<User>, RepositoryError> {
        const OPERATION: &str = "list users";
        with_deadline(self.pool.query_timeout(), OPERATION, async {
            let mut conn = self
                .pool
                .get()
                .await
                .map_err(|err| map_pool_error(err, OPERATION))?;
            let rows = users::table
                .order(users::id.asc())
                .offset(sql_bound(window.offset()))
                .limit(sql_bound(window.limit()))
                .select(UserRow::as_select())
                .load(&mut conn)
                .await
                .map_err(|err| map_diesel_error(err, OPERATION))?;
            rows_to_users(rows, OPERATION)
        })
        .await
    }

    async fn search(
        &self,
        term: &str,
        window: OffsetWindow,
    ) -> Result<Vec<User>, RepositoryError> {
        const OPERATION: &str = "search users";
        with_deadline(self.pool.query_timeout(), OPERATION, async {
            let mut conn = self
                .pool
                .get()
                .await
                .map_err(|err| map_pool_error(err, OPERATION))?;
            let rows = users::table
                .filter(matches_term(term))
                .order(users::id.asc())
                .offset(sql_bound(window.offset()))
                .limit(sql_bound(window.limit()))
                .select(UserRow::as_select())
                .load(&mut conn)
                .await
                .map_err(|err| map_diesel_error(err, OPERATION))?;
            rows_to_users(rows, OPERATION)
        })
        .await
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        const OPERATION: &str = "count users";
        with_deadline(self.pool.query_timeout(), OPERATION, async {
            let mut conn = self
                .pool
                .get()
                .await
                .map_err(|err| map_pool_error(err, OPERATION))?;
            let total: i64 = users::table
                .select(count_star())
                .get_result(&mut conn)
                .await
                .map_err(|err| map_diesel_error(err, OPERATION))?;
            Ok(total_from(total))
        })
        .await
    }

    async fn count_search(&self, term: &str) -> Result<u64, RepositoryError> {
        const OPERATION: &str = "count user search";
        with_deadline(self.pool.query_timeout(), OPERATION, async {
            let mut conn = self
                .pool
                .get()
                .await
                .map_err(|err| map_pool_error(err, OPERATION))?;
            let total: i64 = users::table
                .filter(matches_term(term))
                .select(count_star())
                .get_result(&mut conn)
                .await
                .map_err(|err| map_diesel_error(err, OPERATION))?;
            Ok(total_from(total))
        })
        .await
    }

    async fn update(&self, user: &User) -> Result<(), RepositoryError> {
        const OPERATION: &str = "update user";
        with_deadline(self.pool.query_timeout(), OPERATION, async {
            let mut conn = self
                .pool
                .get()
                .await
                .map_err(|err| map_pool_error(err, OPERATION))?;
            let changes = UserChangeset {
                name: user.name().as_ref(),
                email: user.email().as_ref(),
                is_active: user.is_active(),
            };
            let affected = diesel::update(users::table.filter(users::id.eq(user.id().as_slice())))
                .set(&changes)
                .execute(&mut conn)
                .await
                .map_err(|err| map_diesel_error(err, OPERATION))?;
            debug!(user_id = %user.id(), affected, "user row updated");
            Ok(())
        })
        .await
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        const OPERATION: &str = "delete user";
        let key = parse_identifier(id)?;
        with_deadline(self.pool.query_timeout(), OPERATION, async {
            let mut conn = self
                .pool
                .get()
                .await
                .map_err(|err| map_pool_error(err, OPERATION))?;
            let affected = diesel::delete(users::table.filter(users::id.eq(key.as_slice())))
                .execute(&mut conn)
                .await
                .map_err(|err| map_diesel_error(err, OPERATION))?;
            debug!(user_id = id, affected, "user row deleted");
            Ok(())
        })
        .await
    }
}
