//! PostgreSQL-backed `GroupRepository` implementation using Diesel ORM.
//!
//! Membership changes are single `UPDATE` statements guarded by
//! `= ANY(members)`. The row lock taken by the update serialises concurrent
//! writers on one group, so two adds for different users both land and
//! repeated adds leave one entry.

use std::sync::Arc;

use async_trait::async_trait;
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{Bytea, Text};
use diesel_async::RunQueryDsl;
use pagination::OffsetWindow;
use tracing::debug;

use crate::domain::ports::{GroupRepository, RepositoryError, parse_identifier};
use crate::domain::{Group, GroupUpdate, NewGroup, RecordKeyGenerator};

use super::diesel_helpers::{sql_bound, total_from};
use super::error_mapping::{map_diesel_error, map_pool_error, with_deadline};
use super::models::{GroupRow, NewGroupRow};
use super::pool::DbPool;
use super::schema::groups;

const ADD_MEMBER_SQL: &str = r#"
UPDATE groups
SET members = array_append(members, $2)
WHERE id = $1 AND NOT ($2 = ANY(members))
"#;

const REMOVE_MEMBER_SQL: &str = r#"
UPDATE groups
SET members = array_remove(members, $2)
WHERE id = $1 AND $2 = ANY(members)
"#;

/// Diesel-backed implementation of the [`GroupRepository`] port.
#[derive(Clone)]
pub struct DieselGroupRepository {
    pool: DbPool,
    keys: Arc<RecordKeyGenerator>,
}

impl DieselGroupRepository {
    /// Create a repository issuing identities from `keys`.
    pub fn new(pool: DbPool, keys: Arc<RecordKeyGenerator>) -> Self {
        Self { pool, keys }
    }

    async fn run_membership_update(
        &self,
        sql: &'static str,
        operation: &'static str,
        group_id: &str,
        user_id: &str,
    ) -> Result<(), RepositoryError> {
        let group_key = parse_identifier(group_id)?;
        let member = parse_identifier(user_id)?.encode();
        with_deadline(self.pool.query_timeout(), operation, async {
            let mut conn = self
                .pool
                .get()
                .await
                .map_err(|err| map_pool_error(err, operation))?;
            let affected = sql_query(sql)
                .bind::<Bytea, _>(group_key.as_slice())
                .bind::<Text, _>(member.as_str())
                .execute(&mut conn)
                .await
                .map_err(|err| map_diesel_error(err, operation))?;
            debug!(group_id, user_id, affected, %operation, "membership statement applied");
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl GroupRepository for DieselGroupRepository {
    async fn create(&self, draft: &NewGroup) -> Result<Group, RepositoryError> {
        const OPERATION: &str = "create group";
        let id = self.keys.next_key();
        let members: Vec<String> = draft.members.iter().map(|key| key.encode()).collect();
        with_deadline(self.pool.query_timeout(), OPERATION, async {
            let mut conn = self
                .pool
                .get()
                .await
                .map_err(|err| map_pool_error(err, OPERATION))?;
            let row = NewGroupRow {
                id: id.as_slice(),
                name: draft.name.as_ref(),
                members: &members,
            };
            diesel::insert_into(groups::table)
                .values(&row)
                .execute(&mut conn)
                .await
                .map_err(|err| map_diesel_error(err, OPERATION))?;
            debug!(group_id = %id, members = members.len(), "group row inserted");
            Ok(Group::from_draft(id, draft.clone()))
        })
        .await
    }

    async fn find_by_id(&self, id: &str) -> Result<Group, RepositoryError> {
        const OPERATION: &str = "find group";
        let key = parse_identifier(id)?;
        with_deadline(self.pool.query_timeout(), OPERATION, async {
            let mut conn = self
                .pool
                .get()
                .await
                .map_err(|err| map_pool_error(err, OPERATION))?;
            let row = groups::table
                .filter(groups::id.eq(key.as_slice()))
                .select(GroupRow::as_select())
                .first(&mut conn)
                .await
                .optional()
                .map_err(|err| map_diesel_error(err, OPERATION))?
                .ok_or_else(|| RepositoryError::not_found("group", id))?;
            row.into_group()
                .map_err(|err| RepositoryError::query(format!("{OPERATION}: {err}")))
        })
        .await
    }

    async fn list(&self, window: OffsetWindow) -> Result<Vec<Group>, RepositoryError> {
        const OPERATION: &str = "list groups";
        with_deadline(self.pool.query_timeout(), OPERATION, async {
            let mut conn = self
                .pool
                .get()
                .await
                .map_err(|err| map_pool_error(err, OPERATION))?;
            let rows = groups::table
                .order(groups::id.asc())
                .offset(sql_bound(window.offset()))
                .limit(sql_bound(window.limit()))
                .select(GroupRow::as_select())
                .load(&mut conn)
                .await
                .map_err(|err| map_diesel_error(err, OPERATION))?;
            rows.into_iter()
                .map(|row| {
                    row.into_group()
                        .map_err(|err| RepositoryError::query(format!("{OPERATION}: {err}")))
                })
                .collect()
        })
        .await
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        const OPERATION: &str = "count groups";
        with_deadline(self.pool.query_timeout(), OPERATION, async {
            let mut conn = self
                .pool
                .get()
                .await
                .map_err(|err| map_pool_error(err, OPERATION))?;
            let total: i64 = groups::table
                .select(count_star())
                .get_result(&mut conn)
                .await
                .map_err(|err| map_diesel_error(err, OPERATION))?;
            Ok(total_from(total))
        })
        .await
    }

    async fn update(&self, update: &GroupUpdate) -> Result<(), RepositoryError> {
        const OPERATION: &str = "rename group";
        let key = parse_identifier(&update.id)?;
        with_deadline(self.pool.query_timeout(), OPERATION, async {
            let mut conn = self
                .pool
                .get()
                .await
                .map_err(|err| map_pool_error(err, OPERATION))?;
            let affected = diesel::update(groups::table.filter(groups::id.eq(key.as_slice())))
                .set(groups::name.eq(update.name.as_ref()))
                .execute(&mut conn)
                .await
                .map_err(|err| map_diesel_error(err, OPERATION))?;
            debug!(group_id = %key, affected, "group row renamed");
            Ok(())
        })
        .await
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        const OPERATION: &str = "delete group";
        let key = parse_identifier(id)?;
        with_deadline(self.pool.query_timeout(), OPERATION, async {
            let mut conn = self
                .pool
                .get()
                .await
                .map_err(|err| map_pool_error(err, OPERATION))?;
            let affected = diesel::delete(groups::table.filter(groups::id.eq(key.as_slice())))
                .execute(&mut conn)
                .await
                .map_err(|err| map_diesel_error(err, OPERATION))?;
            debug!(group_id = id, affected, "group row deleted");
            Ok(())
        })
        .await
    }

    async fn add_member(&self, group_id: &str, user_id: &str) -> Result<(), RepositoryError> {
        self.run_membership_update(ADD_MEMBER_SQL, "add group member", group_id, user_id)
            .await
    }

    async fn remove_member(&self, group_id: &str, user_id: &str) -> Result<(), RepositoryError> {
        self.run_membership_update(REMOVE_MEMBER_SQL, "remove group member", group_id, user_id)
            .await
    }
}
