//! Internal Diesel row structs.
//!
//! These types never leave the persistence layer. Conversions into domain
//! aggregates re-validate stored values, so a corrupt row surfaces as a
//! query error instead of an invalid aggregate.

use std::collections::BTreeSet;

use diesel::prelude::*;

use crate::domain::{EmailAddress, Group, GroupName, NewUser, RecordKey, User, UserName};

use super::schema::{groups, users};

/// Reasons a stored row cannot be turned back into an aggregate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(crate) enum RowConversionError {
    #[error("stored key is malformed: {0}")]
    Key(String),
    #[error("stored field {field} is invalid: {message}")]
    Field {
        field: &'static str,
        message: String,
    },
}

fn field_error(field: &'static str, error: &dyn std::error::Error) -> RowConversionError {
    RowConversionError::Field {
        field,
        message: error.to_string(),
    }
}

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Vec<u8>,
    pub name: String,
    pub email: String,
    pub is_active: bool,
}

impl UserRow {
    /// Rebuild the domain aggregate, re-validating stored values.
    pub(crate) fn into_user(self) -> Result<User, RowConversionError> {
        let id = RecordKey::from_slice(&self.id)
            .map_err(|err| RowConversionError::Key(err.to_string()))?;
        let name = UserName::new(self.name).map_err(|err| field_error("name", &err))?;
        let email = EmailAddress::new(self.email).map_err(|err| field_error("email", &err))?;
        Ok(User::new(
            id,
            NewUser::new(name, email).with_active(self.is_active),
        ))
    }
}

/// Insertable struct for creating user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: &'a [u8],
    pub name: &'a str,
    pub email: &'a str,
    pub is_active: bool,
}

/// Changeset replacing every mutable user column.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserChangeset<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub is_active: bool,
}

/// Row struct for reading from the groups table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = groups)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct GroupRow {
    pub id: Vec<u8>,
    pub name: String,
    pub members: Vec<String>,
}

impl GroupRow {
    /// Rebuild the domain aggregate, re-validating stored values.
    pub(crate) fn into_group(self) -> Result<Group, RowConversionError> {
        let id = RecordKey::from_slice(&self.id)
            .map_err(|err| RowConversionError::Key(err.to_string()))?;
        let name = GroupName::new(self.name).map_err(|err| field_error("name", &err))?;
        let members = self
            .members
            .iter()
            .map(|raw| RecordKey::decode(raw))
            .collect::<Result<BTreeSet<_>, _>>()
            .map_err(|err| field_error("members", &err))?;
        Ok(Group::new(id, name, members))
    }
}

/// Insertable struct for creating group records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = groups)]
pub(crate) struct NewGroupRow<'a> {
    pub id: &'a [u8],
    pub name: &'a str,
    pub members: &'a [String],
}
