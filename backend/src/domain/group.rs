//! Group data model.
//!
//! A group owns its member list. Members are user identities stored by
//! value, so a member may outlive the user it names; callers decide whether
//! to tolerate or prune those dangling references.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use super::RecordKey;

/// Minimum allowed length for a group name.
pub const GROUP_NAME_MIN: usize = 2;
/// Maximum allowed length for a group name.
pub const GROUP_NAME_MAX: usize = 100;

/// Validation errors returned by [`GroupName::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupValidationError {
    EmptyName,
    NameTooShort { min: usize },
    NameTooLong { max: usize },
}

impl fmt::Display for GroupValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "group name must not be empty"),
            Self::NameTooShort { min } => {
                write!(f, "group name must be at least {min} characters")
            }
            Self::NameTooLong { max } => {
                write!(f, "group name must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for GroupValidationError {}

/// Display name of a group. Not unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub struct GroupName(String);

impl GroupName {
    /// Validate and construct a [`GroupName`].
    pub fn new(name: impl Into<String>) -> Result<Self, GroupValidationError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(GroupValidationError::EmptyName);
        }

        let length = trimmed.chars().count();
        if length < GROUP_NAME_MIN {
            return Err(GroupValidationError::NameTooShort {
                min: GROUP_NAME_MIN,
            });
        }
        if length > GROUP_NAME_MAX {
            return Err(GroupValidationError::NameTooLong {
                max: GROUP_NAME_MAX,
            });
        }

        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for GroupName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for GroupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<GroupName> for String {
    fn from(value: GroupName) -> Self {
        value.0
    }
}

/// A group that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGroup {
    pub name: GroupName,
    pub members: BTreeSet<RecordKey>,
}

impl NewGroup {
    /// Build a draft with no members.
    pub fn new(name: GroupName) -> Self {
        Self {
            name,
            members: BTreeSet::new(),
        }
    }

    /// Seed the initial member list. Duplicates collapse.
    pub fn with_members(mut self, members: impl IntoIterator<Item = RecordKey>) -> Self {
        self.members.extend(members);
        self
    }
}

/// Rename request for an existing group.
///
/// Carries no member list. Membership changes only through the per-member
/// add and remove operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupUpdate {
    pub id: String,
    pub name: GroupName,
}

impl GroupUpdate {
    /// Build a rename for the group identified by the external `id`.
    pub fn new(id: impl Into<String>, name: GroupName) -> Self {
        Self {
            id: id.into(),
            name,
        }
    }
}

/// A stored group.
///
/// ## Invariants
/// - `members` holds each user identity at most once.
/// - Members are not guaranteed to name existing users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group {
    id: RecordKey,
    name: GroupName,
    members: BTreeSet<RecordKey>,
}

impl Group {
    /// Assemble a group from stored parts.
    pub fn new(id: RecordKey, name: GroupName, members: BTreeSet<RecordKey>) -> Self {
        Self { id, name, members }
    }

    /// Attach an identity to a draft.
    pub fn from_draft(id: RecordKey, draft: NewGroup) -> Self {
        Self::new(id, draft.name, draft.members)
    }

    /// Stable group identifier.
    pub fn id(&self) -> &RecordKey {
        &self.id
    }

    /// Display name.
    pub fn name(&self) -> &GroupName {
        &self.name
    }

    /// Member identities.
    pub fn members(&self) -> &BTreeSet<RecordKey> {
        &self.members
    }

    /// Whether `user` is listed as a member.
    pub fn has_member(&self, user: &RecordKey) -> bool {
        self.members.contains(user)
    }
}
