//! Tests for the group service.

use std::collections::BTreeSet;
use std::sync::Arc;

use mockall::Sequence;
use mockall::predicate::eq;
use pagination::{OffsetWindow, PageRequest};

use super::*;
use crate::domain::ports::{MockGroupRepository, MockUserRepository, RepositoryError};
use crate::domain::{ErrorCode, NewUser, User};

const GROUP_ID: &str = "0000000000000000000000aa";
const ALICE: &str = "000000000000000000000001";
const BOB: &str = "000000000000000000000002";

fn key(raw: &str) -> RecordKey {
    RecordKey::decode(raw).expect("valid key")
}

fn group_with(members: &[&str]) -> Group {
    Group::new(
        key(GROUP_ID),
        GroupName::new("Admins").expect("valid name"),
        members.iter().map(|raw| key(raw)).collect::<BTreeSet<_>>(),
    )
}

fn user(raw: &str) -> User {
    User::new(
        key(raw),
        NewUser::try_from_strings("Alice Johnson", "alice@example.com").expect("draft"),
    )
}

fn make_service(
    groups: MockGroupRepository,
    users: MockUserRepository,
) -> GroupService<MockGroupRepository, MockUserRepository> {
    GroupService::new(Arc::new(groups), Arc::new(users))
}

#[tokio::test]
async fn list_reports_page_metadata() {
    let mut groups = MockGroupRepository::new();
    groups
        .expect_list()
        .with(eq(OffsetWindow::new(0, 2)))
        .times(1)
        .return_once(|_| Ok(vec![group_with(&[]), group_with(&[ALICE])]));
    groups.expect_count().times(1).return_once(|| Ok(5));

    let page = make_service(groups, MockUserRepository::new())
        .list(PageRequest::new(1, 2).expect("valid page"))
        .await
        .expect("list succeeds");

    assert_eq!(page.data().len(), 2);
    assert_eq!(page.meta().total_pages, 3);
    assert!(page.meta().has_next());
}

#[tokio::test]
async fn add_member_checks_user_before_group() {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .with(eq(ALICE))
        .times(1)
        .return_once(|raw| Err(RepositoryError::not_found("user", raw)));
    let mut groups = MockGroupRepository::new();
    groups.expect_find_by_id().never();
    groups.expect_add_member().never();

    let error = make_service(groups, users)
        .add_member(GROUP_ID, ALICE)
        .await
        .expect_err("missing user");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn add_member_fails_for_missing_group() {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .times(1)
        .return_once(|raw| Ok(user(raw)));
    let mut groups = MockGroupRepository::new();
    groups
        .expect_find_by_id()
        .with(eq(GROUP_ID))
        .times(1)
        .return_once(|raw| Err(RepositoryError::not_found("group", raw)));
    groups.expect_add_member().never();

    let error = make_service(groups, users)
        .add_member(GROUP_ID, ALICE)
        .await
        .expect_err("missing group");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn add_member_rejects_malformed_user_id() {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .times(1)
        .return_once(|raw| Err(RepositoryError::invalid_identifier(raw)));

    let error = make_service(MockGroupRepository::new(), users)
        .add_member(GROUP_ID, "invalid-id")
        .await
        .expect_err("malformed id");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn add_member_writes_after_both_checks() {
    let mut seq = Sequence::new();
    let mut users = MockUserRepository::new();
    let mut groups = MockGroupRepository::new();
    users
        .expect_find_by_id()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|raw| Ok(user(raw)));
    groups
        .expect_find_by_id()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_| Ok(group_with(&[])));
    groups
        .expect_add_member()
        .with(eq(GROUP_ID), eq(ALICE))
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_, _| Ok(()));

    make_service(groups, users)
        .add_member(GROUP_ID, ALICE)
        .await
        .expect("add succeeds");
}

#[tokio::test]
async fn remove_member_skips_existence_checks() {
    let mut groups = MockGroupRepository::new();
    groups
        .expect_remove_member()
        .with(eq(GROUP_ID), eq(BOB))
        .times(1)
        .return_once(|_, _| Ok(()));
    groups.expect_find_by_id().never();
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().never();

    make_service(groups, users)
        .remove_member(GROUP_ID, BOB)
        .await
        .expect("remove succeeds");
}

#[tokio::test]
async fn rename_fails_for_missing_group() {
    let mut groups = MockGroupRepository::new();
    groups
        .expect_find_by_id()
        .times(1)
        .return_once(|raw| Err(RepositoryError::not_found("group", raw)));
    groups.expect_update().never();

    let error = make_service(groups, MockUserRepository::new())
        .rename(GROUP_ID, GroupName::new("Operators").expect("valid name"))
        .await
        .expect_err("missing group");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn rename_returns_refreshed_group() {
    let mut groups = MockGroupRepository::new();
    let mut calls = 0_u8;
    groups.expect_find_by_id().times(2).returning(move |_| {
        calls += 1;
        let name = if calls == 1 { "Admins" } else { "Operators" };
        Ok(Group::new(
            key(GROUP_ID),
            GroupName::new(name).expect("valid name"),
            BTreeSet::from([key(ALICE)]),
        ))
    });
    groups
        .expect_update()
        .withf(|update| update.id == GROUP_ID && update.name.as_ref() == "Operators")
        .times(1)
        .return_once(|_| Ok(()));

    let group = make_service(groups, MockUserRepository::new())
        .rename(GROUP_ID, GroupName::new("Operators").expect("valid name"))
        .await
        .expect("rename succeeds");

    assert_eq!(group.name().as_ref(), "Operators");
    assert!(group.has_member(&key(ALICE)));
}

#[tokio::test]
async fn prune_removes_only_missing_users() {
    let mut groups = MockGroupRepository::new();
    groups
        .expect_find_by_id()
        .times(1)
        .return_once(|_| Ok(group_with(&[ALICE, BOB])));
    groups
        .expect_remove_member()
        .with(eq(GROUP_ID), eq(BOB))
        .times(1)
        .return_once(|_, _| Ok(()));
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .times(2)
        .returning(|raw| {
            if raw == ALICE {
                Ok(user(raw))
            } else {
                Err(RepositoryError::not_found("user", raw))
            }
        });

    let pruned = make_service(groups, users)
        .prune_dangling_members(GROUP_ID)
        .await
        .expect("prune succeeds");

    assert_eq!(pruned, vec![key(BOB)]);
}

#[tokio::test]
async fn prune_stops_on_store_failure() {
    let mut groups = MockGroupRepository::new();
    groups
        .expect_find_by_id()
        .times(1)
        .return_once(|_| Ok(group_with(&[ALICE])));
    groups.expect_remove_member().never();
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .times(1)
        .return_once(|_| Err(RepositoryError::store_unavailable("pool exhausted")));

    let error = make_service(groups, users)
        .prune_dangling_members(GROUP_ID)
        .await
        .expect_err("store down");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}
