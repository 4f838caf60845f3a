//! Tests for the domain user model.

use super::*;
use rstest::{fixture, rstest};
use serde_json::json;

const VALID_ID: &str = "65f1a2b3c4d5e6f708192a3b";

#[fixture]
fn draft() -> NewUser {
    NewUser::try_from_strings("Ada Lovelace", "ada@example.com").expect("valid draft")
}

#[rstest]
#[case("", UserValidationError::EmptyName)]
#[case("   ", UserValidationError::EmptyName)]
#[case("A", UserValidationError::NameTooShort { min: USER_NAME_MIN })]
fn user_name_rejects_short_input(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(UserName::new(raw), Err(expected));
}

#[rstest]
fn user_name_rejects_long_input() {
    let raw = "a".repeat(USER_NAME_MAX + 1);
    assert_eq!(
        UserName::new(raw),
        Err(UserValidationError::NameTooLong { max: USER_NAME_MAX })
    );
}

#[rstest]
fn user_name_trims_whitespace() {
    let name = UserName::new("  Grace Hopper ").expect("valid name");
    assert_eq!(name.as_ref(), "Grace Hopper");
}

#[rstest]
fn user_name_counts_characters_not_bytes() {
    let name = UserName::new("Zoë").expect("three characters");
    assert_eq!(name.as_ref(), "Zoë");
}

#[rstest]
#[case("ada@example.com")]
#[case("first.last+tag@sub.example.org")]
fn email_accepts_well_formed_addresses(#[case] raw: &str) {
    assert_eq!(EmailAddress::new(raw).map(String::from), Ok(raw.to_owned()));
}

#[rstest]
#[case("", UserValidationError::EmptyEmail)]
#[case("no-at-sign", UserValidationError::InvalidEmail)]
#[case("two@@example.com", UserValidationError::InvalidEmail)]
#[case("missing@tld", UserValidationError::InvalidEmail)]
#[case("spaces in@example.com", UserValidationError::InvalidEmail)]
fn email_rejects_malformed_addresses(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(EmailAddress::new(raw), Err(expected));
}

#[rstest]
fn drafts_default_to_active(draft: NewUser) {
    assert!(draft.is_active);
    assert!(!draft.with_active(false).is_active);
}

#[rstest]
fn replaced_with_keeps_identity(draft: NewUser) {
    let id = RecordKey::decode(VALID_ID).expect("valid id");
    let user = User::new(id, draft);
    let replacement = NewUser::try_from_strings("Ada King", "ada.king@example.com")
        .expect("valid draft")
        .with_active(false);

    let updated = user.replaced_with(replacement);

    assert_eq!(updated.id(), user.id());
    assert_eq!(updated.name().as_ref(), "Ada King");
    assert_eq!(updated.email().as_ref(), "ada.king@example.com");
    assert!(!updated.is_active());
}

#[rstest]
fn user_serialises_with_encoded_id(draft: NewUser) {
    let id = RecordKey::decode(VALID_ID).expect("valid id");
    let value = serde_json::to_value(User::new(id, draft)).expect("user serialises");
    assert_eq!(
        value,
        json!({
            "id": VALID_ID,
            "name": "Ada Lovelace",
            "email": "ada@example.com",
            "is_active": true,
        })
    );
}
