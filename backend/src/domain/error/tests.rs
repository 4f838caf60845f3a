//! Tests for the use-case error payload.

use super::*;
use rstest::rstest;
use serde_json::json;

#[rstest]
#[case(Error::invalid_request("bad"), ErrorCode::InvalidRequest, false)]
#[case(Error::not_found("gone"), ErrorCode::NotFound, false)]
#[case(Error::conflict("taken"), ErrorCode::Conflict, false)]
#[case(Error::service_unavailable("down"), ErrorCode::ServiceUnavailable, true)]
#[case(Error::internal("boom"), ErrorCode::InternalError, false)]
fn constructors_set_code(
    #[case] error: Error,
    #[case] expected: ErrorCode,
    #[case] retryable: bool,
) {
    assert_eq!(error.code(), expected);
    assert_eq!(error.is_retryable(), retryable);
}

#[rstest]
fn blank_message_gets_placeholder() {
    let error = Error::new(ErrorCode::InternalError, "  ");
    assert_eq!(error.message(), "unspecified error");
}

#[rstest]
fn display_prefixes_the_code() {
    let error = Error::not_found("group 000000000000000000000001 not found");
    assert_eq!(
        error.to_string(),
        "not_found: group 000000000000000000000001 not found"
    );
}

#[rstest]
fn serialises_code_in_snake_case_and_skips_missing_details() {
    let value = serde_json::to_value(Error::service_unavailable("store down"))
        .expect("error serialises");
    assert_eq!(
        value,
        json!({ "code": "service_unavailable", "message": "store down" })
    );
}

#[rstest]
fn serialises_details_when_present() {
    let error = Error::invalid_request("bad id").with_details(json!({ "id": "xyz" }));
    let value = serde_json::to_value(&error).expect("error serialises");
    assert_eq!(value["details"], json!({ "id": "xyz" }));
}
