use anyhow::Result;
use serde_json::json;

use super::handle_response;
use crate::domain::models::CredentialStore;
use crate::infrastructure::credentials::memory::MemoryCredentialStore;
use crate::infrastructure::redirects::terminal::TerminalRedirect;

#[test]
fn it_returns_json_bodies_for_success() -> Result<()> {
    let store = MemoryCredentialStore::with_token("abc");
    let redirect = TerminalRedirect::default();

    let res = handle_response(200, r#"{"data": {"id": 1}}"#, &store, &redirect)?;
    assert_eq!(res, json!({"data": {"id": 1}}));

    let res = handle_response(204, "", &store, &redirect)?;
    assert_eq!(res, json!(null));

    assert_eq!(store.get(), Some("abc".to_string()));
    assert_eq!(redirect.redirect_count(), 0);
    return Ok(());
}

#[test]
fn it_rejects_non_json_success_bodies() {
    let store = MemoryCredentialStore::default();
    let redirect = TerminalRedirect::default();

    let err = handle_response(200, "<html>", &store, &redirect).unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"Unexpected response from server: body is not valid JSON");
}

#[test]
fn it_evicts_the_credential_and_redirects_once_on_401() {
    let store = MemoryCredentialStore::with_token("expired");
    let redirect = TerminalRedirect::default();

    let err = handle_response(401, r#"{"message": "Unauthenticated."}"#, &store, &redirect)
        .unwrap_err();

    assert_eq!(err.to_string(), "Unauthenticated.");
    assert_eq!(err.status(), Some(401));
    assert_eq!(store.get(), None);
    assert_eq!(redirect.redirect_count(), 1);
}

#[test]
fn it_does_not_redirect_from_the_auth_view() {
    let store = MemoryCredentialStore::with_token("stale");
    let redirect = TerminalRedirect::on_auth_view();

    let err = handle_response(401, "", &store, &redirect).unwrap_err();

    insta::assert_snapshot!(err.to_string(), @"Request failed with status code 401");
    assert_eq!(store.get(), None);
    assert_eq!(redirect.redirect_count(), 0);
}

#[test]
fn it_surfaces_the_first_validation_message() {
    let store = MemoryCredentialStore::default();
    let redirect = TerminalRedirect::default();

    let body = r#"{"message": "The given data was invalid.", "errors": {"email": ["msg1", "msg2"]}}"#;
    let err = handle_response(422, body, &store, &redirect).unwrap_err();
    assert_eq!(err.to_string(), "msg1");
}

#[test]
fn it_keeps_the_backend_field_order() {
    let store = MemoryCredentialStore::default();
    let redirect = TerminalRedirect::default();

    let body = r#"{"errors": {"password": ["The password is too short."], "email": ["The email is taken."]}}"#;
    let err = handle_response(422, body, &store, &redirect).unwrap_err();
    assert_eq!(err.to_string(), "The password is too short.");
}

#[test]
fn it_falls_back_to_the_top_level_validation_message() {
    let store = MemoryCredentialStore::default();
    let redirect = TerminalRedirect::default();

    let body = r#"{"message": "The given data was invalid.", "errors": {}}"#;
    let err = handle_response(422, body, &store, &redirect).unwrap_err();
    assert_eq!(err.to_string(), "The given data was invalid.");

    let body = r#"{"message": "Shot type is invalid."}"#;
    let err = handle_response(422, body, &store, &redirect).unwrap_err();
    assert_eq!(err.to_string(), "Shot type is invalid.");

    let err = handle_response(422, "", &store, &redirect).unwrap_err();
    assert_eq!(err.to_string(), "Request failed with status code 422");
}

#[test]
fn it_passes_server_messages_through() {
    let store = MemoryCredentialStore::with_token("abc");
    let redirect = TerminalRedirect::default();

    let err = handle_response(500, r#"{"message": "Generation service unavailable"}"#, &store, &redirect)
        .unwrap_err();
    assert_eq!(err.to_string(), "Generation service unavailable");
    assert_eq!(err.status(), Some(500));

    let err = handle_response(404, "Not Found", &store, &redirect).unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"Request failed with status code 404");

    assert_eq!(store.get(), Some("abc".to_string()));
    assert_eq!(redirect.redirect_count(), 0);
}
