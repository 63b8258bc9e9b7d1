//! Unit tests for the SessionGate public API, using in-memory storage.

use std::sync::Arc;

use linksaver::managers::session_gate::{SessionGate, SessionGateTrait, DEMO_EMAIL, DEMO_PASSWORD};
use linksaver::storage::{LocalStorage, MemoryStorage, AUTH_TOKEN_KEY};
use linksaver::types::errors::SessionError;
use rstest::rstest;

fn setup() -> (Arc<MemoryStorage>, SessionGate) {
    let storage = Arc::new(MemoryStorage::new());
    let gate = SessionGate::new(storage.clone());
    (storage, gate)
}

#[test]
fn test_starts_signed_out() {
    let (_, gate) = setup();
    assert!(!gate.is_authenticated());
}

#[test]
fn test_login_with_demo_credentials() {
    let (storage, gate) = setup();
    assert!(gate.login("demo@test.com", "password123").unwrap());
    assert!(gate.is_authenticated());

    let token = storage.get_item(AUTH_TOKEN_KEY).unwrap();
    assert!(token.is_some_and(|t| !t.is_empty()));
}

#[rstest]
#[case("demo@test.com", "wrong")]
#[case("other@test.com", "password123")]
#[case("DEMO@TEST.COM", "password123")]
#[case("demo@test.com", "password123 ")]
#[case("", "")]
fn test_login_rejects_mismatch(#[case] email: &str, #[case] password: &str) {
    let (storage, gate) = setup();
    assert!(!gate.login(email, password).unwrap());
    assert!(!gate.is_authenticated());
    assert_eq!(storage.get_item(AUTH_TOKEN_KEY).unwrap(), None);
}

#[test]
fn test_failed_login_keeps_existing_session() {
    let (_, gate) = setup();
    gate.login(DEMO_EMAIL, DEMO_PASSWORD).unwrap();
    assert!(!gate.login(DEMO_EMAIL, "wrong").unwrap());
    assert!(gate.is_authenticated());
}

#[test]
fn test_logout_clears_session_and_is_idempotent() {
    let (_, gate) = setup();
    gate.login(DEMO_EMAIL, DEMO_PASSWORD).unwrap();
    gate.logout().unwrap();
    assert!(!gate.is_authenticated());
    gate.logout().unwrap();
    assert!(!gate.is_authenticated());
}

#[test]
fn test_any_token_counts_as_signed_in() {
    let (storage, gate) = setup();
    storage.set_item(AUTH_TOKEN_KEY, "anything").unwrap();
    assert!(gate.is_authenticated());
}

#[test]
fn test_session_shared_through_storage() {
    let (storage, gate) = setup();
    gate.login(DEMO_EMAIL, DEMO_PASSWORD).unwrap();
    let other = SessionGate::new(storage);
    assert!(other.is_authenticated());
}

#[test]
fn test_sign_in_blank_fields() {
    let (_, gate) = setup();
    let err = gate.sign_in("", "password123").unwrap_err();
    assert!(matches!(err, SessionError::MissingCredentials));
    let err = gate.sign_in("demo@test.com", "").unwrap_err();
    assert!(matches!(err, SessionError::MissingCredentials));
}

#[test]
fn test_sign_in_names_demo_credentials_on_failure() {
    let (_, gate) = setup();
    let err = gate.sign_in("demo@test.com", "nope").unwrap_err();
    assert_eq!(err.to_string(), "Invalid credentials. Try demo@test.com / password123");
    assert!(gate.sign_in(DEMO_EMAIL, DEMO_PASSWORD).is_ok());
    assert!(gate.is_authenticated());
}
