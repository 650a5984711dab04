//! Phone sign-up and sign-in flows end to end.

use serde_json::json;
use sweetslot_auth::{
    AuthError, NullCallable, PhoneAuth, ProviderError, ProviderErrorKind, collections,
};
use sweetslot_integration_tests::{MockProvider, phone_principal, seed};
use sweetslot_store::{DocumentStore, MemoryStore};

fn phone_auth(
    provider: MockProvider,
    store: MemoryStore,
) -> PhoneAuth<MockProvider, MemoryStore, NullCallable> {
    PhoneAuth::new(provider, store, None)
}

#[tokio::test]
async fn test_signup_rejects_registered_phone() {
    let store = MemoryStore::new();
    seed(
        &store,
        collections::USERS,
        "u1",
        json!({ "phone": "+919876543210" }),
    );
    let mut auth = phone_auth(MockProvider::new(), store);

    let err = auth
        .sign_up_with_phone("98765 43210", "Asha")
        .await
        .expect_err("already registered");
    assert!(matches!(err, AuthError::PhoneAlreadyRegistered));
    assert!(!auth.has_pending_otp());
}

#[tokio::test]
async fn test_sign_in_requires_registered_phone() {
    let store = MemoryStore::new();
    let mut auth = phone_auth(MockProvider::new(), store);

    let err = auth
        .sign_in_with_phone("9876543210")
        .await
        .expect_err("unknown phone");
    assert!(matches!(err, AuthError::NoAccountForPhone));
    assert_eq!(
        err.user_message(),
        "No account found for this phone number. Please sign up first."
    );
}

#[tokio::test]
async fn test_verify_without_request_fails() {
    let mut auth = phone_auth(MockProvider::new(), MemoryStore::new());
    let err = auth.verify_otp("123456").await.expect_err("no OTP request");
    assert!(matches!(err, AuthError::NoOtpRequest));
}

#[tokio::test]
async fn test_signup_flow_writes_profile_with_guest_name() {
    let store = MemoryStore::new();
    let provider = MockProvider::new();
    provider.script_principal(phone_principal("u-new", "9876543210"));
    let mut auth = phone_auth(provider.clone(), store.clone());

    // Blank name falls back to Guest plus the last four digits.
    auth.sign_up_with_phone("98765 43210", "   ")
        .await
        .expect("OTP sent");
    assert!(auth.has_pending_otp());

    let principal = auth.verify_otp("123456").await.expect("valid code");
    assert_eq!(principal.display_name.as_deref(), Some("Guest-3210"));
    assert!(!auth.has_pending_otp());

    let doc = store
        .get_document(collections::USERS, "u-new")
        .await
        .expect("store ok")
        .expect("profile written");
    assert_eq!(doc.field("name"), Some(&json!("Guest-3210")));
    assert_eq!(doc.field("phone"), Some(&json!("+919876543210")));
    assert!(doc.field("joinDate").is_some());
    assert!(doc.field("updatedAt").is_some());

    assert_eq!(
        provider.display_name_updates(),
        vec![("u-new".into(), "Guest-3210".to_owned())]
    );
}

#[tokio::test]
async fn test_signup_flow_uses_given_name() {
    let store = MemoryStore::new();
    let provider = MockProvider::new();
    provider.script_principal(phone_principal("u-new", "9876543210"));
    let mut auth = phone_auth(provider, store);

    auth.sign_up_with_phone("9876543210", "  Asha Patel ")
        .await
        .expect("OTP sent");
    let principal = auth.verify_otp("123456").await.expect("valid code");
    assert_eq!(principal.display_name.as_deref(), Some("Asha Patel"));
}

#[tokio::test]
async fn test_invalid_code_maps_to_user_message() {
    let store = MemoryStore::new();
    seed(
        &store,
        collections::USERS,
        "u1",
        json!({ "phone": "+919876543210" }),
    );
    let provider = MockProvider::new();
    provider.script_confirm_error(ProviderError::new(
        ProviderErrorKind::InvalidVerificationCode,
        "auth/invalid-verification-code",
    ));
    let mut auth = phone_auth(provider, store);

    auth.sign_in_with_phone("9876543210").await.expect("OTP sent");
    let err = auth.verify_otp("000000").await.expect_err("bad code");
    assert_eq!(err.user_message(), "Invalid OTP, please try again.");
    // The challenge survives a bad code; the user can retry.
    assert!(auth.has_pending_otp());
}

#[tokio::test]
async fn test_email_and_google_sign_in_return_principal() {
    let provider = MockProvider::new();
    provider.script_principal(phone_principal("u1", "9876543210"));
    let auth = phone_auth(provider, MemoryStore::new());

    let email = "asha@sweetslot.in".parse().expect("valid email");
    let principal = auth
        .sign_in_with_email(&email, "hunter2")
        .await
        .expect("signs in");
    assert_eq!(principal.uid.as_str(), "u1");

    let principal = auth.sign_in_with_google().await.expect("signs in");
    assert_eq!(principal.uid.as_str(), "u1");
}

#[tokio::test]
async fn test_sign_out_clears_otp_state() {
    let store = MemoryStore::new();
    seed(
        &store,
        collections::USERS,
        "u1",
        json!({ "phone": "+919876543210" }),
    );
    let mut auth = phone_auth(MockProvider::new(), store);

    auth.sign_in_with_phone("9876543210").await.expect("OTP sent");
    assert!(auth.has_pending_otp());
    auth.sign_out().await.expect("signs out");
    assert!(!auth.has_pending_otp());
}
