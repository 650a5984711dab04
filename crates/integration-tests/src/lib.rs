//! Test doubles and seeding helpers shared by the integration tests.
//!
//! [`MockProvider`] scripts identity-provider behavior (sessions, OTP
//! confirmation, display-name updates) and [`MockGateway`] scripts refund
//! verdicts while recording every call. Both are cheap clones over shared
//! state so a test can keep a handle after moving the double into the
//! component under test.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use rust_decimal::Decimal;
use serde_json::Value;
use sweetslot_admin::{RefundError, RefundGateway, RefundOutcome};
use sweetslot_auth::{
    IdentityProvider, OtpChallenge, Principal, ProviderError, ProviderErrorKind, SessionStream,
};
use sweetslot_core::{Email, Phone, RefundStatus, Uid};
use sweetslot_store::{
    Document, DocumentPatch, DocumentStore, MemoryStore, QueryOp, StoreError, Subscription,
};
use tokio::sync::mpsc;

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Install a tracing subscriber for test output.
///
/// Honors `RUST_LOG`; safe to call from every test, later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
}

// =============================================================================
// Identity provider double
// =============================================================================

#[derive(Default)]
struct ProviderInner {
    sessions: Mutex<Vec<mpsc::UnboundedSender<Option<Principal>>>>,
    next_principal: Mutex<Option<Principal>>,
    confirm_error: Mutex<Option<ProviderError>>,
    display_name_updates: Mutex<Vec<(Uid, String)>>,
    fail_display_name_update: AtomicBool,
}

/// Scripted [`IdentityProvider`].
#[derive(Clone, Default)]
pub struct MockProvider {
    inner: Arc<ProviderInner>,
}

impl MockProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The principal the next sign-in or OTP confirmation resolves to.
    pub fn script_principal(&self, principal: Principal) {
        *lock(&self.inner.next_principal) = Some(principal);
    }

    /// Fail the next OTP confirmation with the given error.
    pub fn script_confirm_error(&self, error: ProviderError) {
        *lock(&self.inner.confirm_error) = Some(error);
    }

    /// Make display-name updates fail from now on.
    pub fn fail_display_name_updates(&self) {
        self.inner
            .fail_display_name_update
            .store(true, Ordering::SeqCst);
    }

    /// Push a session change to every subscriber.
    pub fn push_session(&self, principal: Option<Principal>) {
        lock(&self.inner.sessions).retain(|tx| tx.send(principal.clone()).is_ok());
    }

    /// Display-name updates recorded so far.
    #[must_use]
    pub fn display_name_updates(&self) -> Vec<(Uid, String)> {
        lock(&self.inner.display_name_updates).clone()
    }

    fn scripted_principal(&self) -> Result<Principal, ProviderError> {
        lock(&self.inner.next_principal).clone().ok_or_else(|| {
            ProviderError::new(ProviderErrorKind::Other, "no scripted principal")
        })
    }
}

impl IdentityProvider for MockProvider {
    fn subscribe_sessions(&self) -> SessionStream {
        let (tx, rx) = mpsc::unbounded_channel();
        lock(&self.inner.sessions).push(tx);
        SessionStream::from_channel(rx)
    }

    async fn sign_in_with_email(
        &self,
        _email: &Email,
        _password: &str,
    ) -> Result<Principal, ProviderError> {
        self.scripted_principal()
    }

    async fn request_otp(&self, phone: &Phone) -> Result<OtpChallenge, ProviderError> {
        Ok(OtpChallenge::new(format!("verify:{phone}")))
    }

    async fn confirm_otp(
        &self,
        _challenge: &OtpChallenge,
        _code: &str,
    ) -> Result<Principal, ProviderError> {
        if let Some(error) = lock(&self.inner.confirm_error).take() {
            return Err(error);
        }
        self.scripted_principal()
    }

    async fn sign_in_with_google(&self) -> Result<Principal, ProviderError> {
        self.scripted_principal()
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    async fn update_display_name(&self, uid: &Uid, name: &str) -> Result<(), ProviderError> {
        if self.inner.fail_display_name_update.load(Ordering::SeqCst) {
            return Err(ProviderError::new(
                ProviderErrorKind::Other,
                "profile service unavailable",
            ));
        }
        lock(&self.inner.display_name_updates).push((uid.clone(), name.to_owned()));
        Ok(())
    }
}

// =============================================================================
// Refund gateway double
// =============================================================================

#[derive(Default)]
struct GatewayInner {
    verdicts: Mutex<VecDeque<Result<RefundOutcome, RefundError>>>,
    calls: Mutex<Vec<(String, Decimal)>>,
}

/// Scripted [`RefundGateway`] that records every call.
///
/// Unscripted calls resolve to a processed refund with no refund id.
#[derive(Clone, Default)]
pub struct MockGateway {
    inner: Arc<GatewayInner>,
}

impl MockGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the verdict for the next refund call.
    pub fn script(&self, verdict: Result<RefundOutcome, RefundError>) {
        lock(&self.inner.verdicts).push_back(verdict);
    }

    /// The `(payment_id, amount)` pairs refunded so far.
    #[must_use]
    pub fn calls(&self) -> Vec<(String, Decimal)> {
        lock(&self.inner.calls).clone()
    }
}

impl RefundGateway for MockGateway {
    async fn refund_payment(
        &self,
        payment_id: &str,
        amount: Decimal,
    ) -> Result<RefundOutcome, RefundError> {
        lock(&self.inner.calls).push((payment_id.to_owned(), amount));
        lock(&self.inner.verdicts).pop_front().unwrap_or(Ok(
            RefundOutcome::Processed {
                status: RefundStatus::Processed,
                refund_id: None,
            },
        ))
    }
}

/// A transport-level refund failure, built without touching the network.
#[must_use]
pub fn transport_error() -> RefundError {
    let err = reqwest::Client::new()
        .get("http://[::invalid")
        .build()
        .expect_err("invalid url must not build");
    RefundError::Http(err)
}

// =============================================================================
// Store wrappers and seeding
// =============================================================================

/// Store wrapper that fails reads on selected collections.
#[derive(Clone)]
pub struct FailingStore {
    inner: MemoryStore,
    failing: Arc<Mutex<Vec<String>>>,
}

impl FailingStore {
    #[must_use]
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            failing: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Make every read on `collection` fail from now on.
    pub fn fail_reads(&self, collection: &str) {
        lock(&self.failing).push(collection.to_owned());
    }

    fn check(&self, collection: &str) -> Result<(), StoreError> {
        if lock(&self.failing).iter().any(|c| c == collection) {
            return Err(StoreError::Backend(format!(
                "injected read failure on {collection}"
            )));
        }
        Ok(())
    }
}

impl DocumentStore for FailingStore {
    async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, StoreError> {
        self.check(collection)?;
        self.inner.get_document(collection, id).await
    }

    async fn list_documents(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        self.check(collection)?;
        self.inner.list_documents(collection).await
    }

    async fn query_documents(
        &self,
        collection: &str,
        field: &str,
        op: QueryOp,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError> {
        self.check(collection)?;
        self.inner.query_documents(collection, field, op, value).await
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        patch: DocumentPatch,
    ) -> Result<(), StoreError> {
        self.inner.update_document(collection, id, patch).await
    }

    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        patch: DocumentPatch,
        merge: bool,
    ) -> Result<(), StoreError> {
        self.inner.set_document(collection, id, patch, merge).await
    }

    fn subscribe(&self, collection: &str) -> Subscription {
        self.inner.subscribe(collection)
    }
}

/// Seed a document from a JSON object literal.
///
/// # Panics
///
/// Panics when `fields` is not a JSON object.
pub fn seed(store: &MemoryStore, collection: &str, id: &str, fields: Value) {
    let Value::Object(map) = fields else {
        panic!("seed fields must be a JSON object");
    };
    store.insert(collection, id, map);
}

/// A principal with the given uid and a normalized phone.
#[must_use]
pub fn phone_principal(uid: &str, phone: &str) -> Principal {
    Principal {
        uid: Uid::new(uid),
        email: None,
        phone: Some(Phone::normalize(phone)),
        display_name: None,
    }
}

/// A principal with the given uid and email.
///
/// # Panics
///
/// Panics when `email` is not a valid address.
#[must_use]
pub fn email_principal(uid: &str, email: &str) -> Principal {
    Principal {
        uid: Uid::new(uid),
        email: Some(email.parse().expect("valid email")),
        phone: None,
        display_name: None,
    }
}
