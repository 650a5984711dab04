//! Callable cloud-function backend for the registration existence check.
//!
//! The hosted backend exposes `checkUserExists` as a callable function:
//! requests wrap the payload in `{"data": ...}` and responses come back as
//! `{"result": {"exists": bool}}`.

use std::time::Duration;

use serde_json::{Value, json};
use sweetslot_core::Phone;
use thiserror::Error;
use url::Url;

/// Errors from the callable backend.
#[derive(Debug, Error)]
pub enum CallableError {
    #[error("callable request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("callable returned an unexpected payload")]
    InvalidResponse,
}

/// Backend for callable function invocations.
#[allow(async_fn_in_trait)]
pub trait CallableBackend {
    /// Whether a registered account exists for the phone number.
    async fn check_user_exists(&self, phone: &Phone) -> Result<bool, CallableError>;
}

/// Placeholder backend for deployments without callable functions.
///
/// Never invoked: flows hold the backend as an `Option` and fall back to a
/// store query when it is absent. This type only pins the generic.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCallable;

impl CallableBackend for NullCallable {
    async fn check_user_exists(&self, _phone: &Phone) -> Result<bool, CallableError> {
        Ok(false)
    }
}

/// HTTP client for the callable functions endpoint.
#[derive(Debug, Clone)]
pub struct HttpCallableBackend {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpCallableBackend {
    /// Build a client against the functions base URL.
    ///
    /// # Errors
    ///
    /// Returns [`CallableError::Http`] when the HTTP client cannot be
    /// constructed.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, CallableError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, function: &str) -> String {
        format!("{}/{function}", self.base_url.as_str().trim_end_matches('/'))
    }
}

impl CallableBackend for HttpCallableBackend {
    async fn check_user_exists(&self, phone: &Phone) -> Result<bool, CallableError> {
        let response = self
            .client
            .post(self.endpoint("checkUserExists"))
            .json(&json!({ "data": { "phone": phone.as_str() } }))
            .send()
            .await?;
        let body: Value = response.json().await?;
        body.get("result")
            .and_then(|r| r.get("exists"))
            .and_then(Value::as_bool)
            .ok_or(CallableError::InvalidResponse)
    }
}
