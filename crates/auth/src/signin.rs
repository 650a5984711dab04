//! Sign-in flows: phone OTP with signup/signin guards, email, Google.

use chrono::Local;
use serde_json::json;
use sweetslot_core::Phone;
use sweetslot_store::{DocumentPatch, DocumentStore, QueryOp};
use tracing::{info, warn};

use crate::callable::CallableBackend;
use crate::collections::USERS;
use crate::error::AuthError;
use crate::provider::{IdentityProvider, OtpChallenge, Principal};

/// Signup details held between OTP request and confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSignup {
    pub phone: Phone,
    pub name: String,
}

/// Phone, email, and Google sign-in flows.
///
/// The existence check before a phone OTP goes through the callable
/// backend when one is configured, otherwise it falls back to an equality
/// query on the `users` collection.
pub struct PhoneAuth<P, S, C> {
    provider: P,
    store: S,
    callable: Option<C>,
    challenge: Option<OtpChallenge>,
    pending_signup: Option<PendingSignup>,
}

impl<P: IdentityProvider, S: DocumentStore, C: CallableBackend> PhoneAuth<P, S, C> {
    pub fn new(provider: P, store: S, callable: Option<C>) -> Self {
        Self {
            provider,
            store,
            callable,
            challenge: None,
            pending_signup: None,
        }
    }

    /// Whether a registered account exists for the phone number.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Callable`] or [`AuthError::Store`] when the
    /// backing lookup fails.
    pub async fn check_user_exists(&self, phone: &Phone) -> Result<bool, AuthError> {
        if let Some(callable) = &self.callable {
            return Ok(callable.check_user_exists(phone).await?);
        }
        let hits = self
            .store
            .query_documents(USERS, "phone", QueryOp::Eq, &json!(phone.as_str()))
            .await?;
        Ok(!hits.is_empty())
    }

    /// Start a signup: reject already-registered numbers, then send an OTP.
    ///
    /// A blank name defaults to `Guest-` plus the last four digits so the
    /// profile written on confirmation is never nameless.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::PhoneAlreadyRegistered`] when an account
    /// already exists, or the underlying lookup/provider error.
    pub async fn sign_up_with_phone(
        &mut self,
        raw_phone: &str,
        name: &str,
    ) -> Result<(), AuthError> {
        let phone = Phone::normalize(raw_phone);
        if self.check_user_exists(&phone).await? {
            return Err(AuthError::PhoneAlreadyRegistered);
        }
        let challenge = self.provider.request_otp(&phone).await?;
        let name = name.trim();
        let name = if name.is_empty() {
            format!("Guest-{}", phone.last_digits(4))
        } else {
            name.to_owned()
        };
        info!(phone = %phone, "signup OTP sent");
        self.challenge = Some(challenge);
        self.pending_signup = Some(PendingSignup { phone, name });
        Ok(())
    }

    /// Start a sign-in: require a registered account, then send an OTP.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NoAccountForPhone`] when no account exists, or
    /// the underlying lookup/provider error.
    pub async fn sign_in_with_phone(&mut self, raw_phone: &str) -> Result<(), AuthError> {
        let phone = Phone::normalize(raw_phone);
        if !self.check_user_exists(&phone).await? {
            return Err(AuthError::NoAccountForPhone);
        }
        let challenge = self.provider.request_otp(&phone).await?;
        info!(phone = %phone, "sign-in OTP sent");
        self.challenge = Some(challenge);
        self.pending_signup = None;
        Ok(())
    }

    /// Whether an OTP confirmation is outstanding.
    #[must_use]
    pub const fn has_pending_otp(&self) -> bool {
        self.challenge.is_some()
    }

    /// Confirm the outstanding OTP and finalize the profile.
    ///
    /// On success the display name is pushed to the provider (best effort)
    /// and the `users` record is merge-written with name, email, phone,
    /// join date, and a server `updatedAt`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NoOtpRequest`] when no OTP was requested, the
    /// provider error for a bad code, or [`AuthError::Store`] when the
    /// profile write fails.
    pub async fn verify_otp(&mut self, code: &str) -> Result<Principal, AuthError> {
        let challenge = self.challenge.as_ref().ok_or(AuthError::NoOtpRequest)?;
        let mut principal = self.provider.confirm_otp(challenge, code).await?;

        let name = principal
            .display_name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| self.pending_signup.as_ref().map(|p| p.name.clone()))
            .unwrap_or_else(|| {
                let last4 = principal
                    .phone
                    .as_ref()
                    .map(|p| p.last_digits(4))
                    .unwrap_or_default();
                format!("Guest-{last4}")
            });

        if principal.display_name.as_deref() != Some(&name) {
            if let Err(err) = self.provider.update_display_name(&principal.uid, &name).await {
                warn!(uid = %principal.uid, error = %err, "display name update failed");
            }
            principal.display_name = Some(name.clone());
        }

        let patch = DocumentPatch::new()
            .field("name", json!(name))
            .field(
                "email",
                json!(principal.email.as_ref().map(sweetslot_core::Email::as_str).unwrap_or_default()),
            )
            .field(
                "phone",
                json!(principal.phone.as_ref().map(Phone::as_str).unwrap_or_default()),
            )
            .field("joinDate", json!(join_date_today()))
            .server_timestamp("updatedAt");
        self.store
            .set_document(USERS, principal.uid.as_str(), patch, true)
            .await?;

        info!(uid = %principal.uid, "phone sign-in complete");
        self.challenge = None;
        self.pending_signup = None;
        Ok(principal)
    }

    /// Drop any outstanding OTP state without signing in.
    pub fn cancel_otp(&mut self) {
        self.challenge = None;
        self.pending_signup = None;
    }

    /// # Errors
    ///
    /// Returns the provider error when the credentials are rejected.
    pub async fn sign_in_with_email(
        &self,
        email: &sweetslot_core::Email,
        password: &str,
    ) -> Result<Principal, AuthError> {
        Ok(self.provider.sign_in_with_email(email, password).await?)
    }

    /// # Errors
    ///
    /// Returns the provider error when the Google flow fails.
    pub async fn sign_in_with_google(&self) -> Result<Principal, AuthError> {
        Ok(self.provider.sign_in_with_google().await?)
    }

    /// Sign out and clear any in-flight OTP state.
    ///
    /// # Errors
    ///
    /// Returns the provider error when sign-out fails; local state is
    /// cleared regardless.
    pub async fn sign_out(&mut self) -> Result<(), AuthError> {
        self.challenge = None;
        self.pending_signup = None;
        Ok(self.provider.sign_out().await?)
    }
}

/// Today's date in the `d/m/yyyy` form the customer records use.
fn join_date_today() -> String {
    let now = Local::now();
    format!(
        "{}/{}/{}",
        chrono::Datelike::day(&now),
        chrono::Datelike::month(&now),
        chrono::Datelike::year(&now)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_date_shape() {
        let date = join_date_today();
        let parts: Vec<&str> = date.split('/').collect();
        assert_eq!(parts.len(), 3);
        assert!(parts.iter().all(|p| p.chars().all(|c| c.is_ascii_digit())));
    }
}
