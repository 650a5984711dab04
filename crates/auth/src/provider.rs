//! Identity-provider seam.
//!
//! The hosted identity provider (sign-in, OTP delivery, session events) is
//! an external service. Everything the rest of the workspace needs from it
//! goes through [`IdentityProvider`] so flows and tests can swap in a mock.

use sweetslot_core::{Email, Phone, Uid};
use thiserror::Error;
use tokio::sync::mpsc;

/// An authenticated identity as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub uid: Uid,
    pub email: Option<Email>,
    pub phone: Option<Phone>,
    pub display_name: Option<String>,
}

impl Principal {
    /// Whether the provider reported at least one contact channel.
    ///
    /// Sessions without an email or phone are treated as signed out; they
    /// cannot be matched to a customer or admin record.
    #[must_use]
    pub const fn has_contact(&self) -> bool {
        self.email.is_some() || self.phone.is_some()
    }
}

/// Opaque handle for an OTP confirmation that is still outstanding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpChallenge {
    verification_id: String,
}

impl OtpChallenge {
    #[must_use]
    pub fn new(verification_id: impl Into<String>) -> Self {
        Self {
            verification_id: verification_id.into(),
        }
    }

    #[must_use]
    pub fn verification_id(&self) -> &str {
        &self.verification_id
    }
}

/// Stream of session changes pushed by the provider.
///
/// `Some(principal)` means a session started or its profile changed;
/// `None` means the session ended.
#[derive(Debug)]
pub struct SessionStream {
    rx: mpsc::UnboundedReceiver<Option<Principal>>,
}

impl SessionStream {
    #[must_use]
    pub fn from_channel(rx: mpsc::UnboundedReceiver<Option<Principal>>) -> Self {
        Self { rx }
    }

    /// Wait for the next session change. `None` means the provider hung up.
    pub async fn recv(&mut self) -> Option<Option<Principal>> {
        self.rx.recv().await
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Stable classification of provider failures.
///
/// Providers report errors as string codes; implementations map the codes
/// they know onto these variants and put everything else under `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    InvalidVerificationCode,
    InvalidVerificationId,
    CodeExpired,
    TooManyRequests,
    OperationNotAllowed,
    UserDisabled,
    PermissionDenied,
    Network,
    Other,
}

/// An error surfaced by the identity provider.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("provider error ({kind:?}): {message}")]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub message: String,
}

impl ProviderError {
    #[must_use]
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

// =============================================================================
// Trait
// =============================================================================

/// Operations the workspace needs from the identity provider.
#[allow(async_fn_in_trait)]
pub trait IdentityProvider {
    /// Subscribe to session changes. The initial state is delivered as the
    /// first event.
    fn subscribe_sessions(&self) -> SessionStream;

    async fn sign_in_with_email(
        &self,
        email: &Email,
        password: &str,
    ) -> Result<Principal, ProviderError>;

    /// Start a phone sign-in by sending an OTP to the given number.
    async fn request_otp(&self, phone: &Phone) -> Result<OtpChallenge, ProviderError>;

    /// Complete a phone sign-in with the code the user received.
    async fn confirm_otp(
        &self,
        challenge: &OtpChallenge,
        code: &str,
    ) -> Result<Principal, ProviderError>;

    async fn sign_in_with_google(&self) -> Result<Principal, ProviderError>;

    async fn sign_out(&self) -> Result<(), ProviderError>;

    /// Set the display name on the provider-side profile.
    async fn update_display_name(&self, uid: &Uid, name: &str) -> Result<(), ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_principal_contact_detection() {
        let bare = Principal {
            uid: Uid::new("u1"),
            email: None,
            phone: None,
            display_name: None,
        };
        assert!(!bare.has_contact());

        let with_phone = Principal {
            phone: Some(Phone::normalize("9876543210")),
            ..bare.clone()
        };
        assert!(with_phone.has_contact());
    }
}
