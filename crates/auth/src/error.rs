//! Auth flow errors and the single place they turn into user-facing copy.

use sweetslot_store::StoreError;
use thiserror::Error;

use crate::callable::CallableError;
use crate::provider::{ProviderError, ProviderErrorKind};

/// Errors produced by the sign-in flows and the session resolver.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("phone number already registered")]
    PhoneAlreadyRegistered,

    #[error("no account found for this phone number")]
    NoAccountForPhone,

    #[error("no OTP request is outstanding")]
    NoOtpRequest,

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("callable function error: {0}")]
    Callable(#[from] CallableError),
}

impl AuthError {
    /// The message to show the user for this failure.
    ///
    /// Provider error codes map to specific phrasings; everything else
    /// falls back to a generic line so raw backend errors never leak into
    /// the UI.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Provider(err) => match err.kind {
                ProviderErrorKind::InvalidVerificationCode => "Invalid OTP, please try again.",
                ProviderErrorKind::InvalidVerificationId => {
                    "Verification expired. Please request a new OTP."
                }
                ProviderErrorKind::CodeExpired => "OTP expired. Please request a new one.",
                ProviderErrorKind::TooManyRequests => {
                    "Too many attempts. Please try again later."
                }
                ProviderErrorKind::OperationNotAllowed => "Phone sign-in not enabled.",
                ProviderErrorKind::UserDisabled => "This account has been disabled.",
                ProviderErrorKind::PermissionDenied => {
                    "You do not have permission to perform this action."
                }
                ProviderErrorKind::Network | ProviderErrorKind::Other => {
                    "Authentication failed. Please try again."
                }
            },
            Self::PhoneAlreadyRegistered => {
                "This phone number is already registered. Please sign in instead."
            }
            Self::NoAccountForPhone => {
                "No account found for this phone number. Please sign up first."
            }
            Self::NoOtpRequest => "No OTP request found. Please request a new code.",
            Self::Store(_) | Self::Callable(_) => "Authentication failed. Please try again.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_codes_map_to_specific_copy() {
        let err = AuthError::from(ProviderError::new(
            ProviderErrorKind::InvalidVerificationCode,
            "auth/invalid-verification-code",
        ));
        assert_eq!(err.user_message(), "Invalid OTP, please try again.");

        let err = AuthError::from(ProviderError::new(
            ProviderErrorKind::OperationNotAllowed,
            "auth/operation-not-allowed",
        ));
        assert_eq!(err.user_message(), "Phone sign-in not enabled.");
    }

    #[test]
    fn test_backend_errors_stay_generic() {
        let err = AuthError::Store(StoreError::Backend("socket reset".into()));
        assert_eq!(err.user_message(), "Authentication failed. Please try again.");
    }
}
