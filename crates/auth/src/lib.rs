//! Sweet Slot Auth - session resolution and sign-in flows.
//!
//! Two responsibilities live here:
//!
//! - [`SessionResolver`] turns identity-provider session changes into an
//!   application-level [`AdminProfile`] (role, active flag, permitted shop
//!   categories), with the superadmin category union and the fail-closed
//!   policy on lookup failures.
//! - [`PhoneAuth`] wraps the provider's phone-OTP, email/password, and
//!   Google sign-in calls behind typed results, including the
//!   `checkUserExists` callable with its store-query fallback.
//!
//! The identity provider itself is an external collaborator reached through
//! the [`IdentityProvider`] trait.

#![cfg_attr(not(test), forbid(unsafe_code))]

mod error;
mod profile;
mod provider;
mod resolver;
mod signin;

pub mod callable;

pub use callable::{CallableBackend, CallableError, HttpCallableBackend, NullCallable};
pub use error::AuthError;
pub use profile::AdminProfile;
pub use provider::{
    IdentityProvider, OtpChallenge, Principal, ProviderError, ProviderErrorKind, SessionStream,
};
pub use resolver::{SessionResolver, SessionState};
pub use signin::{PendingSignup, PhoneAuth};

/// Collection names owned by the auth flows.
pub mod collections {
    /// Admin authorization records, keyed by principal id.
    pub const ADMINS: &str = "admins";
    /// Customer profile records, keyed by principal id.
    pub const USERS: &str = "users";
}
