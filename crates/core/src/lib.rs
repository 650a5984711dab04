//! Sweet Slot Core - Shared types library.
//!
//! This crate provides common types used across all Sweet Slot components:
//! - `store` - Document-store collaborator seam
//! - `auth` - Session resolution and sign-in flows
//! - `admin` - Booking board (live list, filtering, status transitions)
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no channel
//! plumbing. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, phone numbers, emails, shop
//!   categories, statuses, and store timestamps

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
