//! External service integrations.

pub mod refund;
