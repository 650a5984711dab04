//! Data models for the admin components.

pub mod booking;
