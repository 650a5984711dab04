//! Sweet Slot Admin - the booking board.
//!
//! [`board::BookingBoard`] holds the live booking list for an admin
//! session: it consumes full-replacement snapshots from the document
//! store, projects them through role scoping and filters, and applies
//! guarded status transitions. Moving a booking to `Returned` runs the
//! compound refund flow against the payment gateway before the status
//! write.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod board;
pub mod config;
pub mod models;
pub mod services;

pub use board::{
    BoardFilters, BookingBoard, MessageKind, ShopFilter, StatusChange, StatusFilter,
    StatusMessage, TransitionError,
};
pub use config::{AdminConfig, ConfigError};
pub use models::booking::{BOOKINGS, Booking};
pub use services::refund::{HttpRefundGateway, RefundError, RefundGateway, RefundOutcome};
