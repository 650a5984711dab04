//! Core type definitions.

mod category;
mod email;
mod id;
mod phone;
mod status;
mod timestamp;

pub use category::ShopCategory;
pub use email::{Email, EmailError};
pub use id::{BookingId, Uid};
pub use phone::Phone;
pub use status::{AdminRole, BookingStatus, RefundStatus};
pub use timestamp::StoreTimestamp;
