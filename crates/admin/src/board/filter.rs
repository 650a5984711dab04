//! Pure projection of the booking list through scoping and filters.
//!
//! Filtering never mutates the underlying list, so changing a filter is
//! always a re-projection of the latest snapshot and filters compose in
//! any order.

use sweetslot_auth::AdminProfile;
use sweetslot_core::BookingStatus;

use crate::models::booking::Booking;

/// Status filter for the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(BookingStatus),
}

/// Shop filter for the board. Only meaningful for superadmins; scoped
/// admins are already pinned to their primary category.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ShopFilter {
    #[default]
    All,
    Shop(String),
}

/// The board's current filter set.
#[derive(Debug, Clone, Default)]
pub struct BoardFilters {
    /// Case-insensitive substring match over customer name, phone, email.
    pub text: String,
    pub status: StatusFilter,
    pub shop: ShopFilter,
}

/// Project the bookings an admin sees with the given filters applied.
///
/// Visibility comes first: superadmins see every booking, scoped admins
/// only those whose shop matches their primary category. An admin with no
/// categories sees nothing.
#[must_use]
pub fn project<'a>(
    bookings: &'a [Booking],
    admin: &AdminProfile,
    filters: &BoardFilters,
) -> Vec<&'a Booking> {
    bookings
        .iter()
        .filter(|b| visible_to(b, admin))
        .filter(|b| matches_text(b, &filters.text))
        .filter(|b| matches_status(b, filters.status))
        .filter(|b| matches_shop(b, admin, &filters.shop))
        .collect()
}

fn visible_to(booking: &Booking, admin: &AdminProfile) -> bool {
    if admin.is_super_admin() {
        return true;
    }
    let shop = booking.shop.as_deref().unwrap_or_default();
    admin.primary_category().is_some_and(|c| c.matches(shop))
}

fn matches_text(booking: &Booking, text: &str) -> bool {
    let needle = text.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    [
        booking.customer_name.as_deref(),
        booking.customer_phone.as_deref(),
        booking.customer_email.as_deref(),
    ]
    .iter()
    .flatten()
    .any(|haystack| haystack.to_lowercase().contains(&needle))
}

fn matches_status(booking: &Booking, filter: StatusFilter) -> bool {
    match filter {
        StatusFilter::All => true,
        StatusFilter::Only(status) => booking.status == status,
    }
}

fn matches_shop(booking: &Booking, admin: &AdminProfile, filter: &ShopFilter) -> bool {
    if !admin.is_super_admin() {
        return true;
    }
    match filter {
        ShopFilter::All => true,
        ShopFilter::Shop(name) => {
            let shop = booking.shop.as_deref().unwrap_or_default();
            shop.trim().eq_ignore_ascii_case(name.trim())
        }
    }
}
