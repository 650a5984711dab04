//! Status and role enums.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Booking lifecycle status.
///
/// Documents created by the booking flow carry no explicit status, which
/// means `Booked`. Admins can move a booking to `Cancelled` or `Returned`;
/// `Returned` is terminal for the status control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BookingStatus {
    #[default]
    Booked,
    Cancelled,
    Returned,
}

impl BookingStatus {
    /// Whether the status control is locked for bookings in this state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Returned)
    }

    /// Wire/display representation (`"Booked"`, `"Cancelled"`, `"Returned"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Booked => "Booked",
            Self::Cancelled => "Cancelled",
            Self::Returned => "Returned",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Refund annotation on a booking.
///
/// Secondary to [`BookingStatus`]: a booking can legitimately be `Returned`
/// with a `queued` refund awaiting asynchronous gateway completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefundStatus {
    Processed,
    Queued,
    Failed,
}

impl RefundStatus {
    /// Parse a gateway-reported refund status, case-insensitively.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "processed" => Some(Self::Processed),
            "queued" => Some(Self::Queued),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Wire representation (lowercase).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Processed => "processed",
            Self::Queued => "queued",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for RefundStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Admin role with different visibility levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AdminRole {
    /// Scoped to the shop categories on the admin's own record.
    #[default]
    Admin,
    /// Visibility and edit rights across all shop categories.
    SuperAdmin,
}

impl AdminRole {
    /// Parse a stored role string.
    ///
    /// Role values are free-form in older admin records; anything that is
    /// not `"superadmin"` resolves to the scoped [`AdminRole::Admin`].
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("superadmin") {
            Self::SuperAdmin
        } else {
            Self::Admin
        }
    }
}

impl fmt::Display for AdminRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::SuperAdmin => write!(f, "superadmin"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_status_wire_names() {
        let json = serde_json::to_string(&BookingStatus::Returned).expect("serialize");
        assert_eq!(json, "\"Returned\"");
        let parsed: BookingStatus = serde_json::from_str("\"Cancelled\"").expect("deserialize");
        assert_eq!(parsed, BookingStatus::Cancelled);
    }

    #[test]
    fn test_booking_status_default_and_terminal() {
        assert_eq!(BookingStatus::default(), BookingStatus::Booked);
        assert!(BookingStatus::Returned.is_terminal());
        assert!(!BookingStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_refund_status_lowercase() {
        let json = serde_json::to_string(&RefundStatus::Queued).expect("serialize");
        assert_eq!(json, "\"queued\"");
        assert_eq!(RefundStatus::parse("Processed"), Some(RefundStatus::Processed));
        assert_eq!(RefundStatus::parse("bogus"), None);
    }

    #[test]
    fn test_role_parse_defaults_to_admin() {
        assert_eq!(AdminRole::parse("superadmin"), AdminRole::SuperAdmin);
        assert_eq!(AdminRole::parse(" SuperAdmin "), AdminRole::SuperAdmin);
        assert_eq!(AdminRole::parse("manager"), AdminRole::Admin);
        assert_eq!(AdminRole::parse(""), AdminRole::Admin);
    }
}
