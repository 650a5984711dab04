//! Booking document model.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sweetslot_core::{BookingId, BookingStatus, RefundStatus, StoreTimestamp, Uid};
use sweetslot_store::{Document, StoreError};

/// The collection holding booking documents.
pub const BOOKINGS: &str = "bookings";

/// One line item inside a booking's service details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ServiceItem {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub price: Option<Decimal>,
}

/// A booking as stored in the `bookings` collection.
///
/// Documents accrete fields over time, so everything beyond the id is
/// optional or defaulted. Field names follow the store's camelCase
/// convention; the two legacy exceptions carry explicit renames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// Store-assigned document id, attached after deserialization.
    #[serde(skip)]
    pub id: BookingId,

    #[serde(default)]
    pub shop: Option<String>,
    #[serde(default)]
    pub barber: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,

    /// Service names, for quick display.
    #[serde(default)]
    pub service: Vec<String>,
    /// Per-service line items with duration and price.
    #[serde(default)]
    pub service_details: Vec<ServiceItem>,

    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub total: Option<Decimal>,

    /// Missing on documents written by the booking flow, meaning `Booked`.
    #[serde(default)]
    pub status: BookingStatus,
    #[serde(default)]
    pub refund_status: Option<RefundStatus>,
    #[serde(default)]
    pub refund_id: Option<String>,

    /// Gateway payment id on newer bookings.
    #[serde(default)]
    pub payment_id: Option<String>,
    /// Gateway payment id field used by older bookings.
    #[serde(default, rename = "razorpay_payment_id")]
    pub razorpay_payment_id: Option<String>,

    #[serde(default)]
    pub created_at: Option<StoreTimestamp>,
    #[serde(default)]
    pub updated_at: Option<StoreTimestamp>,

    #[serde(default)]
    pub location: Option<String>,
    /// Human-facing booking reference.
    #[serde(default, rename = "ref")]
    pub reference: Option<String>,
    #[serde(default)]
    pub uid: Option<Uid>,
}

impl Booking {
    /// Build a booking from a store document, attaching the document id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] when the document fields do not
    /// deserialize.
    pub fn from_document(doc: &Document) -> Result<Self, StoreError> {
        let mut booking: Self = doc.deserialize()?;
        booking.id = BookingId::new(&doc.id);
        Ok(booking)
    }

    /// The gateway payment id to refund against, preferring the current
    /// field over the legacy one.
    #[must_use]
    pub fn payment_reference(&self) -> Option<&str> {
        self.payment_id
            .as_deref()
            .or(self.razorpay_payment_id.as_deref())
    }

    /// Creation time in epoch seconds; missing timestamps sort as 0 so
    /// legacy bookings sink to the bottom of a newest-first ordering.
    #[must_use]
    pub fn created_seconds(&self) -> i64 {
        self.created_at.map_or(0, |t| t.seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, Value, json};

    fn doc(id: &str, fields: Value) -> Document {
        let Value::Object(map) = fields else {
            panic!("fields must be an object");
        };
        Document::new(id, map)
    }

    #[test]
    fn test_from_document_full() {
        let booking = Booking::from_document(&doc(
            "b1",
            json!({
                "shop": "Bandra",
                "customerName": "Asha",
                "customerPhone": "+919876543210",
                "service": ["Chocolate Cake"],
                "serviceDetails": [{ "name": "Chocolate Cake", "price": 450 }],
                "total": 450,
                "status": "Cancelled",
                "paymentId": "pay_123",
                "createdAt": { "seconds": 1700000000, "nanos": 0 },
                "ref": "SW-1001",
            }),
        ))
        .expect("deserializes");

        assert_eq!(booking.id, BookingId::new("b1"));
        assert_eq!(booking.shop.as_deref(), Some("Bandra"));
        assert_eq!(booking.status, BookingStatus::Cancelled);
        assert_eq!(booking.payment_reference(), Some("pay_123"));
        assert_eq!(booking.created_seconds(), 1_700_000_000);
        assert_eq!(booking.reference.as_deref(), Some("SW-1001"));
    }

    #[test]
    fn test_sparse_document_defaults() {
        let booking = Booking::from_document(&doc("b2", json!({}))).expect("deserializes");
        assert_eq!(booking.status, BookingStatus::Booked);
        assert_eq!(booking.created_seconds(), 0);
        assert!(booking.payment_reference().is_none());
        assert!(booking.service.is_empty());
    }

    #[test]
    fn test_legacy_payment_field() {
        let booking = Booking::from_document(&doc(
            "b3",
            json!({ "razorpay_payment_id": "pay_old" }),
        ))
        .expect("deserializes");
        assert_eq!(booking.payment_reference(), Some("pay_old"));
    }

    #[test]
    fn test_current_payment_field_wins() {
        let booking = Booking::from_document(&doc(
            "b4",
            json!({ "paymentId": "pay_new", "razorpay_payment_id": "pay_old" }),
        ))
        .expect("deserializes");
        assert_eq!(booking.payment_reference(), Some("pay_new"));
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let mut fields = Map::new();
        fields.insert("legacyNotes".to_owned(), json!("keep me out"));
        let booking = Booking::from_document(&Document::new("b5", fields));
        assert!(booking.is_ok());
    }
}
