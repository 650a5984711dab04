//! The live booking board.
//!
//! The board consumes full-replacement snapshots from the store, keeps
//! them sorted newest-first, and applies guarded status transitions. A
//! transition to `Returned` is compound: the refund must be settled with
//! the payment gateway before the status write happens.

use std::time::Duration;

use serde_json::json;
use sweetslot_auth::AdminProfile;
use sweetslot_core::{BookingId, BookingStatus, RefundStatus};
use sweetslot_store::{DocumentPatch, DocumentStore, Subscription, SubscriptionEvent};
use thiserror::Error;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::models::booking::{BOOKINGS, Booking};
use crate::services::refund::{RefundError, RefundGateway, RefundOutcome};

mod filter;

pub use filter::{BoardFilters, ShopFilter, StatusFilter, project};

const SUCCESS_TTL: Duration = Duration::from_secs(3);
const FAILURE_TTL: Duration = Duration::from_secs(4);
const PENDING_TTL: Duration = Duration::from_secs(30);

/// Why a status transition did not go through.
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("booking not found")]
    BookingNotFound,

    #[error("returned bookings cannot change status")]
    TerminalStatus,

    #[error("no payment id recorded for this booking")]
    MissingPaymentId,

    #[error("refund rejected: {0}")]
    RefundRejected(String),

    #[error("refund endpoint returned an unexpected payload")]
    InvalidGatewayResponse,

    #[error("refund request failed: {0}")]
    Gateway(String),

    #[error(transparent)]
    Store(#[from] sweetslot_store::StoreError),
}

/// A completed status transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub id: BookingId,
    pub status: BookingStatus,
    pub refund_status: Option<RefundStatus>,
    pub refund_id: Option<String>,
}

/// Tone of a transient board message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Pending,
    Failure,
}

/// A transient message with its expiry.
#[derive(Debug, Clone)]
pub struct StatusMessage {
    text: String,
    kind: MessageKind,
    posted: Instant,
    ttl: Duration,
}

impl StatusMessage {
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub const fn kind(&self) -> MessageKind {
        self.kind
    }

    fn expired(&self) -> bool {
        self.posted.elapsed() > self.ttl
    }
}

#[derive(Debug, Clone)]
struct PendingChange {
    id: BookingId,
    status: BookingStatus,
}

/// Live board over the `bookings` collection.
///
/// `S` is the document store, `G` the refund gateway. The board owns its
/// subscription; callers drive it with [`pump`](Self::pump) or feed events
/// directly through [`apply_event`](Self::apply_event).
pub struct BookingBoard<S, G> {
    store: S,
    gateway: G,
    bookings: Vec<Booking>,
    subscription: Option<Subscription>,
    filters: BoardFilters,
    pending: Option<PendingChange>,
    message: Option<StatusMessage>,
    loading: bool,
}

impl<S: DocumentStore, G: RefundGateway> BookingBoard<S, G> {
    pub fn new(store: S, gateway: G) -> Self {
        Self {
            store,
            gateway,
            bookings: Vec::new(),
            subscription: None,
            filters: BoardFilters::default(),
            pending: None,
            message: None,
            loading: true,
        }
    }

    // =========================================================================
    // Subscription
    // =========================================================================

    /// Open (or reopen) the live subscription on the bookings collection.
    pub fn subscribe(&mut self) {
        self.subscription = Some(self.store.subscribe(BOOKINGS));
        self.loading = true;
    }

    /// Drop the live subscription, releasing the store-side listener.
    pub fn unsubscribe(&mut self) {
        self.subscription = None;
    }

    /// Wait for and apply the next subscription event.
    ///
    /// Returns `false` when there is no subscription or the store closed it.
    pub async fn pump(&mut self) -> bool {
        let Some(sub) = self.subscription.as_mut() else {
            return false;
        };
        match sub.recv().await {
            Some(event) => {
                self.apply_event(event);
                true
            }
            None => false,
        }
    }

    /// Apply one subscription event.
    ///
    /// Snapshots replace the whole list and are re-sorted newest-first.
    /// Listener errors keep the previous list (stale-but-available) and
    /// only clear the loading flag.
    pub fn apply_event(&mut self, event: SubscriptionEvent) {
        match event {
            SubscriptionEvent::Snapshot(snapshot) => {
                self.bookings = snapshot
                    .documents
                    .iter()
                    .filter_map(|doc| match Booking::from_document(doc) {
                        Ok(booking) => Some(booking),
                        Err(err) => {
                            warn!(id = %doc.id, error = %err, "skipping malformed booking");
                            None
                        }
                    })
                    .collect();
                self.bookings
                    .sort_by(|a, b| b.created_seconds().cmp(&a.created_seconds()));
                self.loading = false;
            }
            SubscriptionEvent::Error(err) => {
                warn!(error = %err, "bookings listener failed; keeping last snapshot");
                self.loading = false;
            }
        }
    }

    /// Whether the first snapshot is still outstanding.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Every booking in the last snapshot, newest first, unscoped.
    #[must_use]
    pub fn bookings(&self) -> &[Booking] {
        &self.bookings
    }

    // =========================================================================
    // Projection
    // =========================================================================

    /// The bookings the given admin currently sees.
    #[must_use]
    pub fn visible(&self, admin: &AdminProfile) -> Vec<&Booking> {
        filter::project(&self.bookings, admin, &self.filters)
    }

    /// Distinct shop names in the current snapshot, for the shop filter.
    #[must_use]
    pub fn shops(&self) -> Vec<String> {
        let mut shops: Vec<String> = self
            .bookings
            .iter()
            .filter_map(|b| b.shop.as_deref())
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect();
        shops.sort();
        shops.dedup();
        shops
    }

    #[must_use]
    pub const fn filters(&self) -> &BoardFilters {
        &self.filters
    }

    pub fn set_text_filter(&mut self, text: impl Into<String>) {
        self.filters.text = text.into();
    }

    pub fn set_status_filter(&mut self, status: StatusFilter) {
        self.filters.status = status;
    }

    pub fn set_shop_filter(&mut self, shop: ShopFilter) {
        self.filters.shop = shop;
    }

    // =========================================================================
    // Status transitions
    // =========================================================================

    /// Stage a status change pending explicit confirmation.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::BookingNotFound`] for an unknown id and
    /// [`TransitionError::TerminalStatus`] when the booking is already
    /// `Returned`.
    pub fn request_status_change(
        &mut self,
        id: &BookingId,
        status: BookingStatus,
    ) -> Result<(), TransitionError> {
        let booking = self
            .bookings
            .iter()
            .find(|b| &b.id == id)
            .ok_or(TransitionError::BookingNotFound)?;
        if booking.status.is_terminal() {
            return Err(TransitionError::TerminalStatus);
        }
        self.pending = Some(PendingChange {
            id: id.clone(),
            status,
        });
        Ok(())
    }

    /// Drop the staged change without applying it. Idempotent.
    pub fn cancel_status_change(&mut self) {
        self.pending = None;
    }

    /// Whether a change is staged awaiting confirmation.
    #[must_use]
    pub const fn has_pending_change(&self) -> bool {
        self.pending.is_some()
    }

    /// Apply the staged status change.
    ///
    /// For `Returned` the refund is settled with the gateway first; the
    /// status write only happens when the gateway processed or queued the
    /// refund. The staged change is consumed either way, and a transient
    /// message is posted reporting the outcome.
    ///
    /// Returns `Ok(None)` when nothing was staged.
    ///
    /// # Errors
    ///
    /// Returns a [`TransitionError`] describing why the transition did not
    /// complete. Refund rejections leave the status untouched but annotate
    /// the booking with `refundStatus: failed`.
    pub async fn confirm_status_change(
        &mut self,
    ) -> Result<Option<StatusChange>, TransitionError> {
        let Some(pending) = self.pending.take() else {
            return Ok(None);
        };
        match self.apply_transition(&pending).await {
            Ok(change) => {
                let text = match change.refund_status {
                    Some(RefundStatus::Queued) => {
                        "Refund queued. Booking marked as Returned.".to_owned()
                    }
                    Some(_) => "Refund processed and booking marked as Returned.".to_owned(),
                    None => format!("Booking marked as {}.", change.status),
                };
                self.post_message(text, MessageKind::Success, SUCCESS_TTL);
                info!(id = %change.id, status = %change.status, "booking status updated");
                Ok(Some(change))
            }
            Err(err) => {
                self.post_message(
                    format!("Failed to update booking: {err}"),
                    MessageKind::Failure,
                    FAILURE_TTL,
                );
                warn!(id = %pending.id, error = %err, "status transition failed");
                Err(err)
            }
        }
    }

    async fn apply_transition(
        &mut self,
        pending: &PendingChange,
    ) -> Result<StatusChange, TransitionError> {
        let booking = self
            .bookings
            .iter()
            .find(|b| b.id == pending.id)
            .cloned()
            .ok_or(TransitionError::BookingNotFound)?;
        if booking.status.is_terminal() {
            return Err(TransitionError::TerminalStatus);
        }

        if pending.status == BookingStatus::Returned {
            self.settle_refund(&booking).await
        } else {
            let patch = DocumentPatch::new()
                .field("status", json!(pending.status.as_str()))
                .server_timestamp("updatedAt");
            self.store
                .update_document(BOOKINGS, pending.id.as_str(), patch)
                .await?;
            Ok(StatusChange {
                id: pending.id.clone(),
                status: pending.status,
                refund_status: None,
                refund_id: None,
            })
        }
    }

    /// Run the compound refund flow for a return.
    ///
    /// Order matters: the gateway verdict decides whether the status write
    /// happens at all. A rejection or an unusable response annotates the
    /// booking with a failed refund but leaves its status alone; a
    /// transport failure writes nothing, since the refund may still have
    /// gone through on the gateway side.
    async fn settle_refund(&mut self, booking: &Booking) -> Result<StatusChange, TransitionError> {
        let Some(payment_id) = booking.payment_reference() else {
            self.annotate_failed_refund(&booking.id).await?;
            return Err(TransitionError::MissingPaymentId);
        };
        let amount = booking.total.unwrap_or_default();

        self.post_message(
            "Processing refund...".to_owned(),
            MessageKind::Pending,
            PENDING_TTL,
        );

        match self.gateway.refund_payment(payment_id, amount).await {
            Ok(RefundOutcome::Processed { status, refund_id }) => {
                let mut patch = DocumentPatch::new()
                    .field("status", json!(BookingStatus::Returned.as_str()))
                    .field("refundStatus", json!(status.as_str()))
                    .server_timestamp("updatedAt");
                if let Some(id) = &refund_id {
                    patch = patch.field("refundId", json!(id));
                }
                self.store
                    .update_document(BOOKINGS, booking.id.as_str(), patch)
                    .await?;
                Ok(StatusChange {
                    id: booking.id.clone(),
                    status: BookingStatus::Returned,
                    refund_status: Some(status),
                    refund_id,
                })
            }
            Ok(RefundOutcome::Queued) => {
                let patch = DocumentPatch::new()
                    .field("status", json!(BookingStatus::Returned.as_str()))
                    .field("refundStatus", json!(RefundStatus::Queued.as_str()))
                    .server_timestamp("updatedAt");
                self.store
                    .update_document(BOOKINGS, booking.id.as_str(), patch)
                    .await?;
                Ok(StatusChange {
                    id: booking.id.clone(),
                    status: BookingStatus::Returned,
                    refund_status: Some(RefundStatus::Queued),
                    refund_id: None,
                })
            }
            Ok(RefundOutcome::Rejected { message }) => {
                self.annotate_failed_refund(&booking.id).await?;
                Err(TransitionError::RefundRejected(
                    message.unwrap_or_else(|| "gateway declined the refund".to_owned()),
                ))
            }
            Err(RefundError::InvalidResponse) => {
                self.annotate_failed_refund(&booking.id).await?;
                Err(TransitionError::InvalidGatewayResponse)
            }
            Err(RefundError::Http(err)) => Err(TransitionError::Gateway(err.to_string())),
        }
    }

    /// Record a failed refund attempt without touching the status.
    async fn annotate_failed_refund(&self, id: &BookingId) -> Result<(), TransitionError> {
        let patch = DocumentPatch::new()
            .field("refundStatus", json!(RefundStatus::Failed.as_str()))
            .server_timestamp("updatedAt");
        self.store
            .update_document(BOOKINGS, id.as_str(), patch)
            .await?;
        Ok(())
    }

    // =========================================================================
    // Messages
    // =========================================================================

    /// The current transient message, if it has not expired.
    #[must_use]
    pub fn status_message(&self) -> Option<&StatusMessage> {
        self.message.as_ref().filter(|m| !m.expired())
    }

    fn post_message(&mut self, text: String, kind: MessageKind, ttl: Duration) {
        self.message = Some(StatusMessage {
            text,
            kind,
            posted: Instant::now(),
            ttl,
        });
    }
}
