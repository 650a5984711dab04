//! Guarded status transitions and the compound refund flow.

use rust_decimal::Decimal;
use serde_json::json;
use sweetslot_admin::{BOOKINGS, BookingBoard, RefundOutcome, TransitionError};
use sweetslot_core::{BookingId, BookingStatus, RefundStatus};
use sweetslot_integration_tests::{MockGateway, seed, transport_error};
use sweetslot_store::{Document, DocumentStore, MemoryStore};

async fn board_with(
    store: &MemoryStore,
    gateway: &MockGateway,
) -> BookingBoard<MemoryStore, MockGateway> {
    sweetslot_integration_tests::init_tracing();
    let mut board = BookingBoard::new(store.clone(), gateway.clone());
    board.subscribe();
    assert!(board.pump().await, "initial snapshot");
    board
}

async fn fetch(store: &MemoryStore, id: &str) -> Document {
    store
        .get_document(BOOKINGS, id)
        .await
        .expect("store ok")
        .expect("document present")
}

#[tokio::test]
async fn test_return_with_processed_refund() {
    let store = MemoryStore::new();
    seed(
        &store,
        BOOKINGS,
        "b1",
        json!({ "paymentId": "pay_1", "total": 450 }),
    );
    let gateway = MockGateway::new();
    gateway.script(Ok(RefundOutcome::Processed {
        status: RefundStatus::Processed,
        refund_id: Some("rfnd_1".to_owned()),
    }));
    let mut board = board_with(&store, &gateway).await;

    board
        .request_status_change(&BookingId::new("b1"), BookingStatus::Returned)
        .expect("stageable");
    let change = board
        .confirm_status_change()
        .await
        .expect("transition applies")
        .expect("was staged");

    assert_eq!(change.status, BookingStatus::Returned);
    assert_eq!(change.refund_status, Some(RefundStatus::Processed));
    assert_eq!(change.refund_id.as_deref(), Some("rfnd_1"));

    let doc = fetch(&store, "b1").await;
    assert_eq!(doc.field("status"), Some(&json!("Returned")));
    assert_eq!(doc.field("refundStatus"), Some(&json!("processed")));
    assert_eq!(doc.field("refundId"), Some(&json!("rfnd_1")));
    assert!(doc.field("updatedAt").is_some());

    assert_eq!(gateway.calls(), vec![("pay_1".to_owned(), Decimal::from(450))]);
}

#[tokio::test]
async fn test_return_with_queued_refund() {
    let store = MemoryStore::new();
    seed(
        &store,
        BOOKINGS,
        "b1",
        json!({ "razorpay_payment_id": "pay_legacy", "total": 900 }),
    );
    let gateway = MockGateway::new();
    gateway.script(Ok(RefundOutcome::Queued));
    let mut board = board_with(&store, &gateway).await;

    board
        .request_status_change(&BookingId::new("b1"), BookingStatus::Returned)
        .expect("stageable");
    let change = board
        .confirm_status_change()
        .await
        .expect("transition applies")
        .expect("was staged");

    assert_eq!(change.refund_status, Some(RefundStatus::Queued));
    assert!(change.refund_id.is_none());

    let doc = fetch(&store, "b1").await;
    assert_eq!(doc.field("status"), Some(&json!("Returned")));
    assert_eq!(doc.field("refundStatus"), Some(&json!("queued")));
    assert!(doc.field("refundId").is_none());

    // Legacy payment field is still refundable.
    assert_eq!(
        gateway.calls(),
        vec![("pay_legacy".to_owned(), Decimal::from(900))]
    );
}

#[tokio::test]
async fn test_return_without_payment_id_aborts() {
    let store = MemoryStore::new();
    seed(&store, BOOKINGS, "b1", json!({ "total": 450 }));
    let gateway = MockGateway::new();
    let mut board = board_with(&store, &gateway).await;

    board
        .request_status_change(&BookingId::new("b1"), BookingStatus::Returned)
        .expect("stageable");
    let err = board
        .confirm_status_change()
        .await
        .expect_err("no payment id");
    assert!(matches!(err, TransitionError::MissingPaymentId));

    // Annotated as failed, but the status never changed and the gateway
    // was never called.
    let doc = fetch(&store, "b1").await;
    assert_eq!(doc.field("refundStatus"), Some(&json!("failed")));
    assert!(doc.field("status").is_none());
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_return_with_rejected_refund_keeps_status() {
    let store = MemoryStore::new();
    seed(
        &store,
        BOOKINGS,
        "b1",
        json!({ "paymentId": "pay_1", "total": 450 }),
    );
    let gateway = MockGateway::new();
    gateway.script(Ok(RefundOutcome::Rejected {
        message: Some("payment already refunded".to_owned()),
    }));
    let mut board = board_with(&store, &gateway).await;

    board
        .request_status_change(&BookingId::new("b1"), BookingStatus::Returned)
        .expect("stageable");
    let err = board.confirm_status_change().await.expect_err("rejected");
    assert!(matches!(err, TransitionError::RefundRejected(_)));

    let doc = fetch(&store, "b1").await;
    assert_eq!(doc.field("refundStatus"), Some(&json!("failed")));
    assert!(doc.field("status").is_none());
}

#[tokio::test]
async fn test_transport_failure_writes_nothing() {
    let store = MemoryStore::new();
    seed(
        &store,
        BOOKINGS,
        "b1",
        json!({ "paymentId": "pay_1", "total": 450 }),
    );
    let gateway = MockGateway::new();
    gateway.script(Err(transport_error()));
    let mut board = board_with(&store, &gateway).await;

    board
        .request_status_change(&BookingId::new("b1"), BookingStatus::Returned)
        .expect("stageable");
    let err = board
        .confirm_status_change()
        .await
        .expect_err("transport failure");
    assert!(matches!(err, TransitionError::Gateway(_)));

    // The refund may have landed on the gateway side; nothing is written.
    let doc = fetch(&store, "b1").await;
    assert!(doc.field("refundStatus").is_none());
    assert!(doc.field("status").is_none());
}

#[tokio::test]
async fn test_cancellation_skips_gateway() {
    let store = MemoryStore::new();
    seed(
        &store,
        BOOKINGS,
        "b1",
        json!({ "paymentId": "pay_1", "total": 450 }),
    );
    let gateway = MockGateway::new();
    let mut board = board_with(&store, &gateway).await;

    board
        .request_status_change(&BookingId::new("b1"), BookingStatus::Cancelled)
        .expect("stageable");
    let change = board
        .confirm_status_change()
        .await
        .expect("transition applies")
        .expect("was staged");

    assert_eq!(change.status, BookingStatus::Cancelled);
    assert!(change.refund_status.is_none());

    let doc = fetch(&store, "b1").await;
    assert_eq!(doc.field("status"), Some(&json!("Cancelled")));
    assert!(doc.field("refundStatus").is_none());
    assert!(doc.field("updatedAt").is_some());
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_returned_booking_is_terminal() {
    let store = MemoryStore::new();
    seed(&store, BOOKINGS, "b1", json!({ "status": "Returned" }));
    let gateway = MockGateway::new();
    let mut board = board_with(&store, &gateway).await;

    let err = board
        .request_status_change(&BookingId::new("b1"), BookingStatus::Cancelled)
        .expect_err("terminal");
    assert!(matches!(err, TransitionError::TerminalStatus));
    assert!(!board.has_pending_change());
}

#[tokio::test]
async fn test_unknown_booking_rejected_at_request() {
    let store = MemoryStore::new();
    let gateway = MockGateway::new();
    let mut board = board_with(&store, &gateway).await;

    let err = board
        .request_status_change(&BookingId::new("ghost"), BookingStatus::Cancelled)
        .expect_err("unknown id");
    assert!(matches!(err, TransitionError::BookingNotFound));
}

#[tokio::test]
async fn test_confirm_without_staged_change_is_noop() {
    let store = MemoryStore::new();
    seed(&store, BOOKINGS, "b1", json!({ "paymentId": "pay_1" }));
    let gateway = MockGateway::new();
    let mut board = board_with(&store, &gateway).await;

    let outcome = board.confirm_status_change().await.expect("no-op");
    assert!(outcome.is_none());

    // Cancelling twice is harmless and leaves nothing staged.
    board
        .request_status_change(&BookingId::new("b1"), BookingStatus::Cancelled)
        .expect("stageable");
    board.cancel_status_change();
    board.cancel_status_change();
    assert!(!board.has_pending_change());
    let outcome = board.confirm_status_change().await.expect("no-op");
    assert!(outcome.is_none());
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_staged_change_consumed_after_confirm() {
    let store = MemoryStore::new();
    seed(&store, BOOKINGS, "b1", json!({ "paymentId": "pay_1" }));
    let gateway = MockGateway::new();
    let mut board = board_with(&store, &gateway).await;

    board
        .request_status_change(&BookingId::new("b1"), BookingStatus::Cancelled)
        .expect("stageable");
    board
        .confirm_status_change()
        .await
        .expect("transition applies");
    assert!(!board.has_pending_change());

    // A second confirm with nothing staged does not re-apply.
    let outcome = board.confirm_status_change().await.expect("no-op");
    assert!(outcome.is_none());
}
