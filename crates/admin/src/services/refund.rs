//! Refund gateway client.
//!
//! The payments backend exposes a single `refundPayment` endpoint. Its
//! response body is authoritative regardless of HTTP status:
//!
//! - `{"success": true, "refund": {"status", "id"}}` when the refund went
//!   through synchronously,
//! - `{"refundQueued": true, ...}` when the gateway accepted it for
//!   asynchronous processing,
//! - anything else is a rejection, optionally carrying a `message`.

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use sweetslot_core::RefundStatus;
use thiserror::Error;
use tracing::info;

use crate::config::AdminConfig;

/// Errors from the refund gateway.
#[derive(Debug, Error)]
pub enum RefundError {
    /// The request never produced a usable response (transport failure).
    #[error("refund request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with something that is not the refund shape.
    #[error("refund endpoint returned an unexpected payload")]
    InvalidResponse,
}

/// What the gateway decided about a refund request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefundOutcome {
    /// The refund completed synchronously.
    Processed {
        status: RefundStatus,
        refund_id: Option<String>,
    },
    /// The gateway queued the refund for asynchronous completion.
    Queued,
    /// The gateway declined the refund.
    Rejected { message: Option<String> },
}

/// Client seam for the payments backend.
#[allow(async_fn_in_trait)]
pub trait RefundGateway {
    /// Request a full refund of `amount` against a gateway payment id.
    async fn refund_payment(
        &self,
        payment_id: &str,
        amount: Decimal,
    ) -> Result<RefundOutcome, RefundError>;
}

#[derive(Debug, Deserialize, Default)]
struct RefundResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    refund: Option<RefundInfo>,
    #[serde(default, rename = "refundQueued")]
    refund_queued: bool,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RefundInfo {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    id: Option<String>,
}

fn interpret(response: RefundResponse) -> RefundOutcome {
    if response.success {
        let (status, id) = response
            .refund
            .map_or((None, None), |r| (r.status, r.id));
        return RefundOutcome::Processed {
            status: status
                .as_deref()
                .and_then(RefundStatus::parse)
                .unwrap_or(RefundStatus::Processed),
            refund_id: id,
        };
    }
    if response.refund_queued {
        return RefundOutcome::Queued;
    }
    RefundOutcome::Rejected {
        message: response.message,
    }
}

/// HTTP client for the refund endpoint.
#[derive(Debug, Clone)]
pub struct HttpRefundGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRefundGateway {
    /// Build a gateway client from the admin configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RefundError::Http`] when the HTTP client cannot be
    /// constructed.
    pub fn new(config: &AdminConfig) -> Result<Self, RefundError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: config
                .refund_base_url
                .as_str()
                .trim_end_matches('/')
                .to_owned(),
        })
    }
}

impl RefundGateway for HttpRefundGateway {
    async fn refund_payment(
        &self,
        payment_id: &str,
        amount: Decimal,
    ) -> Result<RefundOutcome, RefundError> {
        let response = self
            .client
            .post(format!("{}/refundPayment", self.base_url))
            .json(&json!({
                "razorpay_payment_id": payment_id,
                "amount": amount,
            }))
            .send()
            .await?;

        // The body carries the verdict even on non-2xx statuses.
        let body = response.text().await?;
        let parsed: RefundResponse =
            serde_json::from_str(&body).map_err(|_| RefundError::InvalidResponse)?;
        let outcome = interpret(parsed);
        info!(payment_id, ?outcome, "refund gateway responded");
        Ok(outcome)
    }
}
