//! Payment/refund collaborator
//!
//! The provider owns capture and onboarding; this side only issues refunds.
//! A refund is requested at most once per cancellation event, and a failed
//! call must never block the cancellation that triggered it — callers log
//! and continue.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::models::serde_helpers;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("payment provider unreachable: {0}")]
    Transport(String),

    #[error("payment provider rejected the refund: {0}")]
    Rejected(String),

    #[error("no payment provider configured")]
    NotConfigured,
}

/// Full-amount refund request for a cancelled order.
#[derive(Debug, Clone, Serialize)]
pub struct RefundRequest {
    pub order_id: i64,
    /// Provider transaction reference captured at payment time.
    pub payment_ref: String,
    /// None requests a full refund of the original charge.
    #[serde(with = "serde_helpers::money_opt")]
    pub amount: Option<f64>,
    pub actor_id: i64,
    pub actor_role: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefundResult {
    pub refund_id: String,
    pub status: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn refund(&self, request: RefundRequest) -> Result<RefundResult, PaymentError>;
}

/// HTTP client against the configured provider.
pub struct HttpPaymentGateway {
    base_url: String,
    client: reqwest::Client,
}

impl HttpPaymentGateway {
    pub fn new(base_url: String, timeout_ms: u64) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()?;
        Ok(Self { base_url: base_url.trim_end_matches('/').to_string(), client })
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn refund(&self, request: RefundRequest) -> Result<RefundResult, PaymentError> {
        let url = format!("{}/refunds", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| PaymentError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PaymentError::Rejected(format!("{status}: {body}")));
        }

        response
            .json::<RefundResult>()
            .await
            .map_err(|e| PaymentError::Transport(format!("invalid refund response: {e}")))
    }
}

/// Stand-in when no provider URL is configured; every refund attempt is
/// reported as failed so cancellations still proceed.
pub struct DisabledPaymentGateway;

#[async_trait]
impl PaymentGateway for DisabledPaymentGateway {
    async fn refund(&self, _request: RefundRequest) -> Result<RefundResult, PaymentError> {
        Err(PaymentError::NotConfigured)
    }
}
