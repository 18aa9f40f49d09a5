//! Notification collaborator
//!
//! Order events fan out to customers/restaurants through an external
//! dispatcher. Notifications are fire-and-forget: they run after the
//! state-changing write has committed, in a detached task, and a failure is
//! logged without ever reaching the caller of the owning operation.

use async_trait::async_trait;
use serde::Serialize;
use shared::models::{Order, OrderStatus, serde_helpers};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification dispatch failed: {0}")]
    Transport(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationEvent {
    OrderPlaced,
    OrderStatusChanged,
    OrderCancelled,
}

/// Outbound order event payload.
#[derive(Debug, Clone, Serialize)]
pub struct OrderNotification {
    pub event: NotificationEvent,
    pub order_id: i64,
    pub order_number: String,
    pub customer_id: i64,
    pub restaurant_id: i64,
    pub status: OrderStatus,
    #[serde(with = "serde_helpers::money")]
    pub total: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl OrderNotification {
    pub fn for_order(event: NotificationEvent, order: &Order, reason: Option<String>) -> Self {
        Self {
            event,
            order_id: order.id,
            order_number: order.order_number.clone(),
            customer_id: order.customer_id,
            restaurant_id: order.restaurant_id,
            status: order.status,
            total: order.total,
            reason,
        }
    }
}

#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn notify_new_order(&self, notice: OrderNotification) -> Result<(), NotifyError>;
    async fn notify_order_status(&self, notice: OrderNotification) -> Result<(), NotifyError>;
    async fn notify_order_cancelled(&self, notice: OrderNotification) -> Result<(), NotifyError>;
}

/// Dispatch in a detached task; a failed call is logged and dropped.
pub fn notify_detached(notifier: Arc<dyn NotificationDispatcher>, notice: OrderNotification) {
    tokio::spawn(async move {
        let order_id = notice.order_id;
        let event = notice.event;
        let result = match event {
            NotificationEvent::OrderPlaced => notifier.notify_new_order(notice).await,
            NotificationEvent::OrderStatusChanged => notifier.notify_order_status(notice).await,
            NotificationEvent::OrderCancelled => notifier.notify_order_cancelled(notice).await,
        };
        if let Err(e) = result {
            tracing::warn!(order_id, ?event, error = %e, "Order notification failed");
        }
    });
}

/// Webhook-backed dispatcher.
pub struct WebhookNotifier {
    url: String,
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(url: String, timeout_ms: u64) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()?;
        Ok(Self { url, client })
    }

    async fn post(&self, notice: &OrderNotification) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.url)
            .json(notice)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;
        if !response.status().is_success() {
            return Err(NotifyError::Transport(format!(
                "webhook returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationDispatcher for WebhookNotifier {
    async fn notify_new_order(&self, notice: OrderNotification) -> Result<(), NotifyError> {
        self.post(&notice).await
    }

    async fn notify_order_status(&self, notice: OrderNotification) -> Result<(), NotifyError> {
        self.post(&notice).await
    }

    async fn notify_order_cancelled(&self, notice: OrderNotification) -> Result<(), NotifyError> {
        self.post(&notice).await
    }
}

/// Dispatcher used when no webhook is configured.
pub struct NoopNotifier;

#[async_trait]
impl NotificationDispatcher for NoopNotifier {
    async fn notify_new_order(&self, notice: OrderNotification) -> Result<(), NotifyError> {
        tracing::debug!(order_id = notice.order_id, "notification dropped (no webhook configured)");
        Ok(())
    }

    async fn notify_order_status(&self, notice: OrderNotification) -> Result<(), NotifyError> {
        tracing::debug!(order_id = notice.order_id, "notification dropped (no webhook configured)");
        Ok(())
    }

    async fn notify_order_cancelled(&self, notice: OrderNotification) -> Result<(), NotifyError> {
        tracing::debug!(order_id = notice.order_id, "notification dropped (no webhook configured)");
        Ok(())
    }
}
