use std::sync::Arc;

use sqlx::SqlitePool;

use crate::collab::notify::{NoopNotifier, NotificationDispatcher, WebhookNotifier};
use crate::collab::payment::{DisabledPaymentGateway, HttpPaymentGateway, PaymentGateway};
use crate::core::Config;
use crate::db::DbService;

/// Shared per-process state: configuration, database pool and collaborator
/// clients. Cheap to clone (Arc internals); every request gets a clone via
/// axum's `State` extractor.
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: SqlitePool,
    pub payments: Arc<dyn PaymentGateway>,
    pub notifier: Arc<dyn NotificationDispatcher>,
}

impl ServerState {
    /// Wire state from explicit parts. Tests use this to inject collaborator
    /// doubles; [`initialize`](Self::initialize) is the production path.
    pub fn new(
        config: Config,
        db: SqlitePool,
        payments: Arc<dyn PaymentGateway>,
        notifier: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        Self { config, db, payments, notifier }
    }

    /// Open the database, run migrations and build collaborator clients
    /// from configuration.
    pub async fn initialize(config: &Config) -> anyhow::Result<Self> {
        let db_path = config.database_path();
        let db_service = DbService::new(&db_path.to_string_lossy()).await?;

        let payments: Arc<dyn PaymentGateway> = match &config.payment_provider_url {
            Some(url) => Arc::new(HttpPaymentGateway::new(url.clone(), config.request_timeout_ms)?),
            None => {
                tracing::warn!("PAYMENT_PROVIDER_URL not set; automatic refunds are disabled");
                Arc::new(DisabledPaymentGateway)
            }
        };

        let notifier: Arc<dyn NotificationDispatcher> = match &config.notify_webhook_url {
            Some(url) => Arc::new(WebhookNotifier::new(url.clone(), config.request_timeout_ms)?),
            None => {
                tracing::warn!("NOTIFY_WEBHOOK_URL not set; order notifications are dropped");
                Arc::new(NoopNotifier)
            }
        };

        Ok(Self::new(config.clone(), db_service.pool, payments, notifier))
    }
}
