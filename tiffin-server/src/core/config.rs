use std::path::PathBuf;

/// Server configuration
///
/// Every entry can be overridden through an environment variable:
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | /var/lib/tiffin | Working directory (database, logs) |
/// | HTTP_PORT | 3000 | HTTP API port |
/// | DATABASE_PATH | WORK_DIR/database/tiffin.db | SQLite database file |
/// | ENVIRONMENT | development | development \| staging \| production |
/// | PAYMENT_PROVIDER_URL | (unset) | Refund endpoint base URL |
/// | NOTIFY_WEBHOOK_URL | (unset) | Order-event webhook URL |
/// | REQUEST_TIMEOUT_MS | 30000 | Per-request timeout |
#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: String,
    pub http_port: u16,
    /// Explicit database file path; defaults under the work dir.
    pub database_path: Option<String>,
    /// development | staging | production
    pub environment: String,
    /// Refund collaborator base URL; refunds are disabled when unset.
    pub payment_provider_url: Option<String>,
    /// Notification collaborator webhook; notifications are dropped when unset.
    pub notify_webhook_url: Option<String>,
    pub request_timeout_ms: u64,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/tiffin".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            database_path: std::env::var("DATABASE_PATH").ok(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            payment_provider_url: std::env::var("PAYMENT_PROVIDER_URL").ok(),
            notify_webhook_url: std::env::var("NOTIFY_WEBHOOK_URL").ok(),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30000),
        }
    }

    /// Override work dir and port, commonly for tests.
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn database_path(&self) -> PathBuf {
        match &self.database_path {
            Some(p) => PathBuf::from(p),
            None => PathBuf::from(&self.work_dir).join("database").join("tiffin.db"),
        }
    }

    pub fn logs_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// Make sure the work-dir skeleton exists before anything opens files in it.
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        if let Some(parent) = self.database_path().parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::create_dir_all(self.logs_dir())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
