use async_trait::async_trait;
use sqlx::PgPool;

use crate::db::alert_queries;
use crate::errors::AppError;
use crate::models::{Alert, NewAlert};

/// Durable, append-only store of alerts keyed by article URL. The single
/// source of truth for "this article was already processed."
#[async_trait]
pub trait AlertStore: Send + Sync {
    async fn exists(&self, url: &str) -> Result<bool, AppError>;

    /// Fails with [`AppError::DuplicateKey`] if an alert for the URL is
    /// already present. Must be atomic: concurrent inserts for the same
    /// URL may not both succeed.
    async fn insert(&self, alert: NewAlert) -> Result<Alert, AppError>;

    async fn count(&self) -> Result<i64, AppError>;

    /// Newest-first by insertion order.
    async fn list_recent(&self, offset: i64, limit: i64) -> Result<Vec<Alert>, AppError>;
}

/// Postgres-backed store; uniqueness comes from the `alerts_url_key`
/// constraint, not application logic.
#[derive(Clone)]
pub struct PgAlertStore {
    pool: PgPool,
}

impl PgAlertStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AlertStore for PgAlertStore {
    async fn exists(&self, url: &str) -> Result<bool, AppError> {
        alert_queries::alert_exists(&self.pool, url)
            .await
            .map_err(AppError::Db)
    }

    async fn insert(&self, alert: NewAlert) -> Result<Alert, AppError> {
        match alert_queries::insert_alert(&self.pool, &alert).await {
            Ok(inserted) => Ok(inserted),
            Err(e) => {
                let unique_violation = e
                    .as_database_error()
                    .map(|db| db.is_unique_violation())
                    .unwrap_or(false);
                if unique_violation {
                    Err(AppError::DuplicateKey(alert.url))
                } else {
                    Err(AppError::Db(e))
                }
            }
        }
    }

    async fn count(&self) -> Result<i64, AppError> {
        alert_queries::count_alerts(&self.pool)
            .await
            .map_err(AppError::Db)
    }

    async fn list_recent(&self, offset: i64, limit: i64) -> Result<Vec<Alert>, AppError> {
        alert_queries::list_recent_alerts(&self.pool, offset, limit)
            .await
            .map_err(AppError::Db)
    }
}
