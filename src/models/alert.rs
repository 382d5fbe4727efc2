use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Durable record that an article's referenced price diverged from the
/// current market price beyond the configured threshold. Written exactly
/// once per article URL, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Alert {
    pub id: i64,
    pub recorded_at: DateTime<Utc>,
    pub article_at: DateTime<Utc>,
    pub company_name: String,
    pub subject: String,
    pub url: String,
    pub body_text: String,
    pub price_at_news: f64,
    pub price_now: f64,
}

/// Insert payload; `id` and `recorded_at` are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewAlert {
    pub article_at: DateTime<Utc>,
    pub company_name: String,
    pub subject: String,
    pub url: String,
    pub body_text: String,
    pub price_at_news: f64,
    pub price_now: f64,
}

/// Row shape served by the reporting endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct AlertView {
    pub company_name: String,
    pub article_at: DateTime<Utc>,
    pub ratio: f64,
    pub text: String,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct PaginatedAlerts {
    pub items: Vec<AlertView>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

impl From<Alert> for AlertView {
    fn from(alert: Alert) -> Self {
        AlertView {
            ratio: alert.price_now / alert.price_at_news,
            text: format!("{} {}", alert.subject, alert.body_text),
            company_name: alert.company_name,
            article_at: alert.article_at,
            url: alert.url,
        }
    }
}
