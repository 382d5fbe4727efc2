use crate::models::{Alert, NewAlert};
use sqlx::PgPool;

pub async fn alert_exists(pool: &PgPool, url: &str) -> Result<bool, sqlx::Error> {
    let row: (bool,) = sqlx::query_as(
        r#"
        SELECT EXISTS(SELECT 1 FROM alerts WHERE url = $1)
        "#,
    )
    .bind(url)
    .fetch_one(pool)
    .await?;

    Ok(row.0)
}

/// Insert a new alert. The UNIQUE constraint on `url` is the dedup
/// backstop: a concurrent pass that raced past the exists-check fails
/// here with a unique violation instead of writing a second row.
pub async fn insert_alert(pool: &PgPool, alert: &NewAlert) -> Result<Alert, sqlx::Error> {
    let inserted = sqlx::query_as::<_, Alert>(
        r#"
        INSERT INTO alerts (
            article_at, company_name, subject, url, body_text,
            price_at_news, price_now
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(alert.article_at)
    .bind(&alert.company_name)
    .bind(&alert.subject)
    .bind(&alert.url)
    .bind(&alert.body_text)
    .bind(alert.price_at_news)
    .bind(alert.price_now)
    .fetch_one(pool)
    .await?;

    Ok(inserted)
}

pub async fn count_alerts(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let count: (i64,) = sqlx::query_as(
        r#"
        SELECT count(*) FROM alerts
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count.0)
}

/// Newest-first page of alerts, ordered by insertion.
pub async fn list_recent_alerts(
    pool: &PgPool,
    offset: i64,
    limit: i64,
) -> Result<Vec<Alert>, sqlx::Error> {
    let alerts = sqlx::query_as::<_, Alert>(
        r#"
        SELECT * FROM alerts
        ORDER BY id DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(alerts)
}
