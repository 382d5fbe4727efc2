use crate::errors::AppError;
use std::env;

/// Runtime configuration, loaded once at startup. Anything missing or
/// malformed here is fatal: a pass must never start with unusable config.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub news_base_url: String,
    /// How many of the most recent listing entries a pass inspects.
    pub article_window: usize,
    /// Alert fires when price_now / price_at_news exceeds this.
    pub alert_threshold: f64,
    pub http_timeout_secs: u64,
    pub receiver_email: String,
    pub scan_cron: String,
    pub smtp: SmtpConfig,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
    pub from_name: String,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let database_url = require("DATABASE_URL")?;
        let receiver_email = require("RECEIVER_EMAIL")?;

        let article_window = parse_or("ARTICLE_WINDOW", 4usize)?;
        if article_window == 0 {
            return Err(AppError::Config(
                "ARTICLE_WINDOW must be at least 1".to_string(),
            ));
        }

        let alert_threshold = parse_or("ALERT_THRESHOLD", 1.03f64)?;
        if !alert_threshold.is_finite() || alert_threshold <= 0.0 {
            return Err(AppError::Config(
                "ALERT_THRESHOLD must be a positive number".to_string(),
            ));
        }

        Ok(Self {
            database_url,
            news_base_url: env::var("NEWS_BASE_URL")
                .unwrap_or_else(|_| "https://mfn.se".to_string()),
            article_window,
            alert_threshold,
            http_timeout_secs: parse_or("HTTP_TIMEOUT_SECS", 15u64)?,
            receiver_email,
            scan_cron: env::var("SCAN_CRON").unwrap_or_else(|_| "0 */10 * * * *".to_string()),
            smtp: SmtpConfig::from_env()?,
        })
    }
}

impl SmtpConfig {
    fn from_env() -> Result<Self, AppError> {
        let enabled = env::var("SMTP_ENABLED")
            .unwrap_or_else(|_| "false".to_string())
            .to_lowercase()
            == "true";

        if !enabled {
            // Notifications fall back to log-only; no credentials needed.
            return Ok(Self {
                enabled,
                host: String::new(),
                port: 587,
                username: String::new(),
                password: String::new(),
                from_email: String::new(),
                from_name: "Pricewatch".to_string(),
            });
        }

        Ok(Self {
            enabled,
            host: require("SMTP_HOST")?,
            port: parse_or("SMTP_PORT", 587u16)?,
            username: require("SMTP_USERNAME")?,
            password: require("SMTP_PASSWORD")?,
            from_email: require("SMTP_FROM_EMAIL")?,
            from_name: env::var("SMTP_FROM_NAME").unwrap_or_else(|_| "Pricewatch".to_string()),
        })
    }
}

fn require(key: &str) -> Result<String, AppError> {
    env::var(key).map_err(|_| AppError::Config(format!("{} is not set", key)))
}

fn parse_or<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|_| AppError::Config(format!("{} has an invalid value: {}", key, raw))),
        Err(_) => Ok(default),
    }
}
