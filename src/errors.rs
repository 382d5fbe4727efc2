use axum::http::StatusCode;
use axum::response::IntoResponse;
use sqlx::Error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Db(sqlx::Error),
    #[error("Fetch error: {0}")]
    Fetch(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Price lookup error: {0}")]
    Lookup(String),
    #[error("Division undefined: reference price is zero or missing")]
    DivisionUndefined,
    #[error("Duplicate key: alert already recorded for {0}")]
    DuplicateKey(String),
    #[error("Notification error: {0}")]
    Notify(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        match self {
            AppError::Fetch(msg) | AppError::Lookup(msg) => {
                (StatusCode::BAD_GATEWAY, msg).into_response()
            }
            AppError::DuplicateKey(_) => (StatusCode::CONFLICT, "Already recorded").into_response(),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response(),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(value: Error) -> Self {
        AppError::Db(value)
    }
}
