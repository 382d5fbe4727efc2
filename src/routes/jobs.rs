use axum::{extract::State, routing::post, Json, Router};
use serde::Serialize;

use crate::errors::AppError;
use crate::services::pipeline;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/news-scan", post(trigger_news_scan))
}

#[derive(Serialize)]
struct ScanResponse {
    discovered: usize,
    fetched: usize,
    alerted: usize,
    skipped_no_price: usize,
    skipped_below_threshold: usize,
    skipped_duplicate: usize,
    failed: usize,
}

/// POST /api/jobs/news-scan - run one pass immediately, outside the cron
/// schedule. Safe to re-run: the pass is idempotent.
async fn trigger_news_scan(
    State(state): State<AppState>,
) -> Result<Json<ScanResponse>, AppError> {
    let report = pipeline::run_pass(&state.pipeline).await?;

    Ok(Json(ScanResponse {
        discovered: report.discovered,
        fetched: report.fetched,
        alerted: report.alerted,
        skipped_no_price: report.skipped_no_price,
        skipped_below_threshold: report.skipped_below_threshold,
        skipped_duplicate: report.skipped_duplicate,
        failed: report.failed,
    }))
}
