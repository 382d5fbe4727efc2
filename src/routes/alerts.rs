use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::{AlertView, PaginatedAlerts};
use crate::state::AppState;

const DEFAULT_PER_PAGE: i64 = 10;
const MAX_PER_PAGE: i64 = 100;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_alerts))
}

#[derive(Debug, Deserialize)]
struct PaginationParams {
    page: Option<i64>,
    per_page: Option<i64>,
}

/// GET /api/alerts?page&per_page - newest-first page of recorded alerts.
///
/// Read-only over whatever the pipeline has persisted; pipeline failures
/// never surface here.
async fn list_alerts(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<PaginatedAlerts>, AppError> {
    let page = params.page.unwrap_or(1).max(1);
    let per_page = params
        .per_page
        .unwrap_or(DEFAULT_PER_PAGE)
        .clamp(1, MAX_PER_PAGE);
    // Saturate: an absurd page number yields an empty page, never an
    // overflow or a negative OFFSET.
    let offset = page.saturating_sub(1).saturating_mul(per_page);

    let total = state.store.count().await?;
    let alerts = state.store.list_recent(offset, per_page).await?;

    Ok(Json(PaginatedAlerts {
        items: alerts.into_iter().map(AlertView::from).collect(),
        total,
        page,
        per_page,
    }))
}
