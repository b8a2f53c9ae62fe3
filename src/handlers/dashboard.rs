use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::services::dashboard::{resolve_range, DateRange};
use crate::state::AppState;

use super::check_auth;

#[derive(Deserialize)]
pub struct DashboardQuery {
    pub range: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Serialize)]
pub struct DashboardResponse {
    range: DateRange,
    metrics: serde_json::Value,
}

// GET /api/dashboard
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardResponse>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let range = resolve_range(
        query.range.as_deref(),
        query.start_date.as_deref(),
        query.end_date.as_deref(),
        Utc::now().date_naive(),
    )?;

    let metrics = state
        .api
        .dashboard_metrics(range.start, range.end)
        .await
        .map_err(|e| {
            let err = AppError::upstream(e);
            tracing::error!(error = %err, start = %range.start, end = %range.end, "failed to load dashboard metrics");
            err
        })?;

    Ok(Json(DashboardResponse { range, metrics }))
}
