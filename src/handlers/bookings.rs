use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;

use crate::errors::AppError;
use crate::models::{AgendaRow, BookingStatus, StatusChangeRequest};
use crate::services::agenda;
use crate::state::AppState;

use super::check_auth;

// POST /api/bookings/:id/status
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<StatusChangeRequest>,
) -> Result<Json<AgendaRow>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let status = BookingStatus::parse(body.status.trim());
    agenda::ensure_loaded(&state).await;
    let row = agenda::change_status(&state, &id, status).await?;

    Ok(Json(row))
}

// DELETE /api/bookings/:id
pub async fn delete_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    agenda::ensure_loaded(&state).await;
    agenda::delete(&state, &id).await?;
    Ok(Json(serde_json::json!({ "ok": true })))
}
