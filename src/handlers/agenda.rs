use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;

use crate::errors::AppError;
use crate::models::{AgendaQuery, AgendaView, BarberView, CalendarEvent, CalendarQuery, StaffFilter};
use crate::services::agenda;
use crate::services::calendar::project_all;
use crate::services::colors::FALLBACK_COLOR;
use crate::state::AppState;

use super::check_auth;

// GET /api/agenda
pub async fn get_agenda(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<AgendaQuery>,
) -> Result<Json<AgendaView>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let filter = query.into_filter()?;

    agenda::ensure_loaded(&state).await;
    Ok(Json(agenda::render_current(&state, &filter)))
}

// POST /api/agenda/refresh
pub async fn refresh_agenda(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<AgendaQuery>,
) -> Result<Json<AgendaView>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let filter = query.into_filter()?;

    agenda::refresh(&state).await?;
    Ok(Json(agenda::render_current(&state, &filter)))
}

// GET /api/calendar
pub async fn get_calendar(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<Vec<CalendarEvent>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let staff = StaffFilter::parse(query.staff.as_deref());

    agenda::ensure_loaded(&state).await;
    let events = state
        .agenda
        .current()
        .map(|a| project_all(&a.bookings, &a.colors, &staff))
        .unwrap_or_default();

    Ok(Json(events))
}

// GET /api/barbers
pub async fn get_barbers(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<BarberView>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let barbers = state.api.list_barbers().await.map_err(|e| {
        let err = AppError::upstream(e);
        tracing::error!(error = %err, "failed to load barbers");
        err
    })?;

    agenda::ensure_loaded(&state).await;
    let colors = state.agenda.current().map(|a| Arc::clone(&a.colors));

    let response = barbers
        .into_iter()
        .map(|b| {
            let color = colors
                .as_ref()
                .and_then(|c| c.get(&b.id))
                .unwrap_or(FALLBACK_COLOR);
            BarberView {
                id: b.id,
                name: b.name,
                color: color.to_string(),
            }
        })
        .collect();

    Ok(Json(response))
}
