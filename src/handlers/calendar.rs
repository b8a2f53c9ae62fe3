use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use chrono::Utc;

use crate::errors::AppError;
use crate::models::{CalendarEvent, CalendarQuery, StaffFilter};
use crate::services::agenda;
use crate::services::calendar::{generate_ics, project, project_all};
use crate::state::AppState;

use super::check_token;

const CALENDAR_NAME: &str = "Barbershop agenda";

fn ics_response(events: &[CalendarEvent], filename: &str) -> Response {
    let ics = generate_ics(events, CALENDAR_NAME, Utc::now());
    (
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        ics,
    )
        .into_response()
}

// GET /calendar/feed.ics
pub async fn calendar_feed(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CalendarQuery>,
) -> Result<Response, AppError> {
    check_token(query.token.as_deref().unwrap_or(""), &state.config.admin_token)?;
    let staff = StaffFilter::parse(query.staff.as_deref());

    agenda::ensure_loaded(&state).await;
    let events = state
        .agenda
        .current()
        .map(|a| project_all(&a.bookings, &a.colors, &staff))
        .unwrap_or_default();

    Ok(ics_response(&events, "agenda.ics"))
}

// GET /calendar/:booking_id
pub async fn download_ics(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
    Query(query): Query<CalendarQuery>,
) -> Result<Response, AppError> {
    check_token(query.token.as_deref().unwrap_or(""), &state.config.admin_token)?;

    let booking_id = raw_id.strip_suffix(".ics").unwrap_or(&raw_id);

    agenda::ensure_loaded(&state).await;
    let agenda = state
        .agenda
        .current()
        .ok_or_else(|| AppError::NotFound(format!("booking {booking_id}")))?;

    let booking = agenda
        .find(booking_id)
        .ok_or_else(|| AppError::NotFound(format!("booking {booking_id}")))?;

    // Without customer, service or time there is nothing to put in a calendar
    let event = project(booking, &agenda.colors).ok_or_else(|| {
        AppError::NotFound(format!("booking {booking_id} has no calendar event"))
    })?;

    Ok(ics_response(&[event], &format!("booking-{booking_id}.ics")))
}
