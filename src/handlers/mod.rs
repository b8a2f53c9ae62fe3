pub mod agenda;
pub mod bookings;
pub mod calendar;
pub mod dashboard;
pub mod events;
pub mod health;
pub mod products;

use std::sync::Arc;

use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::Router;

use crate::errors::AppError;
use crate::state::AppState;

pub fn check_auth(headers: &HeaderMap, expected_token: &str) -> Result<(), AppError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    check_token(token, expected_token)
}

/// For clients that cannot set headers (EventSource, calendar apps).
pub fn check_token(token: &str, expected_token: &str) -> Result<(), AppError> {
    if token.is_empty() || token != expected_token {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/agenda", get(agenda::get_agenda))
        .route("/api/agenda/refresh", post(agenda::refresh_agenda))
        .route("/api/calendar", get(agenda::get_calendar))
        .route("/api/barbers", get(agenda::get_barbers))
        .route(
            "/api/bookings/:id/status",
            post(bookings::update_status),
        )
        .route(
            "/api/bookings/:id",
            axum::routing::delete(bookings::delete_booking),
        )
        .route("/api/dashboard", get(dashboard::get_dashboard))
        .route(
            "/api/products",
            get(products::list_products).post(products::create_product),
        )
        .route("/api/events", get(events::events_stream))
        .route("/calendar/feed.ics", get(calendar::calendar_feed))
        .route(
            "/calendar/:booking_id",
            get(calendar::download_ics),
        )
        .with_state(state)
}
