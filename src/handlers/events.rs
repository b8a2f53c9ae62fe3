use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::response::sse::{Event, Sse};
use serde::Deserialize;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use crate::errors::AppError;
use crate::models::Notification;
use crate::state::AppState;

use super::check_token;

#[derive(Deserialize)]
pub struct SseQuery {
    pub token: Option<String>,
    pub last_id: Option<u64>,
}

fn to_event(notification: &Notification) -> Event {
    let data = serde_json::to_string(notification).unwrap_or_default();
    Event::default()
        .id(notification.id.to_string())
        .event("notification")
        .data(data)
}

// GET /api/events (SSE stream)
pub async fn events_stream(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SseQuery>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>>, AppError> {
    // Auth via query param (EventSource can't set headers)
    check_token(query.token.as_deref().unwrap_or(""), &state.config.admin_token)?;

    // Subscribe before reading the backlog so nothing falls in between
    let rx = state.notifier.subscribe();
    let last_id = query.last_id.unwrap_or(0);
    let catchup = state.notifier.since(last_id);
    let newest_sent = catchup.last().map(|n| n.id).unwrap_or(last_id);

    let catchup_stream =
        tokio_stream::iter(catchup.into_iter().map(|n| Ok::<_, Infallible>(to_event(&n))));

    let live_stream = BroadcastStream::new(rx).filter_map(move |result| match result {
        Ok(n) if n.id > newest_sent => Some(Ok(to_event(&n))),
        Ok(_) => None,
        Err(tokio_stream::wrappers::errors::BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!(skipped, "notification subscriber lagged");
            None
        }
    });

    let keepalive_stream = tokio_stream::StreamExt::map(
        tokio_stream::wrappers::IntervalStream::new(tokio::time::interval(Duration::from_secs(30))),
        |_| Ok(Event::default().comment("keepalive")),
    );

    let combined = catchup_stream.chain(live_stream);
    let merged = StreamExt::merge(combined, keepalive_stream);

    Ok(Sse::new(merged))
}
