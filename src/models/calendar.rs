use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Event shape expected by the calendar widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barber_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CalendarQuery {
    pub staff: Option<String>,
    pub token: Option<String>,
}
