use serde::{Deserialize, Serialize};

/// Display category of a booking status. `Occurred` does not exist in the
/// backend: it is a booked appointment whose time has elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Scheduled,
    Occurred,
    Confirmed,
    Completed,
    Canceled,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusBadge {
    pub kind: StatusKind,
    pub label: String,
    pub color_class: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct StatusChangeRequest {
    pub status: String,
}
