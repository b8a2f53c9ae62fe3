use crate::models::{BookingStatus, StatusBadge, StatusKind};

pub const OCCURRED_LABEL: &str = "Occurred/Pending confirmation";

/// The one place a booking status is turned into a badge. Every view that
/// shows a status goes through here.
pub fn present(status: &BookingStatus, is_past: bool) -> StatusBadge {
    let (kind, label, color_class) = match status {
        BookingStatus::Booked if is_past => (StatusKind::Occurred, OCCURRED_LABEL.to_string(), "warning"),
        BookingStatus::Booked => (StatusKind::Scheduled, "Scheduled".to_string(), "info"),
        BookingStatus::Confirmed => (StatusKind::Confirmed, "Confirmed".to_string(), "primary"),
        BookingStatus::Completed => (StatusKind::Completed, "Completed".to_string(), "success"),
        BookingStatus::Canceled => (StatusKind::Canceled, "Canceled".to_string(), "danger"),
        BookingStatus::Other(raw) => (StatusKind::Unknown, capitalize(raw), "default"),
    };

    StatusBadge {
        kind,
        label,
        color_class,
    }
}

fn capitalize(s: &str) -> String {
    let mut c = s.chars();
    match c.next() {
        None => String::new(),
        Some(f) => f.to_uppercase().collect::<String>() + c.as_str(),
    }
}
