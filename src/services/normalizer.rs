use chrono::{DateTime, NaiveDateTime, Utc};

use crate::models::{Booking, NormalizedBooking};

/// Offset-less layouts the backend has been seen to emit. Read as UTC.
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parses a booking timestamp. Never fails loudly: anything that is not a
/// real date yields `None`.
pub fn parse_booking_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

pub fn normalize(booking: Booking, now: DateTime<Utc>) -> NormalizedBooking {
    let time = booking.date_time.as_deref().and_then(parse_booking_time);
    let is_past = time.is_some_and(|t| t < now);
    NormalizedBooking {
        booking,
        time,
        is_past,
    }
}

pub fn normalize_all(bookings: Vec<Booking>, now: DateTime<Utc>) -> Vec<NormalizedBooking> {
    let normalized: Vec<_> = bookings.into_iter().map(|b| normalize(b, now)).collect();

    let invalid = normalized.iter().filter(|b| !b.time_valid()).count();
    if invalid > 0 {
        tracing::warn!(invalid, total = normalized.len(), "bookings with unparseable time");
    }

    normalized
}

/// Recomputes `is_past` against a later `now` without re-parsing.
pub fn reevaluate(bookings: &[NormalizedBooking], now: DateTime<Utc>) -> Vec<NormalizedBooking> {
    bookings
        .iter()
        .map(|b| NormalizedBooking {
            is_past: b.time.is_some_and(|t| t < now),
            ..b.clone()
        })
        .collect()
}
