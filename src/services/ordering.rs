use std::cmp::Ordering;

use crate::models::NormalizedBooking;

/// Upcoming bookings soonest first, then past bookings most recent first,
/// then bookings without a usable time in their original order.
pub fn compare(a: &NormalizedBooking, b: &NormalizedBooking) -> Ordering {
    match (a.time, b.time) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(ta), Some(tb)) => match (a.is_past, b.is_past) {
            (false, true) => Ordering::Less,
            (true, false) => Ordering::Greater,
            (false, false) => ta.cmp(&tb),
            (true, true) => tb.cmp(&ta),
        },
    }
}

/// `sort_by` is stable, which keeps ties in insertion order.
pub fn sort(bookings: &mut [&NormalizedBooking]) {
    bookings.sort_by(|a, b| compare(a, b));
}
