use chrono::Datelike;

use crate::models::{AgendaFilter, DayFilter, NormalizedBooking, StaffFilter};

pub fn matches_staff(booking: &NormalizedBooking, staff: &StaffFilter) -> bool {
    match staff {
        StaffFilter::All => true,
        StaffFilter::Only(id) => booking.staff_id() == Some(id.as_str()),
    }
}

/// Weekday is taken in UTC so the result does not depend on where the
/// dashboard is opened.
pub fn matches_day(booking: &NormalizedBooking, day: DayFilter) -> bool {
    match day {
        DayFilter::All => true,
        DayFilter::Only(weekday) => booking.time.is_some_and(|t| t.weekday() == weekday),
    }
}

pub fn apply<'a>(
    bookings: &'a [NormalizedBooking],
    filter: &AgendaFilter,
) -> Vec<&'a NormalizedBooking> {
    let keep_invalid = filter.is_unfiltered();

    bookings
        .iter()
        .filter(|b| keep_invalid || b.time_valid())
        .filter(|b| matches_staff(b, &filter.staff))
        .filter(|b| matches_day(b, filter.day))
        .filter(|b| filter.include_past || !b.is_past)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Booking, BookingStatus, StaffRef};
    use crate::services::normalizer::normalize;
    use chrono::{TimeZone, Utc, Weekday};

    fn now() -> chrono::DateTime<Utc> {
        // Wednesday
        Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap()
    }

    fn booking(id: &str, time: &str, staff: Option<&str>) -> NormalizedBooking {
        normalize(
            Booking {
                id: id.to_string(),
                date_time: Some(time.to_string()),
                status: BookingStatus::Booked,
                customer: None,
                barber: staff.map(|s| StaffRef {
                    id: s.to_string(),
                    name: String::new(),
                }),
                service: None,
                notes: None,
            },
            now(),
        )
    }

    fn ids(result: &[&NormalizedBooking]) -> Vec<String> {
        result.iter().map(|b| b.booking.id.clone()).collect()
    }

    fn sample() -> Vec<NormalizedBooking> {
        vec![
            booking("mon-past", "2024-01-08T10:00:00Z", Some("s1")),
            booking("thu-future", "2024-01-11T10:00:00Z", Some("s2")),
            booking("broken", "not-a-date", Some("s1")),
            booking("mon-future", "2024-01-15T10:00:00Z", Some("s1")),
            booking("nobody", "2024-01-12T10:00:00Z", None),
        ]
    }

    #[test]
    fn test_unfiltered_keeps_everything() {
        let all = sample();
        let result = apply(&all, &AgendaFilter::default());
        assert_eq!(result.len(), 5);
    }

    #[test]
    fn test_staff_filter_drops_invalid_time() {
        let all = sample();
        let filter = AgendaFilter {
            staff: StaffFilter::Only("s1".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&apply(&all, &filter)), vec!["mon-past", "mon-future"]);
    }

    #[test]
    fn test_day_filter() {
        let all = sample();
        let filter = AgendaFilter {
            day: DayFilter::Only(Weekday::Mon),
            ..Default::default()
        };
        assert_eq!(ids(&apply(&all, &filter)), vec!["mon-past", "mon-future"]);
    }

    #[test]
    fn test_exclude_past() {
        let all = sample();
        let filter = AgendaFilter {
            include_past: false,
            ..Default::default()
        };
        assert_eq!(
            ids(&apply(&all, &filter)),
            vec!["thu-future", "mon-future", "nobody"]
        );
    }

    #[test]
    fn test_combined_filters() {
        let all = sample();
        let filter = AgendaFilter {
            staff: StaffFilter::Only("s1".to_string()),
            day: DayFilter::Only(Weekday::Mon),
            include_past: false,
        };
        assert_eq!(ids(&apply(&all, &filter)), vec!["mon-future"]);
    }

    #[test]
    fn test_weekday_is_utc() {
        // 23:30 on Sunday in UTC-3 is already Monday in UTC
        let b = booking("late", "2024-01-07T23:30:00-03:00", None);
        assert!(matches_day(&b, DayFilter::Only(Weekday::Mon)));
        assert!(!matches_day(&b, DayFilter::Only(Weekday::Sun)));
    }

    #[test]
    fn test_unknown_staff_yields_empty() {
        let all = sample();
        let filter = AgendaFilter {
            staff: StaffFilter::Only("ghost".to_string()),
            ..Default::default()
        };
        assert!(apply(&all, &filter).is_empty());
    }
}
