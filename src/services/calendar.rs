use chrono::{DateTime, Duration, Utc};

use crate::models::{CalendarEvent, NormalizedBooking, StaffFilter};
use crate::services::colors::StaffColors;
use crate::services::filter::matches_staff;

pub const DEFAULT_DURATION_MINUTES: i64 = 60;

const ICS_TIME: &str = "%Y%m%dT%H%M%SZ";

/// Returns `None` for bookings that cannot be drawn: no customer, no
/// service, or no usable start time.
pub fn project(booking: &NormalizedBooking, colors: &StaffColors) -> Option<CalendarEvent> {
    let start = booking.time?;
    let customer = booking.booking.customer.as_ref()?;
    let service = booking.booking.service.as_ref()?;

    let minutes = service
        .duration
        .filter(|d| *d > 0)
        .unwrap_or(DEFAULT_DURATION_MINUTES);

    Some(CalendarEvent {
        id: booking.booking.id.clone(),
        title: format!("{} - {}", customer.name, service.name),
        start,
        end: start + Duration::minutes(minutes),
        color: colors.color_for(booking.staff_id()).to_string(),
        barber_id: booking.staff_id().map(str::to_string),
        notes: booking.booking.notes.clone(),
    })
}

pub fn project_all(
    bookings: &[NormalizedBooking],
    colors: &StaffColors,
    staff: &StaffFilter,
) -> Vec<CalendarEvent> {
    bookings
        .iter()
        .filter(|b| matches_staff(b, staff))
        .filter_map(|b| project(b, colors))
        .collect()
}

pub fn generate_ics(events: &[CalendarEvent], business_name: &str, stamp: DateTime<Utc>) -> String {
    let dtstamp = stamp.format(ICS_TIME).to_string();

    let mut out = String::from(
        "BEGIN:VCALENDAR\r\n\
         VERSION:2.0\r\n\
         PRODID:-//Barberdesk//Agenda//EN\r\n",
    );

    for event in events {
        let uid = format!("{}@barberdesk", event.id);
        let summary = escape_text(&event.title);
        let description = escape_text(event.notes.as_deref().unwrap_or(business_name));

        out.push_str(&format!(
            "BEGIN:VEVENT\r\n\
             UID:{uid}\r\n\
             DTSTAMP:{dtstamp}\r\n\
             DTSTART:{}\r\n\
             DTEND:{}\r\n\
             SUMMARY:{summary}\r\n\
             DESCRIPTION:{description}\r\n\
             END:VEVENT\r\n",
            event.start.format(ICS_TIME),
            event.end.format(ICS_TIME),
        ));
    }

    out.push_str("END:VCALENDAR\r\n");
    out
}

// RFC 5545 §3.3.11
fn escape_text(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace('\n', "\\n")
        .replace('\r', "")
}
