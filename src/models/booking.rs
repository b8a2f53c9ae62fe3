use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::de;

/// A booking as the backend sends it. Every relation is nullable because the
/// backend keeps bookings whose customer, barber or service was deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(deserialize_with = "de::string_or_number")]
    pub id: String,
    #[serde(default, alias = "time", deserialize_with = "de::lenient_string")]
    pub date_time: Option<String>,
    #[serde(default)]
    pub status: BookingStatus,
    #[serde(default)]
    pub customer: Option<CustomerRef>,
    #[serde(default, alias = "staff")]
    pub barber: Option<StaffRef>,
    #[serde(default)]
    pub service: Option<ServiceRef>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerRef {
    #[serde(deserialize_with = "de::string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffRef {
    #[serde(deserialize_with = "de::string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRef {
    #[serde(deserialize_with = "de::string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default, alias = "durationMinutes")]
    pub duration: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BookingStatus {
    Booked,
    Confirmed,
    Completed,
    Canceled,
    /// Anything the backend sends that is not part of the closed set,
    /// e.g. `no-show`. Kept verbatim.
    Other(String),
}

impl BookingStatus {
    pub fn as_str(&self) -> &str {
        match self {
            BookingStatus::Booked => "booked",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::Canceled => "canceled",
            BookingStatus::Other(raw) => raw,
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "booked" => BookingStatus::Booked,
            "confirmed" => BookingStatus::Confirmed,
            "completed" => BookingStatus::Completed,
            "canceled" | "cancelled" => BookingStatus::Canceled,
            other => BookingStatus::Other(other.to_string()),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, BookingStatus::Other(_))
    }
}

impl Default for BookingStatus {
    fn default() -> Self {
        BookingStatus::Other("unknown".to_string())
    }
}

impl From<String> for BookingStatus {
    fn from(s: String) -> Self {
        BookingStatus::parse(&s)
    }
}

impl From<BookingStatus> for String {
    fn from(status: BookingStatus) -> Self {
        status.as_str().to_string()
    }
}

/// A booking tagged with the flags derived at fetch time.
#[derive(Debug, Clone)]
pub struct NormalizedBooking {
    pub booking: Booking,
    pub time: Option<DateTime<Utc>>,
    pub is_past: bool,
}

impl NormalizedBooking {
    pub fn time_valid(&self) -> bool {
        self.time.is_some()
    }

    pub fn staff_id(&self) -> Option<&str> {
        self.booking.barber.as_ref().map(|b| b.id.as_str())
    }
}
