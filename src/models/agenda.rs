use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

use super::StatusBadge;

/// Weekdays indexed the way the admin UI sends them: 0 = Sunday.
const SUNDAY_FIRST: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StaffFilter {
    #[default]
    All,
    Only(String),
}

impl StaffFilter {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") | Some("all") => StaffFilter::All,
            Some(id) => StaffFilter::Only(id.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DayFilter {
    #[default]
    All,
    Only(Weekday),
}

impl DayFilter {
    pub fn parse(raw: Option<&str>) -> Result<Self, AppError> {
        let raw = match raw.map(str::trim) {
            None | Some("") | Some("all") => return Ok(DayFilter::All),
            Some(raw) => raw,
        };
        raw.parse::<usize>()
            .ok()
            .and_then(|idx| SUNDAY_FIRST.get(idx).copied())
            .map(DayFilter::Only)
            .ok_or_else(|| {
                AppError::Validation(format!("day must be 0-6 (0 = Sunday) or \"all\", got {raw}"))
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgendaFilter {
    pub staff: StaffFilter,
    pub day: DayFilter,
    pub include_past: bool,
}

impl Default for AgendaFilter {
    fn default() -> Self {
        Self {
            staff: StaffFilter::All,
            day: DayFilter::All,
            include_past: true,
        }
    }
}

impl AgendaFilter {
    /// The admin "see everything" view. Only this view keeps bookings whose
    /// time could not be parsed.
    pub fn is_unfiltered(&self) -> bool {
        self.staff == StaffFilter::All && self.day == DayFilter::All && self.include_past
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AgendaQuery {
    pub staff: Option<String>,
    pub day: Option<String>,
    pub include_past: Option<bool>,
}

impl AgendaQuery {
    pub fn into_filter(self) -> Result<AgendaFilter, AppError> {
        Ok(AgendaFilter {
            staff: StaffFilter::parse(self.staff.as_deref()),
            day: DayFilter::parse(self.day.as_deref())?,
            include_past: self.include_past.unwrap_or(true),
        })
    }
}

/// One line of the tabular agenda.
#[derive(Debug, Clone, Serialize)]
pub struct AgendaRow {
    pub id: String,
    pub date_time: String,
    pub time_valid: bool,
    pub is_past: bool,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub barber_id: Option<String>,
    pub barber_name: String,
    pub service_name: String,
    pub price: Option<f64>,
    pub status: StatusBadge,
    pub color: String,
    pub notes: Option<String>,
    /// A status change for this booking is awaiting the backend.
    pub pending: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgendaView {
    pub state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<String>,
    pub total: usize,
    pub rows: Vec<AgendaRow>,
}
