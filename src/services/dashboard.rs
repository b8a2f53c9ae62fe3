use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    #[serde(rename = "startDate")]
    pub start: NaiveDate,
    #[serde(rename = "endDate")]
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangePreset {
    Today,
    Last7Days,
    Last30Days,
    ThisMonth,
}

impl RangePreset {
    pub fn parse(s: &str) -> Result<Self, AppError> {
        match s {
            "today" => Ok(RangePreset::Today),
            "7d" => Ok(RangePreset::Last7Days),
            "30d" => Ok(RangePreset::Last30Days),
            "month" => Ok(RangePreset::ThisMonth),
            other => Err(AppError::Validation(format!(
                "unknown range \"{other}\" (expected today, 7d, 30d or month)"
            ))),
        }
    }

    /// Both ends inclusive, ending today.
    pub fn resolve(self, today: NaiveDate) -> DateRange {
        let start = match self {
            RangePreset::Today => today,
            RangePreset::Last7Days => today - Duration::days(6),
            RangePreset::Last30Days => today - Duration::days(29),
            RangePreset::ThisMonth => today.with_day(1).unwrap_or(today),
        };
        DateRange { start, end: today }
    }
}

pub fn parse_iso_date(field: &str, raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("{field} must be a yyyy-MM-dd date, got \"{raw}\"")))
}

/// An explicit start/end pair wins over a preset; with neither, the
/// dashboard shows today.
pub fn resolve_range(
    preset: Option<&str>,
    start: Option<&str>,
    end: Option<&str>,
    today: NaiveDate,
) -> Result<DateRange, AppError> {
    match (start, end) {
        (Some(start), Some(end)) => {
            let range = DateRange {
                start: parse_iso_date("start_date", start)?,
                end: parse_iso_date("end_date", end)?,
            };
            if range.start > range.end {
                return Err(AppError::Validation(
                    "start_date must not be after end_date".to_string(),
                ));
            }
            Ok(range)
        }
        (Some(_), None) | (None, Some(_)) => Err(AppError::Validation(
            "start_date and end_date must be given together".to_string(),
        )),
        (None, None) => {
            let preset = preset.map(RangePreset::parse).transpose()?;
            Ok(preset.unwrap_or(RangePreset::Today).resolve(today))
        }
    }
}
