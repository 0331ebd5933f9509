use chrono::{DateTime, NaiveDate, Utc};
use std::str::FromStr;

use crate::error::{ApiError, ErrorCode};

/// Parse an optional enum-valued query filter; an unknown value is a 400
pub fn enum_param<E: FromStr<Err = String>>(
    field: &str,
    raw: Option<&str>,
    code: ErrorCode,
) -> Result<Option<E>, ApiError> {
    match non_empty(raw) {
        None => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|expected| ApiError::bad_request(format!("Invalid {}: {}", field, expected), code)),
    }
}

/// Parse an optional numeric id query filter
pub fn id_param(field: &str, raw: Option<&str>, code: ErrorCode) -> Result<Option<u64>, ApiError> {
    match non_empty(raw) {
        None => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ApiError::bad_request(format!("Invalid {}", field), code)),
    }
}

/// Parse a numeric path id, e.g. `/api/projects/:id`
pub fn path_id(raw: &str, message: &str, code: ErrorCode) -> Result<u64, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::bad_request(message, code))
}

/// Treat `?status=` the same as an absent parameter
pub fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

/// Inclusive date window from `startDate` / `endDate` query parameters.
///
/// `endDate` covers the whole of its day, through 23:59:59.999 UTC.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn from_params(start: Option<&str>, end: Option<&str>) -> Result<Self, ApiError> {
        let start = non_empty(start)
            .map(|raw| parse_instant(raw).ok_or_else(|| invalid_date("startDate", raw)))
            .transpose()?;

        let end = non_empty(end)
            .map(|raw| {
                parse_instant(raw)
                    .and_then(end_of_day)
                    .ok_or_else(|| invalid_date("endDate", raw))
            })
            .transpose()?;

        Ok(Self { start, end })
    }

    pub fn contains(&self, at: &DateTime<Utc>) -> bool {
        self.start.map_or(true, |start| *at >= start) && self.end.map_or(true, |end| *at <= end)
    }
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates (midnight UTC)
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn end_of_day(at: DateTime<Utc>) -> Option<DateTime<Utc>> {
    at.date_naive()
        .and_hms_milli_opt(23, 59, 59, 999)
        .map(|dt| dt.and_utc())
}

fn invalid_date(field: &str, raw: &str) -> ApiError {
    ApiError::bad_request(format!("Invalid {}: '{}'", field, raw), ErrorCode::InvalidDate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StationStatus;
    use chrono::TimeZone;

    #[test]
    fn end_date_covers_the_whole_day() {
        let range = DateRange::from_params(Some("2024-01-02"), Some("2024-01-03")).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 1, 3, 23, 59, 59).unwrap();
        let next_day = Utc.with_ymd_and_hms(2024, 1, 4, 0, 0, 0).unwrap();
        let before = Utc.with_ymd_and_hms(2024, 1, 1, 23, 0, 0).unwrap();
        assert!(range.contains(&late));
        assert!(!range.contains(&next_day));
        assert!(!range.contains(&before));
    }

    #[test]
    fn accepts_rfc3339_start() {
        let range = DateRange::from_params(Some("2024-01-02T12:00:00Z"), None).unwrap();
        assert!(!range.contains(&Utc.with_ymd_and_hms(2024, 1, 2, 11, 59, 59).unwrap()));
        assert!(range.contains(&Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()));
    }

    #[test]
    fn rejects_malformed_dates() {
        let err = DateRange::from_params(Some("yesterday"), None).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidDate);
    }

    #[test]
    fn empty_params_are_ignored() {
        assert_eq!(DateRange::from_params(Some(""), Some("  ")).unwrap(), DateRange::default());
        assert_eq!(id_param("userId", Some(""), ErrorCode::InvalidUserId).unwrap(), None);
    }

    #[test]
    fn enum_param_reports_expected_values() {
        let status: Option<StationStatus> =
            enum_param("status", Some("maintenance"), ErrorCode::InvalidStatus).unwrap();
        assert_eq!(status, Some(StationStatus::Maintenance));

        let err = enum_param::<StationStatus>("status", Some("broken"), ErrorCode::InvalidStatus).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidStatus);
        assert!(err.message().contains("active, inactive, maintenance"));
    }
}
