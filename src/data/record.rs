//! Record Module
//! Canonical row type, per-field parsing and the missing-value policy.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Canonical column names.
pub const DATE: &str = "Date";
pub const PLANNED_PRODUCTION: &str = "Planned_Production";
pub const ACTUAL_PRODUCTION: &str = "Actual_Production";
pub const PLANNED_QUALITY: &str = "Planned_Quality";
pub const ACTUAL_QUALITY: &str = "Actual_Quality";
pub const PRODUCTION_DEVIATION: &str = "Production_Deviation";
pub const QUALITY_DEVIATION: &str = "Quality_Deviation";

/// The four numeric base columns, in table order.
pub const NUMERIC_COLUMNS: [&str; 4] = [
    PLANNED_PRODUCTION,
    ACTUAL_PRODUCTION,
    PLANNED_QUALITY,
    ACTUAL_QUALITY,
];

const DATETIME_FORMATS: [&str; 8] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

/// One normalized row with its derived deviations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Planned_Production")]
    pub planned_production: f64,
    #[serde(rename = "Actual_Production")]
    pub actual_production: f64,
    #[serde(rename = "Planned_Quality")]
    pub planned_quality: f64,
    #[serde(rename = "Actual_Quality")]
    pub actual_quality: f64,
    #[serde(rename = "Production_Deviation")]
    pub production_deviation: f64,
    #[serde(rename = "Quality_Deviation")]
    pub quality_deviation: f64,
}

impl Record {
    /// Build a record from its base fields; deviations are derived here.
    pub fn new(
        date: NaiveDate,
        planned_production: f64,
        actual_production: f64,
        planned_quality: f64,
        actual_quality: f64,
    ) -> Self {
        let mut record = Self {
            date,
            planned_production,
            actual_production,
            planned_quality,
            actual_quality,
            production_deviation: 0.0,
            quality_deviation: 0.0,
        };
        record.derive_deviations();
        record
    }

    /// Recompute both deviation fields from the base fields.
    pub fn derive_deviations(&mut self) {
        self.production_deviation = self.actual_production - self.planned_production;
        self.quality_deviation = self.actual_quality - self.planned_quality;
    }

    /// Date in `YYYY-MM-DD` form.
    pub fn date_string(&self) -> String {
        format_date(self.date)
    }
}

/// A row as parsed: every base field may be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub date: Option<NaiveDate>,
    pub planned_production: Option<f64>,
    pub actual_production: Option<f64>,
    pub planned_quality: Option<f64>,
    pub actual_quality: Option<f64>,
}

impl RawRecord {
    /// Number of base fields that failed to parse.
    pub fn missing_fields(&self) -> usize {
        let numeric = [
            self.planned_production,
            self.actual_production,
            self.planned_quality,
            self.actual_quality,
        ];
        usize::from(self.date.is_none()) + numeric.iter().filter(|v| v.is_none()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields() == 0
    }
}

/// What to do with a row that has missing fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingValuePolicy {
    /// Drop the row if any base field is missing.
    #[default]
    Drop,
    /// Use 0.0 for missing numeric fields. A missing date still drops the row.
    ZeroFill,
}

impl MissingValuePolicy {
    /// Decide the fate of a raw row: `Some(record)` keeps it, `None` drops it.
    pub fn apply(self, raw: RawRecord) -> Option<Record> {
        let date = raw.date?;
        let field = |value: Option<f64>| match self {
            MissingValuePolicy::Drop => value,
            MissingValuePolicy::ZeroFill => Some(value.unwrap_or(0.0)),
        };

        Some(Record::new(
            date,
            field(raw.planned_production)?,
            field(raw.actual_production)?,
            field(raw.planned_quality)?,
            field(raw.actual_quality)?,
        ))
    }
}

/// Parse a calendar date, discarding any time of day or offset.
///
/// Returns `None` for anything unrecognised; callers treat that as a missing value.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local().date());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        })
}

/// Finite values only; NaN and infinities count as missing.
pub fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("2024-03-05"), Some(day(2024, 3, 5)));
        assert_eq!(parse_date(" 2024-03-05 "), Some(day(2024, 3, 5)));
        assert_eq!(parse_date("2024-03-05 13:45:00"), Some(day(2024, 3, 5)));
        assert_eq!(parse_date("2024-03-05T23:59:59"), Some(day(2024, 3, 5)));
        assert_eq!(parse_date("2024-03-05 08:00:00.250"), Some(day(2024, 3, 5)));
        assert_eq!(parse_date("2024/03/05"), Some(day(2024, 3, 5)));
        assert_eq!(parse_date("03/05/2024"), Some(day(2024, 3, 5)));
        assert_eq!(parse_date("05.03.2024"), Some(day(2024, 3, 5)));
    }

    #[test]
    fn test_parse_date_keeps_local_wall_clock_date() {
        assert_eq!(parse_date("2024-03-05T23:30:00+05:00"), Some(day(2024, 3, 5)));
        assert_eq!(parse_date("2024-03-05T00:30:00-08:00"), Some(day(2024, 3, 5)));
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date("2024-13-40"), None);
    }

    #[test]
    fn test_record_new_derives_deviations() {
        let r = Record::new(day(2024, 1, 1), 10.0, 12.0, 300.0, 290.0);
        assert_eq!(r.production_deviation, 2.0);
        assert_eq!(r.quality_deviation, -10.0);
        assert_eq!(r.date_string(), "2024-01-01");
    }

    #[test]
    fn test_drop_policy_requires_every_field() {
        let complete = RawRecord {
            date: Some(day(2024, 1, 1)),
            planned_production: Some(1.0),
            actual_production: Some(2.0),
            planned_quality: Some(3.0),
            actual_quality: Some(4.0),
        };
        assert!(complete.is_complete());
        assert!(MissingValuePolicy::Drop.apply(complete.clone()).is_some());

        let missing = RawRecord {
            actual_quality: None,
            ..complete
        };
        assert_eq!(missing.missing_fields(), 1);
        assert!(MissingValuePolicy::Drop.apply(missing).is_none());
    }

    #[test]
    fn test_zero_fill_policy() {
        let raw = RawRecord {
            date: Some(day(2024, 1, 1)),
            planned_production: Some(5.0),
            ..Default::default()
        };
        let r = MissingValuePolicy::ZeroFill.apply(raw).unwrap();
        assert_eq!(r.actual_production, 0.0);
        assert_eq!(r.production_deviation, -5.0);

        let no_date = RawRecord {
            planned_production: Some(5.0),
            ..Default::default()
        };
        assert!(MissingValuePolicy::ZeroFill.apply(no_date).is_none());
    }

    #[test]
    fn test_finite_filters_nan() {
        assert_eq!(finite(Some(f64::NAN)), None);
        assert_eq!(finite(Some(f64::INFINITY)), None);
        assert_eq!(finite(Some(1.5)), Some(1.5));
    }

    #[test]
    fn test_record_serializes_canonical_names() {
        let r = Record::new(day(2024, 1, 2), 1.0, 2.0, 3.0, 4.0);
        let json = serde_json::to_string(&r).unwrap();
        assert!(json.contains("\"Date\":\"2024-01-02\""));
        assert!(json.contains("\"Production_Deviation\":1.0"));
    }
}
