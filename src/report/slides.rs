//! Table slides shown in the dashboard and the HTML report.

use crate::data::record::{
    ACTUAL_PRODUCTION, ACTUAL_QUALITY, DATE, PLANNED_PRODUCTION, PLANNED_QUALITY,
    PRODUCTION_DEVIATION, QUALITY_DEVIATION,
};
use crate::data::Record;
use crate::stats::Summary;
use serde::Serialize;

pub const NO_DATA_TITLE: &str = "No Data";
pub const NO_DATA_MESSAGE: &str = "No data available in the selected range.";

/// One page of the table carousel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSlide {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Shown instead of a table when set.
    pub message: Option<String>,
}

impl TableSlide {
    fn table(title: &str, headers: &[&str], rows: Vec<Vec<String>>) -> Self {
        Self {
            title: title.to_string(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows,
            message: None,
        }
    }

    pub fn no_data() -> Self {
        Self {
            title: NO_DATA_TITLE.to_string(),
            headers: Vec::new(),
            rows: Vec::new(),
            message: Some(NO_DATA_MESSAGE.to_string()),
        }
    }
}

/// Build the four slides from newest-first records.
pub fn build_table_slides(
    records: &[Record],
    summary: Option<&Summary>,
    preview_rows: usize,
) -> Vec<TableSlide> {
    let Some(summary) = summary else {
        return vec![TableSlide::no_data()];
    };
    let preview = &records[..records.len().min(preview_rows)];

    let overview = preview
        .iter()
        .map(|r| {
            vec![
                r.date_string(),
                format_value(r.planned_production),
                format_value(r.actual_production),
                format_value(r.planned_quality),
                format_value(r.actual_quality),
            ]
        })
        .collect();

    let production = preview
        .iter()
        .map(|r| {
            vec![
                r.date_string(),
                format_value(r.planned_production),
                format_value(r.actual_production),
                format_value(round2(r.production_deviation)),
            ]
        })
        .collect();

    let quality = preview
        .iter()
        .map(|r| {
            vec![
                r.date_string(),
                format_value(r.planned_quality),
                format_value(r.actual_quality),
                format_value(round2(r.quality_deviation)),
            ]
        })
        .collect();

    let metrics = [
        ("Total Planned Production", summary.total_planned_production),
        ("Total Actual Production", summary.total_actual_production),
        ("Avg Production Deviation", summary.mean_production_deviation),
        ("Total Planned Quality", summary.total_planned_quality),
        ("Total Actual Quality", summary.total_actual_quality),
        ("Avg Quality Deviation", summary.mean_quality_deviation),
    ]
    .iter()
    .map(|(name, value)| vec![name.to_string(), format!("{:.2}", value)])
    .collect();

    vec![
        TableSlide::table(
            "Overview",
            &[DATE, PLANNED_PRODUCTION, ACTUAL_PRODUCTION, PLANNED_QUALITY, ACTUAL_QUALITY],
            overview,
        ),
        TableSlide::table(
            "Production Analysis",
            &[DATE, PLANNED_PRODUCTION, ACTUAL_PRODUCTION, PRODUCTION_DEVIATION],
            production,
        ),
        TableSlide::table(
            "Quality Analysis",
            &[DATE, PLANNED_QUALITY, ACTUAL_QUALITY, QUALITY_DEVIATION],
            quality,
        ),
        TableSlide::table("Summary Statistics", &["Metric", "Value"], metrics),
    ]
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Whole numbers keep one decimal ("12.0"); others print as-is.
pub fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::StatsCalculator;
    use chrono::NaiveDate;

    fn records(n: u32) -> Vec<Record> {
        (1..=n)
            .rev()
            .map(|d| {
                Record::new(
                    NaiveDate::from_ymd_opt(2024, 1, d).unwrap(),
                    10.0,
                    10.0 + 1.0 / 3.0,
                    300.0,
                    299.5,
                )
            })
            .collect()
    }

    #[test]
    fn test_four_slides_capped_at_preview_rows() {
        let records = records(20);
        let summary = StatsCalculator::summarize(&records);
        let slides = build_table_slides(&records, summary.as_ref(), 15);

        let titles: Vec<_> = slides.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Overview", "Production Analysis", "Quality Analysis", "Summary Statistics"]
        );
        assert_eq!(slides[0].rows.len(), 15);
        assert_eq!(slides[0].headers.len(), 5);
        assert_eq!(slides[0].rows[0][0], "2024-01-20");
        assert_eq!(slides[3].rows.len(), 6);
    }

    #[test]
    fn test_deviation_columns_rounded() {
        let records = records(1);
        let summary = StatsCalculator::summarize(&records);
        let slides = build_table_slides(&records, summary.as_ref(), 15);

        assert_eq!(slides[1].rows[0][3], "0.33");
        assert_eq!(slides[2].rows[0][3], "-0.5");
        assert_eq!(slides[3].rows[0], vec!["Total Planned Production", "10.00"]);
        assert_eq!(slides[3].rows[2], vec!["Avg Production Deviation", "0.33"]);
    }

    #[test]
    fn test_empty_range_single_no_data_slide() {
        let slides = build_table_slides(&[], None, 15);
        assert_eq!(slides, vec![TableSlide::no_data()]);
        assert_eq!(slides[0].message.as_deref(), Some(NO_DATA_MESSAGE));
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(12.0), "12.0");
        assert_eq!(format_value(-2.0), "-2.0");
        assert_eq!(format_value(0.25), "0.25");
    }
}
