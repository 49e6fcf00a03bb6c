//! Data Processor Module
//! Deviation derivation, date-range filtering and ordering of records.

use crate::data::record::{parse_date, Record};
use chrono::NaiveDate;
use tracing::warn;

/// Inclusive calendar-date interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Parse both boundaries; `None` if either one is not a date.
    pub fn parse(start: &str, end: &str) -> Option<Self> {
        Some(Self::new(parse_date(start)?, parse_date(end)?))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Stateless record transformations.
pub struct DataProcessor;

impl DataProcessor {
    /// Compute both deviation fields for every record.
    pub fn derive_deviations(mut records: Vec<Record>) -> Vec<Record> {
        records.iter_mut().for_each(Record::derive_deviations);
        records
    }

    /// Earliest and latest date in the dataset.
    pub fn date_bounds(records: &[Record]) -> Option<(NaiveDate, NaiveDate)> {
        let first = records.first()?.date;
        Some(records.iter().fold((first, first), |(lo, hi), r| {
            (lo.min(r.date), hi.max(r.date))
        }))
    }

    /// Records inside `range`, in their original order.
    pub fn filter_between(records: &[Record], range: DateRange) -> Vec<Record> {
        records
            .iter()
            .filter(|r| range.contains(r.date))
            .cloned()
            .collect()
    }

    /// Filter by textual boundaries.
    ///
    /// An unparseable boundary turns the filter into a no-op; the returned flag
    /// is `false` in that case.
    pub fn filter_by_range(records: &[Record], start: &str, end: &str) -> (Vec<Record>, bool) {
        match DateRange::parse(start, end) {
            Some(range) => (Self::filter_between(records, range), true),
            None => {
                warn!(start, end, "invalid date range, keeping full dataset");
                (records.to_vec(), false)
            }
        }
    }

    /// Order by date descending; rows sharing a date keep their file order.
    pub fn sort_newest_first(mut records: Vec<Record>) -> Vec<Record> {
        records.sort_by(|a, b| b.date.cmp(&a.date));
        records
    }
}
