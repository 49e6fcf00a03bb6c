//! Dashboard service
//!
//! One request = load → derive → filter → summarize. Nothing is cached
//! between requests; each call rereads the data file.

use crate::config::DashboardConfig;
use crate::data::record::format_date;
use crate::data::{DataLoader, DataProcessor, LoadReport, LoaderError, Record};
use crate::report::{build_table_slides, TableSlide};
use crate::stats::{StatsCalculator, Summary};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Date boundaries supplied by the caller, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeRequest {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl RangeRequest {
    pub fn new(start_date: Option<String>, end_date: Option<String>) -> Self {
        Self {
            start_date,
            end_date,
        }
    }

    /// No boundaries: the full dataset.
    pub fn full() -> Self {
        Self::default()
    }
}

/// Everything the presenters need for one response.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub source: PathBuf,
    pub load: LoadReport,
    pub extra_columns: Vec<String>,
    /// Earliest date in the full dataset, `""` when empty.
    pub min_date: String,
    /// Latest date in the full dataset, `""` when empty.
    pub max_date: String,
    /// Boundaries as applied (or as typed, when they were ignored).
    pub start_date: String,
    pub end_date: String,
    /// False when a boundary did not parse and the full range was kept.
    pub range_applied: bool,
    /// Filtered records, newest first.
    pub records: Vec<Record>,
    pub summary: Option<Summary>,
    pub recommendations: Vec<String>,
    pub table_slides: Vec<TableSlide>,
}

impl DashboardView {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Explicitly constructed request handler; holds configuration only.
#[derive(Debug, Clone)]
pub struct DashboardService {
    config: DashboardConfig,
}

impl DashboardService {
    pub fn new(config: DashboardConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn data_path(&self) -> &Path {
        &self.config.data_path
    }

    pub fn set_data_path(&mut self, path: PathBuf) {
        self.config.data_path = path;
    }

    /// Run one request through the pipeline.
    pub fn handle(&self, request: &RangeRequest) -> Result<DashboardView, LoaderError> {
        let loader = DataLoader::new(self.config.columns.clone(), self.config.missing_values);
        let loaded = loader.load(&self.config.data_path)?;
        let records = DataProcessor::sort_newest_first(DataProcessor::derive_deviations(
            loaded.records,
        ));

        let (min_date, max_date) = DataProcessor::date_bounds(&records)
            .map(|(lo, hi)| (format_date(lo), format_date(hi)))
            .unwrap_or_default();

        let start_date = request.start_date.clone().unwrap_or_else(|| min_date.clone());
        let end_date = request.end_date.clone().unwrap_or_else(|| max_date.clone());
        // No dated rows: nothing to filter, and blank bounds are not a bad request.
        let (filtered, range_applied) = if records.is_empty() {
            (Vec::new(), true)
        } else {
            DataProcessor::filter_by_range(&records, &start_date, &end_date)
        };
        debug!(
            start = %start_date,
            end = %end_date,
            kept = filtered.len(),
            "range filter"
        );

        let summary = StatsCalculator::summarize(&filtered);
        let recommendations = StatsCalculator::recommendations(summary.as_ref());
        let table_slides =
            build_table_slides(&filtered, summary.as_ref(), self.config.preview_rows);

        Ok(DashboardView {
            source: self.config.data_path.clone(),
            load: loaded.report,
            extra_columns: loaded.extra_columns,
            min_date,
            max_date,
            start_date,
            end_date,
            range_applied,
            records: filtered,
            summary,
            recommendations,
            table_slides,
        })
    }
}
