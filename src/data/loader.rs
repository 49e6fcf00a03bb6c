//! Spreadsheet Data Loader Module
//! Reads CSV and Excel files into a polars table, maps source columns to
//! canonical names and parses every row into a `Record`.

use crate::data::record::{
    self, finite, parse_date, MissingValuePolicy, RawRecord, Record, ACTUAL_PRODUCTION,
    ACTUAL_QUALITY, DATE, PLANNED_PRODUCTION, PLANNED_QUALITY,
};
use calamine::{open_workbook_auto, Data, Reader};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Data file not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Unsupported file format: {0} (expected .csv, .xlsx, .xlsm, .xls or .ods)")]
    UnsupportedFormat(String),
    #[error("No header row in {0}")]
    NoHeader(PathBuf),
    #[error("Required column missing: {source_name} (mapped to {canonical})")]
    MissingColumn {
        source_name: String,
        canonical: &'static str,
    },
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to process table: {0}")]
    Table(#[from] PolarsError),
    #[error("Failed to load spreadsheet: {0}")]
    SpreadsheetError(#[from] calamine::Error),
}

/// Source column name for each canonical field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnMapping {
    pub date: String,
    pub planned_production: String,
    pub actual_production: String,
    pub planned_quality: String,
    pub actual_quality: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            date: "ClearanceDate".to_string(),
            planned_production: "PlanThickness".to_string(),
            actual_production: "FinalThk".to_string(),
            planned_quality: "Order Yield Strength".to_string(),
            actual_quality: "Yield Strength".to_string(),
        }
    }
}

impl ColumnMapping {
    /// (source, canonical) pairs in table order.
    pub fn pairs(&self) -> [(&str, &'static str); 5] {
        [
            (&self.date, DATE),
            (&self.planned_production, PLANNED_PRODUCTION),
            (&self.actual_production, ACTUAL_PRODUCTION),
            (&self.planned_quality, PLANNED_QUALITY),
            (&self.actual_quality, ACTUAL_QUALITY),
        ]
    }
}

/// Row accounting for a single load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub total_rows: usize,
    pub kept_rows: usize,
    pub dropped_rows: usize,
}

/// Result of loading one file.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub records: Vec<Record>,
    pub report: LoadReport,
    /// Source columns the core does not use.
    pub extra_columns: Vec<String>,
}

/// Supported input formats, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Spreadsheet,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Result<Self, LoaderError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => Ok(SourceFormat::Csv),
            "xlsx" | "xlsm" | "xls" | "ods" => Ok(SourceFormat::Spreadsheet),
            _ => Err(LoaderError::UnsupportedFormat(ext)),
        }
    }
}

/// Loads a production/quality dataset.
pub struct DataLoader {
    mapping: ColumnMapping,
    policy: MissingValuePolicy,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new(ColumnMapping::default(), MissingValuePolicy::default())
    }
}

impl DataLoader {
    pub fn new(mapping: ColumnMapping, policy: MissingValuePolicy) -> Self {
        Self { mapping, policy }
    }

    /// Load a file and return its retained records.
    pub fn load(&self, path: &Path) -> Result<LoadedData, LoaderError> {
        if !path.exists() {
            return Err(LoaderError::FileNotFound(path.to_path_buf()));
        }

        let raw = Self::read_raw_table(path)?;
        debug!(
            path = %path.display(),
            rows = raw.height(),
            columns = raw.width(),
            "raw table read"
        );

        let table = self.normalize(raw)?;
        let extra_columns = table
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .filter(|name| !self.is_canonical(name))
            .collect();

        let raw_records = Self::extract_raw_records(&table)?;
        let total_rows = raw_records.len();
        let records: Vec<Record> = raw_records
            .into_iter()
            .filter_map(|raw| self.policy.apply(raw))
            .collect();

        let report = LoadReport {
            total_rows,
            kept_rows: records.len(),
            dropped_rows: total_rows - records.len(),
        };
        info!(
            path = %path.display(),
            total = report.total_rows,
            kept = report.kept_rows,
            dropped = report.dropped_rows,
            "dataset loaded"
        );

        Ok(LoadedData {
            records,
            report,
            extra_columns,
        })
    }

    /// Read a file into a table of text columns, whatever its format.
    pub fn read_raw_table(path: &Path) -> Result<DataFrame, LoaderError> {
        match SourceFormat::from_path(path)? {
            SourceFormat::Csv => Self::read_csv(path),
            SourceFormat::Spreadsheet => Self::read_spreadsheet(path),
        }
    }

    fn read_csv(path: &Path) -> Result<DataFrame, LoaderError> {
        // An empty file has no header to infer from.
        if std::fs::metadata(path)?.len() == 0 {
            return Err(LoaderError::NoHeader(path.to_path_buf()));
        }

        // Schema length 0 reads every column as text; typing happens in extract_raw_records.
        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .with_ignore_errors(true)
            .with_truncate_ragged_lines(true)
            .finish()?
            .collect()?;

        if df.width() == 0 {
            return Err(LoaderError::NoHeader(path.to_path_buf()));
        }
        Ok(df)
    }

    fn read_spreadsheet(path: &Path) -> Result<DataFrame, LoaderError> {
        let mut workbook = open_workbook_auto(path)?;
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| LoaderError::NoHeader(path.to_path_buf()))?;
        let range = workbook.worksheet_range(&sheet_name)?;

        let mut rows = range.rows();
        let header_row = rows
            .next()
            .ok_or_else(|| LoaderError::NoHeader(path.to_path_buf()))?;
        let headers = unique_headers(header_row.iter().map(|c| c.to_string()));

        let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
        for row in rows {
            for (idx, column) in cells.iter_mut().enumerate() {
                column.push(row.get(idx).and_then(cell_text));
            }
        }

        let columns = headers
            .into_iter()
            .zip(cells)
            .map(|(name, values)| Column::new(name.into(), values))
            .collect();
        Ok(DataFrame::new(columns)?)
    }

    /// Rename mapped source columns to canonical names.
    pub fn normalize(&self, mut df: DataFrame) -> Result<DataFrame, LoaderError> {
        let present: HashSet<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        for (source, canonical) in self.mapping.pairs() {
            if present.contains(source) {
                if source != canonical {
                    // A stale canonical column would collide with the rename.
                    if present.contains(canonical) {
                        df.drop_in_place(canonical)?;
                    }
                    df.rename(source, canonical.into())?;
                }
            } else if !present.contains(canonical) {
                return Err(LoaderError::MissingColumn {
                    source_name: source.to_string(),
                    canonical,
                });
            }
        }

        // Rebuild so the cached schema reflects the renamed columns.
        Ok(DataFrame::new(df.take_columns())?)
    }

    /// Parse every canonical field into an optional value.
    fn extract_raw_records(df: &DataFrame) -> Result<Vec<RawRecord>, LoaderError> {
        let dates = df.column(DATE)?.cast(&DataType::String)?;
        let dates = dates.str()?;

        // Strip padding, then non-strict cast: unparseable text becomes null.
        let numeric = df
            .clone()
            .lazy()
            .select(
                record::NUMERIC_COLUMNS
                    .iter()
                    .map(|name| {
                        col(*name)
                            .cast(DataType::String)
                            .str()
                            .strip_chars(lit(NULL))
                            .cast(DataType::Float64)
                    })
                    .collect::<Vec<_>>(),
            )
            .collect()?;
        let values = record::NUMERIC_COLUMNS
            .iter()
            .map(|name| numeric.column(name)?.f64())
            .collect::<PolarsResult<Vec<_>>>()?;

        let rows = (0..df.height())
            .map(|i| RawRecord {
                date: dates.get(i).and_then(parse_date),
                planned_production: finite(values[0].get(i)),
                actual_production: finite(values[1].get(i)),
                planned_quality: finite(values[2].get(i)),
                actual_quality: finite(values[3].get(i)),
            })
            .collect();
        Ok(rows)
    }

    fn is_canonical(&self, name: &str) -> bool {
        self.mapping
            .pairs()
            .iter()
            .any(|(_, canonical)| *canonical == name)
    }
}

/// Text form of a spreadsheet cell; date cells become ISO date-times.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string()),
        other => {
            let text = other.to_string().trim().to_string();
            (!text.is_empty()).then_some(text)
        }
    }
}

/// Trim header names, name blank ones and suffix duplicates.
fn unique_headers(names: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .enumerate()
        .map(|(idx, name)| {
            let base = match name.trim() {
                "" => format!("column_{}", idx + 1),
                trimmed => trimmed.to_string(),
            };
            let mut candidate = base.clone();
            let mut n = 1;
            while !seen.insert(candidate.clone()) {
                candidate = format!("{}_{}", base, n);
                n += 1;
            }
            candidate
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "ClearanceDate,PlanThickness,FinalThk,Order Yield Strength,Yield Strength";

    fn csv_file(lines: &[&str]) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_renames_and_parses() {
        let file = csv_file(&[
            HEADER,
            "2024-01-01,10,12,300,310",
            "2024-01-02 08:30:00,20,18,300,290",
        ]);

        let loaded = DataLoader::default().load(file.path()).unwrap();
        assert_eq!(loaded.records.len(), 2);

        let first = &loaded.records[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(first.planned_production, 10.0);
        assert_eq!(first.actual_quality, 310.0);
        assert_eq!(first.production_deviation, 2.0);
        assert_eq!(loaded.records[1].quality_deviation, -10.0);
    }

    #[test]
    fn test_load_drops_rows_with_missing_fields() {
        let file = csv_file(&[
            HEADER,
            "2024-01-01,10,12,300,310",
            "garbage,10,12,300,310",
            "2024-01-03,abc,12,300,310",
            "2024-01-04,10,12,,310",
            "2024-01-05,30,30,300,300",
        ]);

        let loaded = DataLoader::default().load(file.path()).unwrap();
        assert_eq!(loaded.report.total_rows, 5);
        assert_eq!(loaded.report.kept_rows, 2);
        assert_eq!(loaded.report.dropped_rows, 3);
        assert_eq!(loaded.records.len(), 2);
    }

    #[test]
    fn test_load_keeps_going_past_ragged_rows() {
        let file = csv_file(&[
            HEADER,
            "2024-01-01,10,12,300,310",
            "2024-01-02,20,18,300,290,overflow",
            "2024-01-03,30,29",
        ]);

        let loaded = DataLoader::default().load(file.path()).unwrap();
        assert_eq!(loaded.report.total_rows, 3);
        assert_eq!(loaded.report.kept_rows, 2);
        assert_eq!(loaded.records[1].actual_quality, 290.0);
    }

    #[test]
    fn test_load_trims_padded_numbers() {
        let file = csv_file(&[
            HEADER,
            "2024-01-01, 10, 12 ,300,  310",
            "2024-01-02,10,12,300,310",
        ]);

        let loaded = DataLoader::default().load(file.path()).unwrap();
        assert_eq!(loaded.report.kept_rows, 2);
        assert_eq!(loaded.records[0].planned_production, 10.0);
        assert_eq!(loaded.records[0].actual_production, 12.0);
        assert_eq!(loaded.records[0].actual_quality, 310.0);
    }

    #[test]
    fn test_load_xlsx_first_sheet() {
        use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("datasets.xlsx");

        let mut workbook = Workbook::new();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        let sheet = workbook.add_worksheet();
        let headers = [
            "Coil",
            "ClearanceDate",
            "PlanThickness",
            "FinalThk",
            "Order Yield Strength",
            "Yield Strength",
        ];
        for (col, header) in headers.iter().enumerate() {
            sheet.write(0, col as u16, *header).unwrap();
        }

        // Native date cell, text number
        sheet.write(1, 0, "C1").unwrap();
        let date = ExcelDateTime::from_ymd(2024, 1, 5).unwrap();
        sheet.write_datetime_with_format(1, 1, &date, &date_format).unwrap();
        sheet.write(1, 2, 10.0).unwrap();
        sheet.write(1, 3, "12").unwrap();
        sheet.write(1, 4, 300.0).unwrap();
        sheet.write(1, 5, 310.0).unwrap();

        // Text date, non-numeric cell
        sheet.write(2, 0, "C2").unwrap();
        sheet.write(2, 1, "2024-01-06").unwrap();
        sheet.write(2, 2, 20.0).unwrap();
        sheet.write(2, 3, "n/a").unwrap();
        sheet.write(2, 4, 300.0).unwrap();
        sheet.write(2, 5, 290.0).unwrap();

        // Text date
        sheet.write(3, 0, "C3").unwrap();
        sheet.write(3, 1, "2024-01-07").unwrap();
        sheet.write(3, 2, 5.0).unwrap();
        sheet.write(3, 3, 6.0).unwrap();
        sheet.write(3, 4, 300.0).unwrap();
        sheet.write(3, 5, 300.0).unwrap();
        workbook.save(&path).unwrap();

        let loaded = DataLoader::default().load(&path).unwrap();
        assert_eq!(loaded.report.total_rows, 3);
        assert_eq!(loaded.report.kept_rows, 2);
        assert_eq!(loaded.report.dropped_rows, 1);
        assert_eq!(loaded.extra_columns, vec!["Coil".to_string()]);

        let first = &loaded.records[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(first.actual_production, 12.0);
        assert_eq!(first.production_deviation, 2.0);
        assert_eq!(
            loaded.records[1].date,
            NaiveDate::from_ymd_opt(2024, 1, 7).unwrap()
        );
    }

    #[test]
    fn test_load_zero_fill_policy_keeps_dated_rows() {
        let file = csv_file(&[HEADER, "2024-01-01,10,,300,310", "bad,1,1,1,1"]);

        let loader = DataLoader::new(ColumnMapping::default(), MissingValuePolicy::ZeroFill);
        let loaded = loader.load(file.path()).unwrap();
        assert_eq!(loaded.records.len(), 1);
        assert_eq!(loaded.records[0].actual_production, 0.0);
    }

    #[test]
    fn test_load_reports_extra_columns() {
        let file = csv_file(&[
            "Coil,ClearanceDate,PlanThickness,FinalThk,Order Yield Strength,Yield Strength",
            "C1,2024-01-01,10,12,300,310",
        ]);

        let loaded = DataLoader::default().load(file.path()).unwrap();
        assert_eq!(loaded.extra_columns, vec!["Coil".to_string()]);
        assert_eq!(loaded.records.len(), 1);
    }

    #[test]
    fn test_load_accepts_canonical_headers() {
        let file = csv_file(&[
            "Date,Planned_Production,Actual_Production,Planned_Quality,Actual_Quality",
            "2024-01-01,1,2,3,4",
        ]);

        let loaded = DataLoader::default().load(file.path()).unwrap();
        assert_eq!(loaded.records.len(), 1);
    }

    #[test]
    fn test_load_missing_column_is_fatal() {
        let file = csv_file(&["ClearanceDate,PlanThickness,FinalThk", "2024-01-01,1,2"]);

        let err = DataLoader::default().load(file.path()).unwrap_err();
        assert!(matches!(err, LoaderError::MissingColumn { .. }));
    }

    #[test]
    fn test_load_missing_file_is_fatal() {
        let err = DataLoader::default()
            .load(Path::new("definitely_missing_dataset.xlsx"))
            .unwrap_err();
        assert!(matches!(err, LoaderError::FileNotFound(_)));
    }

    #[test]
    fn test_load_empty_file_has_no_header() {
        let file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();

        let err = DataLoader::default().load(file.path()).unwrap_err();
        assert!(matches!(err, LoaderError::NoHeader(_)));
    }

    #[test]
    fn test_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();

        let err = DataLoader::default().load(file.path()).unwrap_err();
        assert!(matches!(err, LoaderError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_table_error_message_is_format_neutral() {
        let err = LoaderError::from(PolarsError::NoData("empty frame".into()));
        assert!(matches!(err, LoaderError::Table(_)));
        assert!(err.to_string().starts_with("Failed to process table"));
        assert!(!err.to_string().contains("CSV"));
    }

    #[test]
    fn test_unique_headers() {
        let names = vec!["A".to_string(), " ".to_string(), "A".to_string()];
        assert_eq!(
            unique_headers(names.into_iter()),
            vec!["A".to_string(), "column_2".to_string(), "A_1".to_string()]
        );
    }
}
