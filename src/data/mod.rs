//! Data module - spreadsheet loading, records and processing

mod loader;
mod processor;
pub mod record;

pub use loader::{ColumnMapping, DataLoader, LoadReport, LoadedData, LoaderError, SourceFormat};
pub use processor::{DataProcessor, DateRange};
pub use record::{MissingValuePolicy, RawRecord, Record};
