//! Report module - Table slides and the standalone HTML export

mod html;
mod slides;

pub use html::{render_html, render_report, write_report, ReportError};
pub use slides::{build_table_slides, format_value, TableSlide, NO_DATA_MESSAGE, NO_DATA_TITLE};
