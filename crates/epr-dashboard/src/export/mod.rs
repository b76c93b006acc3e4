//! Byte-level exports of a finished [`ResultTable`](crate::registry::ResultTable).
//! CSV never depends on which spreadsheet engines are compiled in.

mod delimited;
pub mod spreadsheet;

pub use delimited::to_csv_bytes;
pub use spreadsheet::{
    default_engines, ExportUnavailableError, SpreadsheetEngine, SpreadsheetExport,
    SpreadsheetExporter,
};
#[cfg(feature = "xlsx")]
pub use spreadsheet::XlsxWriterEngine;

pub const CSV_FILE_NAME: &str = "Scraped_dashboard.csv";
pub const XLSX_FILE_NAME: &str = "Scraped_dashboard.xlsx";
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const SHEET_NAME: &str = "Scraped";

pub fn csv_content_type() -> mime::Mime {
    mime::TEXT_CSV_UTF_8
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write CSV export: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush CSV export: {0}")]
    Flush(String),
    #[error(transparent)]
    Unavailable(#[from] ExportUnavailableError),
    #[error("spreadsheet engine '{engine}' failed: {message}")]
    Engine {
        engine: &'static str,
        message: String,
    },
}
