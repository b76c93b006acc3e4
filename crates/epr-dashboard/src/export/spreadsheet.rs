use super::{ExportError, SHEET_NAME};
use crate::registry::ResultTable;
use std::fmt::{self, Debug};
use tracing::{info, warn};

/// A provider able to render a table as spreadsheet bytes.
pub trait SpreadsheetEngine: Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Probed once when the exporter is assembled.
    fn is_available(&self) -> bool {
        true
    }

    fn write_workbook(&self, sheet_name: &str, table: &ResultTable)
        -> Result<Vec<u8>, ExportError>;
}

/// Engines compiled into this build, most preferred first.
pub fn default_engines() -> Vec<Box<dyn SpreadsheetEngine>> {
    #[allow(unused_mut)]
    let mut engines: Vec<Box<dyn SpreadsheetEngine>> = Vec::new();
    #[cfg(feature = "xlsx")]
    engines.push(Box::new(XlsxWriterEngine));
    engines
}

/// Raised when no spreadsheet engine could be selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportUnavailableError {
    pub probed: Vec<&'static str>,
}

impl ExportUnavailableError {
    pub fn remediation(&self) -> &'static str {
        "rebuild with the `xlsx` feature (cargo build --features xlsx) to enable the rust_xlsxwriter engine; CSV export is unaffected"
    }
}

impl fmt::Display for ExportUnavailableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.probed.is_empty() {
            write!(f, "no spreadsheet engine compiled in")?;
        } else {
            write!(
                f,
                "no spreadsheet engine available (probed: {})",
                self.probed.join(", ")
            )?;
        }
        write!(f, "; {}", self.remediation())
    }
}

impl std::error::Error for ExportUnavailableError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpreadsheetExport {
    pub engine: &'static str,
    pub bytes: Vec<u8>,
}

/// Holds the first available engine from an ordered preference list.
#[derive(Debug)]
pub struct SpreadsheetExporter {
    selected: Option<Box<dyn SpreadsheetEngine>>,
    probed: Vec<&'static str>,
}

impl SpreadsheetExporter {
    pub fn new(candidates: Vec<Box<dyn SpreadsheetEngine>>) -> Self {
        let probed: Vec<&'static str> = candidates.iter().map(|engine| engine.name()).collect();
        let selected = candidates.into_iter().find(|engine| engine.is_available());

        match &selected {
            Some(engine) => info!(engine = engine.name(), "spreadsheet engine selected"),
            None => warn!(probed = ?probed, "no spreadsheet engine available"),
        }

        Self { selected, probed }
    }

    pub fn with_default_engines() -> Self {
        Self::new(default_engines())
    }

    /// Name of the engine in use, if any.
    pub fn engine_name(&self) -> Option<&'static str> {
        self.selected.as_ref().map(|engine| engine.name())
    }

    pub fn availability(&self) -> Result<&'static str, ExportUnavailableError> {
        self.engine_name().ok_or_else(|| ExportUnavailableError {
            probed: self.probed.clone(),
        })
    }

    pub fn to_spreadsheet_bytes(
        &self,
        table: &ResultTable,
    ) -> Result<SpreadsheetExport, ExportError> {
        let engine = self.selected.as_ref().ok_or_else(|| ExportUnavailableError {
            probed: self.probed.clone(),
        })?;

        let bytes = engine.write_workbook(SHEET_NAME, table)?;
        Ok(SpreadsheetExport {
            engine: engine.name(),
            bytes,
        })
    }
}

#[cfg(feature = "xlsx")]
pub use xlsx::XlsxWriterEngine;

#[cfg(feature = "xlsx")]
mod xlsx {
    use super::{ExportError, SpreadsheetEngine};
    use crate::registry::{ResultTable, TidyRow};
    use rust_xlsxwriter::{Workbook, XlsxError};

    const ENGINE: &str = "rust_xlsxwriter";

    #[derive(Debug, Clone, Copy, Default)]
    pub struct XlsxWriterEngine;

    fn engine_error(err: XlsxError) -> ExportError {
        ExportError::Engine {
            engine: ENGINE,
            message: err.to_string(),
        }
    }

    impl SpreadsheetEngine for XlsxWriterEngine {
        fn name(&self) -> &'static str {
            ENGINE
        }

        fn write_workbook(
            &self,
            sheet_name: &str,
            table: &ResultTable,
        ) -> Result<Vec<u8>, ExportError> {
            let mut workbook = Workbook::new();
            {
                let worksheet = workbook.add_worksheet();
                worksheet.set_name(sheet_name).map_err(engine_error)?;

                for (col, header) in (0u16..).zip(TidyRow::HEADERS) {
                    worksheet
                        .write_string(0, col, header)
                        .map_err(engine_error)?;
                }

                for (index, row) in table.indexed() {
                    let sheet_row = u32::try_from(index + 1).map_err(|_| ExportError::Engine {
                        engine: ENGINE,
                        message: format!("row {index} exceeds worksheet bounds"),
                    })?;
                    for (col, value) in (0u16..).zip(row.fields()) {
                        worksheet
                            .write_string(sheet_row, col, value)
                            .map_err(engine_error)?;
                    }
                }
            }

            workbook.save_to_buffer().map_err(engine_error)
        }
    }
}
