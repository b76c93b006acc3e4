use super::ExportError;
use crate::registry::{ResultTable, TidyRow};

/// UTF-8 CSV with a header row and one line per row, no index column.
pub fn to_csv_bytes(table: &ResultTable) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(TidyRow::HEADERS)?;
    for row in table.rows() {
        writer.write_record(row.fields())?;
    }

    writer
        .into_inner()
        .map_err(|err| ExportError::Flush(err.error().to_string()))
}
