use super::table::ResultTable;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::HashSet;

pub const DOWNLOADED_ON_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Headline figures shown next to a run's preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSummary {
    pub total_rows: usize,
    /// Distinct non-empty names. Sentinel rows and blank names are not
    /// counted, unlike a plain distinct count over the Name column.
    pub unique_companies: usize,
    pub failed_combinations: usize,
    pub downloaded_on: NaiveDateTime,
}

impl TableSummary {
    pub fn from_table(table: &ResultTable, downloaded_on: NaiveDateTime) -> Self {
        let unique_companies = table
            .rows()
            .iter()
            .filter(|row| !row.name.is_empty())
            .map(|row| row.name.as_str())
            .collect::<HashSet<_>>()
            .len();
        let failed_combinations = table.rows().iter().filter(|row| row.is_sentinel()).count();

        Self {
            total_rows: table.len(),
            unique_companies,
            failed_combinations,
            downloaded_on,
        }
    }

    pub fn downloaded_on_label(&self) -> String {
        self.downloaded_on.format(DOWNLOADED_ON_FORMAT).to_string()
    }
}
