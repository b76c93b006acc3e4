use crate::infra::{parse_applicant_type, parse_status};
use chrono::Local;
use clap::Args;
use epr_dashboard::config::AppConfig;
use epr_dashboard::error::AppError;
use epr_dashboard::export::{to_csv_bytes, ExportError, SpreadsheetExporter};
use epr_dashboard::registry::{
    ApplicantType, ApplicationStatus, FilterSelection, RegistryService, ResultTable, TableSummary,
};
use epr_dashboard::telemetry;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

const RATE_LIMIT_NOTE: &str = "Consider adding rate limits before running this against the live dashboard on a schedule.";
const TLS_NOTE: &str = "Note: TLS certificate verification is disabled (REGISTRY_ACCEPT_INVALID_CERTS=true). Consider enabling it in production.";

#[derive(Args, Debug, Default)]
pub(crate) struct ScrapeArgs {
    /// Applicant type to include; repeat for several (defaults to all)
    #[arg(long = "applicant-type", value_parser = parse_applicant_type)]
    pub(crate) applicant_types: Vec<ApplicantType>,
    /// Status to include; repeat for several (defaults to all)
    #[arg(long = "status", value_parser = parse_status)]
    pub(crate) statuses: Vec<ApplicationStatus>,
    /// Max records per API call (countValue), between 1 and 200000
    #[arg(long)]
    pub(crate) count: Option<i64>,
    /// Write the result table as CSV to this path
    #[arg(long)]
    pub(crate) csv_out: Option<PathBuf>,
    /// Write the result table as an XLSX workbook to this path
    #[arg(long)]
    pub(crate) xlsx_out: Option<PathBuf>,
    /// Number of rows to print as a preview
    #[arg(long, default_value_t = 20)]
    pub(crate) preview: usize,
}

impl ScrapeArgs {
    fn selection(&self, default_record_limit: u32) -> FilterSelection {
        let applicant_types = if self.applicant_types.is_empty() {
            ApplicantType::ordered().to_vec()
        } else {
            self.applicant_types.clone()
        };
        let statuses = if self.statuses.is_empty() {
            ApplicationStatus::ordered().to_vec()
        } else {
            self.statuses.clone()
        };
        let record_limit = self
            .count
            .unwrap_or_else(|| i64::from(default_record_limit));

        FilterSelection::new(applicant_types, statuses, record_limit)
    }
}

pub(crate) fn run_scrape(args: ScrapeArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let selection = args.selection(config.registry.default_record_limit);
    let service = RegistryService::from_config(&config.registry)?;

    println!("{}", fetch_banner(&selection));
    let result = service.fetch(&selection)?;
    let summary = TableSummary::from_table(&result.table, Local::now().naive_local());
    print!("{}", render_report(&result.table, &summary, args.preview));

    let exporter = SpreadsheetExporter::with_default_engines();
    for line in write_exports(
        &result.table,
        args.csv_out.as_deref(),
        args.xlsx_out.as_deref(),
        &exporter,
    )? {
        println!("{line}");
    }

    println!("\n{}", footnote(config.registry.accept_invalid_certs));
    Ok(())
}

/// Writes the requested files, CSV first. A spreadsheet failure of any kind
/// is reported as a warning line and never prevents the CSV.
pub(crate) fn write_exports(
    table: &ResultTable,
    csv_out: Option<&Path>,
    xlsx_out: Option<&Path>,
    exporter: &SpreadsheetExporter,
) -> Result<Vec<String>, AppError> {
    let mut lines = Vec::new();

    if let Some(path) = csv_out {
        fs::write(path, to_csv_bytes(table)?)?;
        lines.push(format!("CSV written to {}", path.display()));
    }

    if let Some(path) = xlsx_out {
        let written = exporter
            .to_spreadsheet_bytes(table)
            .map_err(|err| match err {
                ExportError::Unavailable(unavailable) => {
                    format!("spreadsheet export unavailable ({unavailable})")
                }
                other => format!("spreadsheet export failed ({other})"),
            })
            .and_then(|export| {
                fs::write(path, export.bytes)
                    .map(|()| export.engine)
                    .map_err(|err| format!("could not write {} ({err})", path.display()))
            });

        match written {
            Ok(engine) => lines.push(format!(
                "Spreadsheet engine in use: {engine} -> {}",
                path.display()
            )),
            Err(reason) => {
                warn!(%reason, "spreadsheet export skipped");
                lines.push(format!("warning: {reason}"));
            }
        }
    }

    Ok(lines)
}

pub(crate) fn render_report(table: &ResultTable, summary: &TableSummary, preview: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\nTotal rows: {}", group_thousands(summary.total_rows));
    let _ = writeln!(
        out,
        "Unique companies: {}",
        group_thousands(summary.unique_companies)
    );
    if summary.failed_combinations > 0 {
        let _ = writeln!(
            out,
            "Failed combinations: {}",
            summary.failed_combinations
        );
    }
    let _ = writeln!(out, "Downloaded on: {}", summary.downloaded_on_label());

    if table.is_empty() {
        let _ = writeln!(out, "\nNo records returned.");
        return out;
    }

    let _ = writeln!(out, "\nPreview");
    for row in table.rows().iter().take(preview) {
        let _ = writeln!(
            out,
            "- {} | {} | {} | {}",
            row.name, row.address, row.email, row.category
        );
    }
    if table.len() > preview {
        let _ = writeln!(out, "... {} more rows", group_thousands(table.len() - preview));
    }
    out
}

fn fetch_banner(selection: &FilterSelection) -> String {
    format!(
        "Fetching data from CPCB API (combinations: {}, countValue: {})...",
        selection.combinations().len(),
        selection.record_limit()
    )
}

fn footnote(accept_invalid_certs: bool) -> String {
    if accept_invalid_certs {
        format!("{TLS_NOTE} {RATE_LIMIT_NOTE}")
    } else {
        RATE_LIMIT_NOTE.to_string()
    }
}

fn group_thousands(value: usize) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
