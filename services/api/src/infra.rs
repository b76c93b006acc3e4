use epr_dashboard::error::AppError;
use epr_dashboard::export::SpreadsheetExporter;
use epr_dashboard::registry::{ApplicantType, ApplicationStatus, FilterSelection, RegistryService};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Shared handles for the registry endpoints.
#[derive(Clone)]
pub(crate) struct RegistryState {
    pub(crate) service: Arc<RegistryService>,
    pub(crate) exporter: Arc<SpreadsheetExporter>,
    pub(crate) default_record_limit: u32,
}

/// Body accepted by the scrape and export endpoints. Omitted lists mean
/// "everything"; an explicitly empty list is rejected by validation.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ScrapeRequest {
    pub(crate) applicant_types: Option<Vec<String>>,
    pub(crate) statuses: Option<Vec<String>>,
    pub(crate) count_value: Option<i64>,
    pub(crate) refresh: bool,
}

impl ScrapeRequest {
    pub(crate) fn selection(&self, default_record_limit: u32) -> Result<FilterSelection, AppError> {
        let applicant_types = match &self.applicant_types {
            Some(raw) => raw
                .iter()
                .map(|value| parse_applicant_type(value))
                .collect::<Result<Vec<_>, _>>()
                .map_err(AppError::InvalidRequest)?,
            None => ApplicantType::ordered().to_vec(),
        };

        let statuses = match &self.statuses {
            Some(raw) => raw
                .iter()
                .map(|value| parse_status(value))
                .collect::<Result<Vec<_>, _>>()
                .map_err(AppError::InvalidRequest)?,
            None => ApplicationStatus::ordered().to_vec(),
        };

        let record_limit = self
            .count_value
            .unwrap_or_else(|| i64::from(default_record_limit));

        Ok(FilterSelection::new(applicant_types, statuses, record_limit))
    }
}

pub(crate) fn parse_applicant_type(raw: &str) -> Result<ApplicantType, String> {
    ApplicantType::parse(raw).ok_or_else(|| {
        format!("unknown applicant type '{raw}' (expected Brand Owner, Producer or Importer)")
    })
}

pub(crate) fn parse_status(raw: &str) -> Result<ApplicationStatus, String> {
    ApplicationStatus::parse(raw).ok_or_else(|| {
        format!("unknown status '{raw}' (expected In Process, Not Approved or Registered)")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omitted_fields_select_everything_with_default_limit() {
        let selection = ScrapeRequest::default()
            .selection(100_000)
            .expect("selection builds");

        assert_eq!(selection, FilterSelection::everything(100_000));
    }

    #[test]
    fn labels_are_parsed_leniently_and_deduplicated() {
        let request = ScrapeRequest {
            applicant_types: Some(vec!["Importer".into(), "brand owner".into(), "IMP".into()]),
            statuses: Some(vec!["Not Approved".into()]),
            count_value: Some(50),
            refresh: false,
        };

        let selection = request.selection(100_000).expect("selection builds");
        assert_eq!(
            selection.applicant_types(),
            &[ApplicantType::Importer, ApplicantType::BrandOwner]
        );
        assert_eq!(selection.statuses(), &[ApplicationStatus::NotApproved]);
        assert_eq!(selection.record_limit(), 50);
    }

    #[test]
    fn unknown_label_is_invalid_request() {
        let request = ScrapeRequest {
            statuses: Some(vec!["Pending".into()]),
            ..ScrapeRequest::default()
        };

        let error = request.selection(10).expect_err("unknown status");
        assert!(matches!(error, AppError::InvalidRequest(ref reason) if reason.contains("Pending")));
    }
}
