use super::domain::{CategoryLabel, FilterSelection, TidyRow};
use super::gateway::RegistryGateway;
use super::normalizer::normalize;
use super::payload::{build_payload, ConfigurationError};
use super::table::{finalize, ResultTable};
use tracing::{debug, info, warn};

/// Drives one call per combination and merges the results.
#[derive(Debug)]
pub struct RegistryScraper {
    gateway: Box<dyn RegistryGateway>,
}

impl RegistryScraper {
    pub fn new(gateway: Box<dyn RegistryGateway>) -> Self {
        Self { gateway }
    }

    /// Fetches every combination of `selection` sequentially.
    ///
    /// Per-combination network failures become sentinel rows; only malformed
    /// input (an invalid record limit) fails the run.
    pub fn fetch(&self, selection: &FilterSelection) -> Result<ResultTable, ConfigurationError> {
        let combinations = selection.combinations();
        info!(
            combinations = combinations.len(),
            record_limit = selection.record_limit(),
            "fetching registry combinations"
        );

        let mut collected = Vec::new();
        for (applicant, status) in combinations {
            let category = CategoryLabel::new(applicant, status);
            let payload = build_payload(status.label(), applicant, selection.record_limit())?;

            match self.gateway.fetch_combination(&payload) {
                Ok(body) => {
                    let rows = normalize(&body, &category);
                    debug!(%category, rows = rows.len(), "combination fetched");
                    collected.extend(rows);
                }
                Err(err) => {
                    warn!(%category, error = %err, "combination fetch failed");
                    collected.push(TidyRow::sentinel(&category, &err.to_string()));
                }
            }
        }

        let fetched = collected.len();
        let table = finalize(collected);
        info!(
            fetched,
            rows = table.len(),
            "registry fetch complete"
        );
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::domain::{ApplicantType, ApplicationStatus};
    use crate::registry::gateway::CombinationFetchError;
    use crate::registry::payload::RequestPayload;
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Default)]
    struct RecordingGateway {
        calls: Mutex<Vec<RequestPayload>>,
    }

    impl RegistryGateway for RecordingGateway {
        fn fetch_combination(
            &self,
            payload: &RequestPayload,
        ) -> Result<Value, CombinationFetchError> {
            self.calls.lock().expect("calls mutex").push(payload.clone());
            Ok(json!({"data": {"tableData": {"bodyContent": [
                {"company": "Same Co", "address": "1 Road", "email": "same@x.com"}
            ]}}}))
        }
    }

    #[test]
    fn invalid_record_limit_aborts_before_any_call() {
        let gateway = Arc::new(RecordingGateway::default());
        let scraper = RegistryScraper::new(Box::new(gateway.clone()));
        let selection = FilterSelection::everything(0);

        let error = scraper.fetch(&selection).expect_err("limit rejected");
        assert_eq!(error, ConfigurationError::InvalidRecordLimit(0));
        assert!(gateway.calls.lock().expect("calls mutex").is_empty());
    }

    #[test]
    fn identical_records_within_a_category_collapse() {
        let gateway = Arc::new(RecordingGateway::default());
        let scraper = RegistryScraper::new(Box::new(gateway.clone()));
        let selection = FilterSelection::new(
            [ApplicantType::Importer],
            [ApplicationStatus::Registered, ApplicationStatus::InProcess],
            50,
        );

        let table = scraper.fetch(&selection).expect("fetch succeeds");
        assert_eq!(table.len(), 2, "same company differs by category only");
        assert_eq!(gateway.calls.lock().expect("calls mutex").len(), 2);
    }

    #[test]
    fn empty_selection_makes_no_calls() {
        let gateway = Arc::new(RecordingGateway::default());
        let scraper = RegistryScraper::new(Box::new(gateway.clone()));
        let selection = FilterSelection::new([], ApplicationStatus::ordered(), 10);

        let table = scraper.fetch(&selection).expect("fetch succeeds");
        assert!(table.is_empty());
        assert!(gateway.calls.lock().expect("calls mutex").is_empty());
    }
}
