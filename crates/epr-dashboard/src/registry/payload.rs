use super::domain::{ApplicantType, ApplicationStatus, StatusMapping, MAX_RECORD_LIMIT};
use serde::{Deserialize, Serialize};

/// JSON body expected by `fetch_pibo_application_details_by_status`. Field
/// names and casing are part of the remote protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestPayload {
    pub status: String,
    pub count_value: u32,
    pub status_text: String,
    pub applicant_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("unrecognized status label '{0}'")]
    UnknownStatus(String),
    #[error("record limit must be a positive integer no greater than 200000, got {0}")]
    InvalidRecordLimit(i64),
}

impl RequestPayload {
    pub fn for_combination(
        applicant: ApplicantType,
        status: ApplicationStatus,
        record_limit: i64,
    ) -> Result<Self, ConfigurationError> {
        Ok(Self::from_mapping(
            status.mapping(),
            applicant,
            count_value(record_limit)?,
        ))
    }

    fn from_mapping(mapping: &StatusMapping, applicant: ApplicantType, count_value: u32) -> Self {
        Self {
            status: mapping.api_code.to_string(),
            count_value,
            status_text: mapping.api_text.to_string(),
            applicant_type: applicant.label().to_string(),
        }
    }
}

/// Builds the request body for one combination from its UI status label.
pub fn build_payload(
    status_label: &str,
    applicant: ApplicantType,
    record_limit: i64,
) -> Result<RequestPayload, ConfigurationError> {
    let mapping = StatusMapping::for_label(status_label)
        .ok_or_else(|| ConfigurationError::UnknownStatus(status_label.to_string()))?;
    let count_value = count_value(record_limit)?;
    Ok(RequestPayload::from_mapping(mapping, applicant, count_value))
}

fn count_value(record_limit: i64) -> Result<u32, ConfigurationError> {
    u32::try_from(record_limit)
        .ok()
        .filter(|value| (1..=MAX_RECORD_LIMIT).contains(value))
        .ok_or(ConfigurationError::InvalidRecordLimit(record_limit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_uses_api_tokens_not_ui_labels() {
        let payload =
            build_payload("In Process", ApplicantType::BrandOwner, 100).expect("payload builds");

        assert_eq!(
            serde_json::to_value(&payload).expect("serialize"),
            json!({
                "status": "InProgress",
                "countValue": 100,
                "statusText": "In Process",
                "applicantType": "Brand Owner",
            })
        );
    }

    #[test]
    fn serialized_field_order_matches_protocol() {
        let payload = RequestPayload::for_combination(
            ApplicantType::Producer,
            ApplicationStatus::NotApproved,
            5,
        )
        .expect("payload builds");

        assert_eq!(
            serde_json::to_string(&payload).expect("serialize"),
            r#"{"status":"notApproved","countValue":5,"statusText":"Not Approved","applicantType":"Producer"}"#
        );
    }

    #[test]
    fn unknown_status_label_is_a_configuration_error() {
        let error = build_payload("Pending", ApplicantType::Importer, 10)
            .expect_err("unknown label rejected");
        assert_eq!(error, ConfigurationError::UnknownStatus("Pending".to_string()));
    }

    #[test]
    fn record_limit_must_be_positive_and_bounded() {
        for limit in [0, -4, 200_001, i64::MAX] {
            let error = build_payload("Registered", ApplicantType::Importer, limit)
                .expect_err("limit rejected");
            assert_eq!(error, ConfigurationError::InvalidRecordLimit(limit));
        }

        let payload =
            build_payload("Registered", ApplicantType::Importer, 200_000).expect("upper bound");
        assert_eq!(payload.count_value, 200_000);
    }
}
