use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest `countValue` the dashboard accepts for a single call.
pub const MAX_RECORD_LIMIT: u32 = 200_000;
pub const DEFAULT_RECORD_LIMIT: u32 = 100_000;

/// PIBO applicant category as labelled on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicantType {
    #[serde(rename = "Brand Owner", alias = "BrandOwner", alias = "brand_owner")]
    BrandOwner,
    #[serde(alias = "producer")]
    Producer,
    #[serde(alias = "importer")]
    Importer,
}

impl ApplicantType {
    pub const fn ordered() -> [Self; 3] {
        [Self::BrandOwner, Self::Producer, Self::Importer]
    }

    /// Label sent verbatim as `applicantType`.
    pub const fn label(self) -> &'static str {
        match self {
            Self::BrandOwner => "Brand Owner",
            Self::Producer => "Producer",
            Self::Importer => "Importer",
        }
    }

    pub const fn category_prefix(self) -> &'static str {
        match self {
            Self::BrandOwner => "BO-",
            Self::Producer => "Pro-",
            Self::Importer => "Imp-",
        }
    }

    /// Lenient lookup used by command-line and form inputs.
    pub fn parse(raw: &str) -> Option<Self> {
        match compact(raw).as_str() {
            "brandowner" | "bo" => Some(Self::BrandOwner),
            "producer" | "pro" => Some(Self::Producer),
            "importer" | "imp" => Some(Self::Importer),
            _ => None,
        }
    }
}

impl fmt::Display for ApplicantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Registration status as offered in the dashboard filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    #[serde(rename = "In Process", alias = "InProcess", alias = "in_process")]
    InProcess,
    #[serde(rename = "Not Approved", alias = "NotApproved", alias = "not_approved")]
    NotApproved,
    #[serde(alias = "registered")]
    Registered,
}

impl ApplicationStatus {
    pub const fn ordered() -> [Self; 3] {
        [Self::InProcess, Self::NotApproved, Self::Registered]
    }

    pub fn label(self) -> &'static str {
        self.mapping().ui_label
    }

    pub fn mapping(self) -> &'static StatusMapping {
        match self {
            Self::InProcess => &STATUS_TABLE[0],
            Self::NotApproved => &STATUS_TABLE[1],
            Self::Registered => &STATUS_TABLE[2],
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match compact(raw).as_str() {
            "inprocess" | "inprogress" => Some(Self::InProcess),
            "notapproved" => Some(Self::NotApproved),
            "registered" => Some(Self::Registered),
            _ => None,
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of the fixed UI label to API token table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusMapping {
    pub status: ApplicationStatus,
    pub ui_label: &'static str,
    pub api_code: &'static str,
    pub api_text: &'static str,
}

static STATUS_TABLE: [StatusMapping; 3] = [
    StatusMapping {
        status: ApplicationStatus::InProcess,
        ui_label: "In Process",
        api_code: "InProgress",
        api_text: "In Process",
    },
    StatusMapping {
        status: ApplicationStatus::NotApproved,
        ui_label: "Not Approved",
        api_code: "notApproved",
        api_text: "Not Approved",
    },
    StatusMapping {
        status: ApplicationStatus::Registered,
        ui_label: "Registered",
        api_code: "registered",
        api_text: "Registered",
    },
];

impl StatusMapping {
    /// Exact match on the UI label.
    pub fn for_label(label: &str) -> Option<&'static StatusMapping> {
        STATUS_TABLE.iter().find(|entry| entry.ui_label == label)
    }
}

/// Tag carried by every row produced for one combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CategoryLabel(String);

impl CategoryLabel {
    pub fn new(applicant: ApplicantType, status: ApplicationStatus) -> Self {
        Self(format!(
            "{}{}",
            applicant.category_prefix(),
            status.mapping().api_text
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn with_error(&self, description: &str) -> String {
        format!("{} (ERROR: {})", self.0, description)
    }
}

impl fmt::Display for CategoryLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonical four-column output record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TidyRow {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Address")]
    pub address: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Category")]
    pub category: String,
}

const ERROR_MARKER: &str = " (ERROR: ";

impl TidyRow {
    pub const HEADERS: [&'static str; 4] = ["Name", "Address", "Email", "Category"];

    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        email: impl Into<String>,
        category: &CategoryLabel,
    ) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            email: email.into(),
            category: category.as_str().to_string(),
        }
    }

    /// Placeholder row recording a failed combination.
    pub fn sentinel(category: &CategoryLabel, description: &str) -> Self {
        Self {
            name: String::new(),
            address: String::new(),
            email: String::new(),
            category: category.with_error(description),
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.name.is_empty()
            && self.address.is_empty()
            && self.email.is_empty()
            && self.category.contains(ERROR_MARKER)
    }

    pub fn fields(&self) -> [&str; 4] {
        [&self.name, &self.address, &self.email, &self.category]
    }
}

/// Caller's filter choice for one run. Duplicate entries collapse to the first
/// occurrence, and iteration follows selection order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterSelection {
    applicant_types: Vec<ApplicantType>,
    statuses: Vec<ApplicationStatus>,
    record_limit: i64,
}

impl FilterSelection {
    pub fn new(
        applicant_types: impl IntoIterator<Item = ApplicantType>,
        statuses: impl IntoIterator<Item = ApplicationStatus>,
        record_limit: i64,
    ) -> Self {
        Self {
            applicant_types: dedup_ordered(applicant_types),
            statuses: dedup_ordered(statuses),
            record_limit,
        }
    }

    /// Every applicant type and status, as the dashboard preselects them.
    pub fn everything(record_limit: i64) -> Self {
        Self::new(
            ApplicantType::ordered(),
            ApplicationStatus::ordered(),
            record_limit,
        )
    }

    pub fn applicant_types(&self) -> &[ApplicantType] {
        &self.applicant_types
    }

    pub fn statuses(&self) -> &[ApplicationStatus] {
        &self.statuses
    }

    pub fn record_limit(&self) -> i64 {
        self.record_limit
    }

    /// Applicant type outer, status inner.
    pub fn combinations(&self) -> Vec<(ApplicantType, ApplicationStatus)> {
        self.applicant_types
            .iter()
            .flat_map(|applicant| {
                self.statuses
                    .iter()
                    .map(move |status| (*applicant, *status))
            })
            .collect()
    }

    /// Precondition checks enforced by callers before a run.
    pub fn validate(&self) -> Result<(), SelectionError> {
        if self.applicant_types.is_empty() || self.statuses.is_empty() {
            return Err(SelectionError::Empty);
        }
        if self.record_limit < 1 || self.record_limit > i64::from(MAX_RECORD_LIMIT) {
            return Err(SelectionError::RecordLimitOutOfRange {
                value: self.record_limit,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("choose at least one applicant type and one status")]
    Empty,
    #[error("record limit must be between 1 and 200000, got {value}")]
    RecordLimitOutOfRange { value: i64 },
}

fn dedup_ordered<T: PartialEq>(values: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut unique = Vec::new();
    for value in values {
        if !unique.contains(&value) {
            unique.push(value);
        }
    }
    unique
}

fn compact(raw: &str) -> String {
    raw.chars()
        .filter(|ch| ch.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}
