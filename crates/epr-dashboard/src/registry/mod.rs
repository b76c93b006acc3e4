//! Fetch, normalize, and aggregate PIBO registration records from the CPCB
//! EPR Plastic dashboard.

pub mod cache;
pub mod domain;
pub mod gateway;
pub mod normalizer;
pub mod payload;
pub mod scraper;
pub mod service;
pub mod summary;
pub mod table;

pub use cache::{CacheKey, CachedTable, ResultCache};
pub use domain::{
    ApplicantType, ApplicationStatus, CategoryLabel, FilterSelection, SelectionError,
    StatusMapping, TidyRow, DEFAULT_RECORD_LIMIT, MAX_RECORD_LIMIT,
};
pub use gateway::{CombinationFetchError, HttpRegistryClient, RegistryGateway};
pub use normalizer::normalize;
pub use payload::{build_payload, ConfigurationError, RequestPayload};
pub use scraper::RegistryScraper;
pub use service::{RegistryError, RegistryService};
pub use summary::TableSummary;
pub use table::{finalize, ResultTable};
