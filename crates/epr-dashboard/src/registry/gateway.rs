use super::payload::RequestPayload;
use crate::config::RegistryConfig;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde_json::Value;
use std::fmt::Debug;
use std::sync::Arc;

/// Failure of a single (applicant type, status) call. These are recorded as
/// sentinel rows rather than aborting the run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CombinationFetchError {
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("{status} {reason} for url: {url}")]
    Status {
        status: u16,
        reason: String,
        url: String,
    },
    #[error("response body is not valid JSON: {0}")]
    Decode(String),
    #[error("request failed: {0}")]
    Transport(String),
}

impl CombinationFetchError {
    fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::Connect(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Network seam for the dashboard endpoint: one call per combination.
pub trait RegistryGateway: Debug + Send + Sync {
    fn fetch_combination(&self, payload: &RequestPayload) -> Result<Value, CombinationFetchError>;
}

impl<G> RegistryGateway for Arc<G>
where
    G: RegistryGateway + ?Sized,
{
    fn fetch_combination(&self, payload: &RequestPayload) -> Result<Value, CombinationFetchError> {
        (**self).fetch_combination(payload)
    }
}

/// Blocking HTTP client for the CPCB EPR Plastic dashboard.
///
/// Certificate verification follows `RegistryConfig::accept_invalid_certs`,
/// which defaults to accepting invalid certificates because the dashboard's
/// chain does not validate against common trust stores.
#[derive(Debug, Clone)]
pub struct HttpRegistryClient {
    http: Client,
    endpoint: String,
}

impl HttpRegistryClient {
    pub fn from_config(config: &RegistryConfig) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        Ok(Self {
            http,
            endpoint: config.api_url.clone(),
        })
    }
}

impl RegistryGateway for HttpRegistryClient {
    fn fetch_combination(&self, payload: &RequestPayload) -> Result<Value, CombinationFetchError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(payload)
            .send()
            .map_err(CombinationFetchError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(CombinationFetchError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
                url: self.endpoint.clone(),
            });
        }

        let body = response
            .bytes()
            .map_err(CombinationFetchError::from_transport)?;
        serde_json::from_slice(&body).map_err(|err| CombinationFetchError::Decode(err.to_string()))
    }
}
