use super::cache::{CachedTable, ResultCache};
use super::domain::{FilterSelection, SelectionError};
use super::gateway::HttpRegistryClient;
use super::payload::ConfigurationError;
use super::scraper::RegistryScraper;
use crate::config::RegistryConfig;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

/// Entry point for callers: validates the selection, then serves it from the
/// result cache or a fresh scrape.
#[derive(Debug)]
pub struct RegistryService {
    scraper: RegistryScraper,
    cache: Arc<ResultCache>,
}

impl RegistryService {
    pub fn new(scraper: RegistryScraper, cache: Arc<ResultCache>) -> Self {
        Self { scraper, cache }
    }

    pub fn from_config(config: &RegistryConfig) -> Result<Self, reqwest::Error> {
        let client = HttpRegistryClient::from_config(config)?;
        let cache = Arc::new(ResultCache::new(config.cache_ttl()));
        Ok(Self::new(RegistryScraper::new(Box::new(client)), cache))
    }

    pub fn fetch(&self, selection: &FilterSelection) -> Result<CachedTable, RegistryError> {
        selection.validate()?;
        self.cache.get_or_try_insert_with(selection, || {
            self.scraper.fetch(selection).map_err(RegistryError::from)
        })
    }

    /// Drops any cached result for `selection` before fetching.
    pub fn refresh(&self, selection: &FilterSelection) -> Result<CachedTable, RegistryError> {
        selection.validate()?;
        self.cache.invalidate(selection);
        self.fetch(selection)
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }
}
