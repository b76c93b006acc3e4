use super::domain::FilterSelection;
use super::table::ResultTable;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Canonical text form of a selection, including its record limit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn for_selection(selection: &FilterSelection) -> Self {
        let mut key = String::from("types=");
        for (index, applicant) in selection.applicant_types().iter().enumerate() {
            if index > 0 {
                key.push('|');
            }
            key.push_str(applicant.label());
        }
        key.push_str(";statuses=");
        for (index, status) in selection.statuses().iter().enumerate() {
            if index > 0 {
                key.push('|');
            }
            key.push_str(status.label());
        }
        let _ = write!(key, ";limit={}", selection.record_limit());
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug)]
struct CacheEntry {
    table: Arc<ResultTable>,
    stored_at: Instant,
}

/// Table plus whether it was served from the cache.
#[derive(Debug, Clone)]
pub struct CachedTable {
    pub table: Arc<ResultTable>,
    pub cached: bool,
}

/// Memo of finished runs keyed by exact selection. Entries never change once
/// stored; they leave through `invalidate`, `clear`, or TTL expiry on read.
#[derive(Debug, Default)]
pub struct ResultCache {
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
    ttl: Option<Duration>,
}

impl ResultCache {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn get(&self, selection: &FilterSelection) -> Option<Arc<ResultTable>> {
        let key = CacheKey::for_selection(selection);
        let mut entries = self.lock();
        let expired = match entries.get(&key) {
            Some(entry) => self.is_expired(entry),
            None => return None,
        };

        if expired {
            entries.remove(&key);
            return None;
        }
        entries.get(&key).map(|entry| Arc::clone(&entry.table))
    }

    pub fn insert(&self, selection: &FilterSelection, table: ResultTable) -> Arc<ResultTable> {
        let table = Arc::new(table);
        self.lock().insert(
            CacheKey::for_selection(selection),
            CacheEntry {
                table: Arc::clone(&table),
                stored_at: Instant::now(),
            },
        );
        table
    }

    /// Returns the cached table or runs `fetch` and stores its result. The
    /// lock is not held while `fetch` runs.
    pub fn get_or_try_insert_with<E, F>(
        &self,
        selection: &FilterSelection,
        fetch: F,
    ) -> Result<CachedTable, E>
    where
        F: FnOnce() -> Result<ResultTable, E>,
    {
        if let Some(table) = self.get(selection) {
            tracing::info!(key = CacheKey::for_selection(selection).as_str(), "result cache hit");
            return Ok(CachedTable {
                table,
                cached: true,
            });
        }

        tracing::info!(key = CacheKey::for_selection(selection).as_str(), "result cache miss");
        let table = self.insert(selection, fetch()?);
        Ok(CachedTable {
            table,
            cached: false,
        })
    }

    pub fn invalidate(&self, selection: &FilterSelection) -> bool {
        self.lock()
            .remove(&CacheKey::for_selection(selection))
            .is_some()
    }

    /// Evicts everything, returning the number of entries removed.
    pub fn clear(&self) -> usize {
        let mut entries = self.lock();
        let evicted = entries.len();
        entries.clear();
        evicted
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn is_expired(&self, entry: &CacheEntry) -> bool {
        self.ttl
            .is_some_and(|ttl| entry.stored_at.elapsed() >= ttl)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::domain::{ApplicantType, ApplicationStatus, CategoryLabel, TidyRow};
    use crate::registry::table::finalize;
    use std::convert::Infallible;

    fn sample_table() -> ResultTable {
        let label = CategoryLabel::new(ApplicantType::Producer, ApplicationStatus::Registered);
        finalize(vec![TidyRow::new("Acme", "Road", "a@x.com", &label)])
    }

    #[test]
    fn key_includes_order_and_limit() {
        let a = FilterSelection::new(
            [ApplicantType::BrandOwner, ApplicantType::Producer],
            [ApplicationStatus::Registered],
            100,
        );
        let b = FilterSelection::new(
            [ApplicantType::Producer, ApplicantType::BrandOwner],
            [ApplicationStatus::Registered],
            100,
        );
        let c = FilterSelection::new(
            [ApplicantType::BrandOwner, ApplicantType::Producer],
            [ApplicationStatus::Registered],
            101,
        );

        assert_eq!(
            CacheKey::for_selection(&a).as_str(),
            "types=Brand Owner|Producer;statuses=Registered;limit=100"
        );
        assert_ne!(CacheKey::for_selection(&a), CacheKey::for_selection(&b));
        assert_ne!(CacheKey::for_selection(&a), CacheKey::for_selection(&c));
    }

    #[test]
    fn second_lookup_is_served_from_cache() {
        let cache = ResultCache::new(None);
        let selection = FilterSelection::everything(10);
        let mut runs = 0;

        let first = cache
            .get_or_try_insert_with(&selection, || {
                runs += 1;
                Ok::<_, Infallible>(sample_table())
            })
            .expect("first fetch");
        let second = cache
            .get_or_try_insert_with(&selection, || {
                runs += 1;
                Ok::<_, Infallible>(ResultTable::default())
            })
            .expect("second fetch");

        assert!(!first.cached);
        assert!(second.cached);
        assert_eq!(runs, 1);
        assert_eq!(second.table.len(), 1);
    }

    #[test]
    fn errors_are_not_cached() {
        let cache = ResultCache::new(None);
        let selection = FilterSelection::everything(10);

        let result = cache.get_or_try_insert_with(&selection, || Err::<ResultTable, _>("boom"));
        assert!(result.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn invalidate_and_clear_evict_entries() {
        let cache = ResultCache::new(None);
        let first = FilterSelection::everything(10);
        let second = FilterSelection::everything(20);
        cache.insert(&first, sample_table());
        cache.insert(&second, sample_table());

        assert!(cache.invalidate(&first));
        assert!(!cache.invalidate(&first));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.clear(), 1);
        assert!(cache.get(&second).is_none());
    }

    #[test]
    fn expired_entries_are_dropped_on_read() {
        let cache = ResultCache::new(Some(Duration::ZERO));
        let selection = FilterSelection::everything(10);
        cache.insert(&selection, sample_table());

        assert!(cache.get(&selection).is_none());
        assert!(cache.is_empty());
    }
}
