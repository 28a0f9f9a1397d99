//! Session-wide response cache.
//!
//! Entries are keyed by operation plus its key arguments only, so every
//! page of one list sequence lands in the same entry. A paged entry carries
//! an [`Epoch`]: replacing page 1 starts a new epoch, and an append tagged
//! with an older epoch is dropped instead of being merged into the new
//! sequence.
//!
//! Plain values are fetched at most once at a time per key: concurrent
//! callers of [`ResponseCache::get_or_fetch`] queue behind the pending fetch
//! and read its result from the cache.

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use animals_catalog_sdk::{CatalogError, PaginatedResponse};
use parking_lot::{Mutex, RwLock};
use serde_json::{Map, Value};
use tokio::sync::Mutex as FetchLock;
use tracing::{debug, trace};

use crate::infra::graphql::Operation;

/// Identity of a cache entry: operation name plus canonical key arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    operation: Operation,
    args: String,
}

impl CacheKey {
    /// Build the key for `operation` called with `variables`. Variables that
    /// are not key arguments (`page`, `take`) are ignored, as are nulls.
    #[must_use]
    pub fn new(operation: Operation, variables: &Value) -> Self {
        let mut picked = Map::new();
        if let Some(vars) = variables.as_object() {
            for name in operation.key_args() {
                if let Some(value) = vars.get(*name).filter(|v| !v.is_null()) {
                    picked.insert((*name).to_owned(), canonical(value));
                }
            }
        }
        Self {
            operation,
            args: Value::Object(picked).to_string(),
        }
    }

    /// Key of a parameterless operation.
    #[must_use]
    pub fn of(operation: Operation) -> Self {
        Self::new(operation, &Value::Null)
    }

    #[must_use]
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Canonical JSON of the key arguments.
    #[must_use]
    pub fn args(&self) -> &str {
        &self.args
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.operation, self.args)
    }
}

fn canonical(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                sorted.insert(key.clone(), canonical(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonical).collect()),
        other => other.clone(),
    }
}

/// Generation tag of a paged entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Epoch(u64);

/// Shape of a paged entry without its items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageMeta {
    pub epoch: Epoch,
    pub pages_loaded: u32,
    pub len: usize,
    pub total: u64,
    pub has_more: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// No paged entry for the key (never loaded, or reset meanwhile).
    Missing,
    /// The entry was replaced since the request was issued.
    EpochMismatch,
    /// The page does not directly follow the pages already merged.
    OutOfOrder,
    /// The entry holds items of another type.
    TypeMismatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Appended { pages_loaded: u32, len: usize },
    Discarded(DiscardReason),
}

struct PagedEntry {
    epoch: Epoch,
    pages_loaded: u32,
    len: usize,
    total: u64,
    has_more: bool,
    // `PaginatedResponse<T>` of the accumulated items
    list: Box<dyn Any + Send + Sync>,
}

impl PagedEntry {
    fn meta(&self) -> PageMeta {
        PageMeta {
            epoch: self.epoch,
            pages_loaded: self.pages_loaded,
            len: self.len,
            total: self.total,
            has_more: self.has_more,
        }
    }
}

enum Entry {
    Paged(PagedEntry),
    Value(Box<dyn Any + Send + Sync>),
}

/// Keyed store of decoded responses, shared by list controllers and the
/// statistics aggregator for the lifetime of a session.
#[derive(Default)]
pub struct ResponseCache {
    entries: RwLock<HashMap<CacheKey, Entry>>,
    next_epoch: AtomicU64,
    in_flight: Mutex<HashMap<CacheKey, Arc<FetchLock<()>>>>,
}

impl std::fmt::Debug for ResponseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseCache")
            .field("entries", &self.len())
            .finish_non_exhaustive()
    }
}

impl ResponseCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn bump_epoch(&self) -> Epoch {
        Epoch(self.next_epoch.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Accumulated list stored under `key`, with its shape.
    #[must_use]
    pub fn page<T>(&self, key: &CacheKey) -> Option<(PaginatedResponse<T>, PageMeta)>
    where
        T: Clone + Send + Sync + 'static,
    {
        let entries = self.entries.read();
        match entries.get(key)? {
            Entry::Paged(entry) => entry
                .list
                .downcast_ref::<PaginatedResponse<T>>()
                .map(|list| (list.clone(), entry.meta())),
            Entry::Value(_) => None,
        }
    }

    #[must_use]
    pub fn page_meta(&self, key: &CacheKey) -> Option<PageMeta> {
        match self.entries.read().get(key)? {
            Entry::Paged(entry) => Some(entry.meta()),
            Entry::Value(_) => None,
        }
    }

    /// Store `page` as page 1 of a fresh sequence under `key`.
    pub fn replace_page<T>(&self, key: CacheKey, page: PaginatedResponse<T>) -> Epoch
    where
        T: Send + Sync + 'static,
    {
        let epoch = self.bump_epoch();
        let entry = PagedEntry {
            epoch,
            pages_loaded: 1,
            len: page.items.len(),
            total: page.total,
            has_more: page.has_more,
            list: Box::new(page),
        };
        debug!(key = %key, len = entry.len, "cache page 1 stored");
        self.entries.write().insert(key, Entry::Paged(entry));
        epoch
    }

    /// Merge page `page_number` onto the sequence started at `epoch`.
    ///
    /// Items are concatenated, existing first; `total` and `has_more` come
    /// from the incoming page.
    pub fn append_page<T>(
        &self,
        key: &CacheKey,
        epoch: Epoch,
        page_number: u32,
        page: PaginatedResponse<T>,
    ) -> MergeOutcome
    where
        T: Send + Sync + 'static,
    {
        let mut entries = self.entries.write();
        let Some(Entry::Paged(entry)) = entries.get_mut(key) else {
            return discard(key, DiscardReason::Missing);
        };
        if entry.epoch != epoch {
            return discard(key, DiscardReason::EpochMismatch);
        }
        if page_number != entry.pages_loaded + 1 {
            return discard(key, DiscardReason::OutOfOrder);
        }
        let Some(list) = entry.list.downcast_mut::<PaginatedResponse<T>>() else {
            return discard(key, DiscardReason::TypeMismatch);
        };

        list.items.extend(page.items);
        list.total = page.total;
        list.has_more = page.has_more;

        entry.pages_loaded = page_number;
        entry.len = list.items.len();
        entry.total = list.total;
        entry.has_more = list.has_more;
        debug!(key = %key, page = page_number, len = entry.len, "cache page merged");

        MergeOutcome::Appended {
            pages_loaded: entry.pages_loaded,
            len: entry.len,
        }
    }

    #[must_use]
    pub fn value<T>(&self, key: &CacheKey) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        match self.entries.read().get(key)? {
            Entry::Value(value) => value.downcast_ref::<T>().cloned(),
            Entry::Paged(_) => None,
        }
    }

    pub fn put_value<T>(&self, key: CacheKey, value: T)
    where
        T: Send + Sync + 'static,
    {
        trace!(key = %key, "cache value stored");
        self.entries.write().insert(key, Entry::Value(Box::new(value)));
    }

    /// Return the cached value for `key`, or run `fetch` and cache its
    /// success.
    ///
    /// While a fetch for `key` is pending, later callers wait for it and
    /// take its cached result instead of running their own `fetch`.
    /// Failures are not cached: a waiter that finds nothing after the
    /// pending fetch failed runs its own.
    ///
    /// # Errors
    /// Whatever `fetch` fails with.
    pub async fn get_or_fetch<T, F>(&self, key: CacheKey, fetch: F) -> Result<T, CatalogError>
    where
        T: Clone + Send + Sync + 'static,
        F: Future<Output = Result<T, CatalogError>>,
    {
        if let Some(hit) = self.value::<T>(&key) {
            trace!(key = %key, "cache hit");
            return Ok(hit);
        }

        let lock = self.in_flight.lock().entry(key.clone()).or_default().clone();
        let result = {
            let _guard = lock.lock().await;
            if let Some(hit) = self.value::<T>(&key) {
                trace!(key = %key, "cache hit after pending fetch");
                Ok(hit)
            } else {
                let fetched = fetch.await;
                if let Ok(value) = &fetched {
                    self.put_value(key.clone(), value.clone());
                }
                fetched
            }
        };
        self.release_fetch_lock(&key, &lock);
        result
    }

    /// Forget the per-key fetch lock once no other caller holds it.
    fn release_fetch_lock(&self, key: &CacheKey, lock: &Arc<FetchLock<()>>) {
        let mut in_flight = self.in_flight.lock();
        // One reference in the map, one held by the caller.
        let ours = in_flight.get(key).is_some_and(|held| Arc::ptr_eq(held, lock));
        if ours && Arc::strong_count(lock) <= 2 {
            in_flight.remove(key);
        }
    }

    /// Drop the entry for `key`. Returns whether one existed.
    pub fn reset(&self, key: &CacheKey) -> bool {
        let removed = self.entries.write().remove(key).is_some();
        if removed {
            debug!(key = %key, "cache entry reset");
        }
        removed
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    #[must_use]
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.read().contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn discard(key: &CacheKey, reason: DiscardReason) -> MergeOutcome {
    debug!(key = %key, reason = ?reason, "cache page discarded");
    MergeOutcome::Discarded(reason)
}
