use std::sync::Arc;

use animals_catalog_sdk::CatalogError;
use parking_lot::Mutex;
use tracing::{debug, instrument, warn};

use super::{ClientFilter, PageSource};
use crate::domain::cache::{CacheKey, Epoch, MergeOutcome, ResponseCache};

/// Result of a load request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Page 1 was fetched and stored.
    Loaded,
    /// The new query's sequence was already cached; nothing was fetched.
    FromCache,
    /// Server-relevant parameters did not change.
    Unchanged,
    /// The next page was fetched and merged.
    Appended,
    Ignored(IgnoreReason),
    /// The response arrived after the list moved on and was not applied to
    /// the current sequence.
    Stale,
    Failed(CatalogError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// No query applied yet, or page 1 has not arrived.
    NotReady,
    /// A fetch for this list is already in flight.
    InFlight,
    /// The server reported no further pages.
    Exhausted,
    /// A previous failure stopped the list; refresh or change the query.
    Halted,
}

/// What a list view should render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListStatus {
    /// No query applied yet.
    Initial,
    /// Waiting for page 1.
    Loading,
    /// Page 1 failed; carries a user-facing message.
    Failed(String),
    /// The server has no records for the query.
    Empty,
    /// Records were fetched but none passes the client filter.
    FilteredOut,
    Ready,
}

/// Snapshot of a list for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView<T> {
    pub status: ListStatus,
    /// Fetched items passing the filter, in arrival order.
    pub items: Vec<T>,
    /// Server-side total for the query (ignores client filters).
    pub total: u64,
    pub has_more: bool,
    /// Number of fetched items before filtering.
    pub loaded: usize,
    pub loading_more: bool,
    /// Failure of the last page fetch when earlier pages are still shown.
    pub error: Option<CatalogError>,
}

impl<T> ListView<T> {
    fn without_items(status: ListStatus) -> Self {
        Self {
            status,
            items: Vec::new(),
            total: 0,
            has_more: false,
            loaded: 0,
            loading_more: false,
            error: None,
        }
    }
}

struct ListState<Q> {
    query: Option<Q>,
    key: Option<CacheKey>,
    /// Bumped on every reset; responses tagged with an older generation are
    /// stale.
    generation: u64,
    /// Epoch of the cache sequence this list reads; `None` until page 1.
    epoch: Option<Epoch>,
    in_flight: bool,
    error: Option<CatalogError>,
}

impl<Q> Default for ListState<Q> {
    fn default() -> Self {
        Self {
            query: None,
            key: None,
            generation: 0,
            epoch: None,
            in_flight: false,
            error: None,
        }
    }
}

impl<Q> ListState<Q> {
    /// Start a new sequence for `query`. Returns the new generation.
    fn reset(&mut self, query: Q, key: CacheKey) -> u64 {
        self.generation += 1;
        self.query = Some(query);
        self.key = Some(key);
        self.epoch = None;
        self.in_flight = false;
        self.error = None;
        self.generation
    }
}

/// Paged, filterable list backed by the response cache.
///
/// All methods take `&self`; the controller can be shared between the task
/// driving the view and the tasks issuing loads. Internal state is never
/// locked across an `.await`.
pub struct ListController<S: PageSource> {
    source: Arc<S>,
    cache: Arc<ResponseCache>,
    page_size: u32,
    state: Mutex<ListState<S::Query>>,
}

impl<S: PageSource> ListController<S> {
    #[must_use]
    pub fn new(source: Arc<S>, cache: Arc<ResponseCache>, page_size: u32) -> Self {
        Self {
            source,
            cache,
            page_size: page_size.max(1),
            state: Mutex::new(ListState::default()),
        }
    }

    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Currently applied server-relevant query.
    #[must_use]
    pub fn query(&self) -> Option<S::Query> {
        self.state.lock().query.clone()
    }

    /// Switch to `query`.
    ///
    /// Unchanged parameters are a no-op. Otherwise the list resets: a cached
    /// sequence for the new parameters is adopted as is, or page 1 is
    /// fetched. Responses still in flight for the old parameters are
    /// discarded when they arrive.
    #[instrument(skip_all)]
    pub async fn apply_query(&self, query: S::Query) -> LoadOutcome {
        let key = self.source.cache_key(&query);
        let generation = {
            let mut state = self.state.lock();
            let same = state.query.as_ref() == Some(&query);
            if same && (state.epoch.is_some() || state.in_flight) {
                debug!(key = %key, "query unchanged");
                return LoadOutcome::Unchanged;
            }

            let generation = state.reset(query.clone(), key.clone());
            if let Some(meta) = self.cache.page_meta(&key) {
                debug!(key = %key, pages = meta.pages_loaded, "adopting cached sequence");
                state.epoch = Some(meta.epoch);
                return LoadOutcome::FromCache;
            }
            state.in_flight = true;
            generation
        };

        self.fetch_first_page(generation, key, query).await
    }

    /// Drop the cached sequence of the current query and fetch page 1 again.
    #[instrument(skip_all)]
    pub async fn refresh(&self) -> LoadOutcome {
        let (generation, key, query) = {
            let mut state = self.state.lock();
            let (Some(query), Some(key)) = (state.query.clone(), state.key.clone()) else {
                return LoadOutcome::Ignored(IgnoreReason::NotReady);
            };
            let generation = state.reset(query.clone(), key.clone());
            state.in_flight = true;
            self.cache.reset(&key);
            (generation, key, query)
        };

        self.fetch_first_page(generation, key, query).await
    }

    async fn fetch_first_page(
        &self,
        generation: u64,
        key: CacheKey,
        query: S::Query,
    ) -> LoadOutcome {
        let result = self.source.fetch_page(&query, 1, self.page_size).await;

        let mut state = self.state.lock();
        if state.generation != generation {
            debug!(key = %key, "discarding stale first page");
            return LoadOutcome::Stale;
        }
        state.in_flight = false;
        match result {
            Ok(page) => {
                state.epoch = Some(self.cache.replace_page(key, page));
                LoadOutcome::Loaded
            }
            Err(err) => {
                warn!(key = %key, error = %err, "first page failed");
                state.error = Some(err.clone());
                LoadOutcome::Failed(err)
            }
        }
    }

    /// Fetch and merge the next page of the current sequence.
    ///
    /// Ignored before page 1 has arrived, while another fetch is in flight,
    /// when the server reported no more pages, or after a failure.
    #[instrument(skip_all)]
    pub async fn load_more(&self) -> LoadOutcome {
        let (generation, key, query, epoch, next_page) = {
            let mut state = self.state.lock();
            if state.in_flight {
                return LoadOutcome::Ignored(IgnoreReason::InFlight);
            }
            if state.error.is_some() {
                return LoadOutcome::Ignored(IgnoreReason::Halted);
            }
            let (Some(query), Some(key), Some(_)) =
                (state.query.clone(), state.key.clone(), state.epoch)
            else {
                return LoadOutcome::Ignored(IgnoreReason::NotReady);
            };
            let Some(meta) = self.cache.page_meta(&key) else {
                return LoadOutcome::Ignored(IgnoreReason::NotReady);
            };
            if !meta.has_more {
                return LoadOutcome::Ignored(IgnoreReason::Exhausted);
            }
            // Someone else may have restarted the shared sequence.
            state.epoch = Some(meta.epoch);
            state.in_flight = true;
            (
                state.generation,
                key,
                query,
                meta.epoch,
                meta.pages_loaded + 1,
            )
        };

        let result = self.source.fetch_page(&query, next_page, self.page_size).await;

        let mut state = self.state.lock();
        let current = state.generation == generation;
        if current {
            state.in_flight = false;
        }
        match result {
            Ok(page) => {
                // The epoch pins the merge to the sequence the request
                // belongs to, current or not.
                let merged = self.cache.append_page(&key, epoch, next_page, page);
                match (current, merged) {
                    (true, MergeOutcome::Appended { .. }) => LoadOutcome::Appended,
                    _ => {
                        debug!(key = %key, page = next_page, "page not applied to current list");
                        LoadOutcome::Stale
                    }
                }
            }
            Err(_) if !current => LoadOutcome::Stale,
            Err(err) => {
                warn!(key = %key, page = next_page, error = %err, "next page failed");
                state.error = Some(err.clone());
                LoadOutcome::Failed(err)
            }
        }
    }

    /// Whether a `load_more` call would fetch anything right now.
    #[must_use]
    pub fn can_load_more(&self) -> bool {
        let state = self.state.lock();
        if state.in_flight || state.error.is_some() || state.epoch.is_none() {
            return false;
        }
        state
            .key
            .as_ref()
            .and_then(|key| self.cache.page_meta(key))
            .is_some_and(|meta| meta.has_more)
    }

    /// Current items narrowed by `filter`.
    #[must_use]
    pub fn view<F>(&self, filter: &F) -> ListView<S::Item>
    where
        F: ClientFilter<S::Item> + ?Sized,
    {
        let state = self.state.lock();
        let Some(key) = &state.key else {
            return ListView::without_items(ListStatus::Initial);
        };

        let Some((list, _)) = self.cache.page::<S::Item>(key) else {
            let status = match &state.error {
                Some(err) => ListStatus::Failed(err.user_message()),
                None if state.in_flight => ListStatus::Loading,
                None => ListStatus::Initial,
            };
            let mut view = ListView::without_items(status);
            view.error.clone_from(&state.error);
            return view;
        };

        let loaded = list.items.len();
        let items: Vec<S::Item> = if filter.is_active() {
            list.items
                .into_iter()
                .filter(|item| filter.matches(item))
                .collect()
        } else {
            list.items
        };
        let status = if loaded == 0 {
            ListStatus::Empty
        } else if items.is_empty() {
            ListStatus::FilteredOut
        } else {
            ListStatus::Ready
        };

        ListView {
            status,
            items,
            total: list.total,
            has_more: list.has_more,
            loaded,
            loading_more: state.in_flight,
            error: state.error.clone(),
        }
    }
}
