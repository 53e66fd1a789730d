//! Debounced search across items and stores.
//!
//! [`SearchManager`] turns keystrokes into search cycles:
//!
//! 1. `on_query_change` publishes the new text and restarts a single-slot
//!    debounce timer. Only the last query after a quiet period runs.
//! 2. A cycle asks the catalog for item and store matches concurrently and
//!    waits for both.
//! 3. The merged list (items first, then stores) is filtered by category
//!    and radius, sorted, and published on a `watch` channel.
//!
//! Every cycle takes a generation number; a cycle that finishes after a
//! newer one has started is discarded instead of published.

mod filter;

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument};

use lookoot_core::{GeoPoint, Item, Price, Store};

pub use filter::{FilterState, SortOption, sort_results};

use crate::config::SearchConfig;
use crate::db::{ItemRepository, RepositoryError, StoreRepository};
use crate::remote::DocumentStore;

// =============================================================================
// Results
// =============================================================================

/// One entry in a search result list.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchResult {
    Item(Item),
    Store(Store),
}

impl SearchResult {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Item(item) => item.id.as_str(),
            Self::Store(store) => store.id.as_str(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Item(item) => &item.name,
            Self::Store(store) => &store.name,
        }
    }

    #[must_use]
    pub fn categories(&self) -> &[String] {
        match self {
            Self::Item(item) => &item.categories,
            Self::Store(store) => &store.categories,
        }
    }

    #[must_use]
    pub const fn created_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Item(item) => item.created_at,
            Self::Store(store) => store.created_at,
        }
    }

    /// The item's price, or `sentinel` for a store.
    #[must_use]
    pub const fn price_or(&self, sentinel: Price) -> Price {
        match self {
            Self::Item(item) => item.price,
            Self::Store(_) => sentinel,
        }
    }

    /// The store's rating, or `sentinel` for an item.
    #[must_use]
    pub const fn rating_or(&self, sentinel: f64) -> f64 {
        match self {
            Self::Store(store) => store.rating,
            Self::Item(_) => sentinel,
        }
    }

    /// The store's review count, or `sentinel` for an item.
    #[must_use]
    pub fn review_count_or(&self, sentinel: i64) -> i64 {
        match self {
            Self::Store(store) => i64::from(store.review_count),
            Self::Item(_) => sentinel,
        }
    }

    #[must_use]
    pub const fn is_store(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}

/// State published to observers after every change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    /// Text as last entered, before debouncing.
    pub query: String,
    pub results: Vec<SearchResult>,
    pub is_loading: bool,
    pub error: Option<String>,
}

// =============================================================================
// Catalog
// =============================================================================

/// Where search cycles get their matches from.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn search_items(&self, query: &str) -> Result<Vec<Item>, RepositoryError>;
    async fn search_stores(&self, query: &str) -> Result<Vec<Store>, RepositoryError>;
}

/// Catalog backed by the item and store repositories.
pub struct RemoteCatalog {
    store: Arc<dyn DocumentStore>,
}

impl RemoteCatalog {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CatalogSource for RemoteCatalog {
    async fn search_items(&self, query: &str) -> Result<Vec<Item>, RepositoryError> {
        ItemRepository::new(self.store.as_ref()).search(query).await
    }

    async fn search_stores(&self, query: &str) -> Result<Vec<Store>, RepositoryError> {
        StoreRepository::new(self.store.as_ref()).search(query).await
    }
}

// =============================================================================
// Manager
// =============================================================================

/// Debounced search aggregation over a [`CatalogSource`].
///
/// Dropping the manager cancels a pending debounce timer. A search cycle
/// that has already started runs to completion.
pub struct SearchManager {
    inner: Arc<Inner>,
}

struct Inner {
    catalog: Arc<dyn CatalogSource>,
    debounce: Duration,
    state: watch::Sender<SearchState>,
    filters: Mutex<FilterState>,
    pending: Mutex<Option<JoinHandle<()>>>,
    generation: AtomicU64,
}

impl SearchManager {
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogSource>, config: &SearchConfig) -> Self {
        let (state, _) = watch::channel(SearchState::default());
        Self {
            inner: Arc::new(Inner {
                catalog,
                debounce: config.debounce,
                state,
                filters: Mutex::new(FilterState::new(config)),
                pending: Mutex::new(None),
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Observe state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.inner.state.subscribe()
    }

    /// Current published state.
    #[must_use]
    pub fn state(&self) -> SearchState {
        self.inner.state.borrow().clone()
    }

    #[must_use]
    pub fn filters(&self) -> FilterState {
        lock(&self.inner.filters).clone()
    }

    /// Record new query text and restart the debounce timer.
    ///
    /// Must be called from within a tokio runtime.
    pub fn on_query_change(&self, text: &str) {
        self.inner.state.send_modify(|s| text.clone_into(&mut s.query));

        let inner = Arc::clone(&self.inner);
        let query = text.to_owned();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(inner.debounce).await;
            // Detached so that a later keystroke cancels only the timer.
            tokio::spawn(async move { inner.run(&query).await });
        });

        if let Some(previous) = lock(&self.inner.pending).replace(timer) {
            previous.abort();
        }
    }

    /// Record `query` and run one search cycle for it immediately, bypassing
    /// the debounce timer.
    pub async fn search(&self, query: &str) {
        self.inner.state.send_modify(|s| query.clone_into(&mut s.query));
        self.inner.run(query).await;
    }

    /// Replace every filter at once without searching. The next cycle uses
    /// the new filters.
    pub fn replace_filters(&self, filters: FilterState) {
        *lock(&self.inner.filters) = filters;
    }

    /// Replace the sort options and re-sort the current results in place.
    pub fn update_filters(&self, options: Vec<SortOption>) {
        lock(&self.inner.filters).sort.clone_from(&options);
        self.inner
            .state
            .send_modify(|s| sort_results(&mut s.results, &options));
    }

    /// Replace the category selection and search the current query again.
    pub async fn update_categories<I>(&self, categories: I)
    where
        I: IntoIterator<Item = String>,
    {
        lock(&self.inner.filters).categories = categories.into_iter().collect();
        self.rerun().await;
    }

    /// Replace the search radius and search the current query again.
    pub async fn update_radius(&self, radius_km: f64) {
        lock(&self.inner.filters).radius_km = radius_km;
        self.rerun().await;
    }

    /// Replace the search origin and search the current query again.
    pub async fn update_location(&self, location: GeoPoint) {
        lock(&self.inner.filters).location = location;
        self.rerun().await;
    }

    /// Cancel a pending debounce timer.
    pub fn shutdown(&self) {
        if let Some(timer) = lock(&self.inner.pending).take() {
            timer.abort();
        }
    }

    async fn rerun(&self) {
        let query = self.inner.state.borrow().query.clone();
        self.inner.run(&query).await;
    }
}

impl Drop for SearchManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl Inner {
    #[instrument(skip(self), fields(generation = tracing::field::Empty))]
    async fn run(&self, query: &str) {
        let generation = self.generation.fetch_add(1, AtomicOrdering::SeqCst) + 1;
        tracing::Span::current().record("generation", generation);

        self.state.send_modify(|s| {
            s.is_loading = true;
            s.error = None;
        });

        let (items, stores) = tokio::join!(
            self.catalog.search_items(query),
            self.catalog.search_stores(query)
        );

        let mut merged = Vec::new();
        let mut failure = None;
        match items {
            Ok(items) => merged.extend(items.into_iter().map(SearchResult::Item)),
            Err(e) => {
                error!(error = %e, "Item search failed");
                failure = Some(e);
            }
        }
        match stores {
            Ok(stores) => merged.extend(stores.into_iter().map(SearchResult::Store)),
            Err(e) => {
                error!(error = %e, "Store search failed");
                failure = failure.or(Some(e));
            }
        }

        let results = lock(&self.filters).apply(merged);
        let error = failure.map(|e| format!("An error occurred: {e}"));
        debug!(count = results.len(), failed = error.is_some(), "Search finished");

        let current = &self.generation;
        let published = self.state.send_if_modified(|s| {
            if current.load(AtomicOrdering::SeqCst) != generation {
                return false;
            }
            s.results = results;
            s.is_loading = false;
            s.error = error;
            true
        });
        if !published {
            debug!("Discarded superseded search results");
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
