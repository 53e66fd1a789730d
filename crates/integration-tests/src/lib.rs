//! Integration tests for Lookoot.
//!
//! Everything runs against the in-memory backends, so no services need to be
//! running:
//!
//! ```bash
//! cargo test -p lookoot-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `search_flow` - Search results, filters and sorting end to end
//! - `debounce` - Keystroke debouncing on a paused clock
//! - `cascade_delete` - Store and item deletion
//! - `accounts` - Sign-up, login, profile edits and deletion
//! - `admin` - Store-owner requests and role changes
//!
//! This crate provides the shared harness: seeded application state and
//! backend wrappers that count or fail calls.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::Value;

use lookoot_client::AppState;
use lookoot_client::config::ClientConfig;
use lookoot_client::db::{RepositoryError, UserRepository};
use lookoot_client::remote::{
    Collection, Document, DocumentStore, MemoryBlobStore, MemoryStore, Query, Snapshot, StoreError,
};
use lookoot_client::search::CatalogSource;
use lookoot_client::services::MemoryAuthProvider;
use lookoot_core::{GeoPoint, Item, Price, Store, Tags, User, UserId, UserRole};

// =============================================================================
// Builders
// =============================================================================

/// A store with the given name, categories and tags and no location.
#[must_use]
pub fn store(name: &str, categories: &[&str], tags: &[&str]) -> Store {
    Store {
        name: name.to_owned(),
        categories: categories.iter().map(ToString::to_string).collect(),
        tags: Tags::new(tags.iter().copied()),
        ..Default::default()
    }
}

/// A store placed at `location`.
#[must_use]
pub fn store_at(name: &str, location: GeoPoint) -> Store {
    Store {
        location: Some(location),
        ..store(name, &[], &[])
    }
}

/// An item priced in pence.
#[must_use]
pub fn item(store: &Store, name: &str, pence: i64, categories: &[&str]) -> Item {
    Item {
        store_id: store.id.clone(),
        name: name.to_owned(),
        price: Price::from_pence(pence),
        categories: categories.iter().map(ToString::to_string).collect(),
        ..Default::default()
    }
}

// =============================================================================
// Test Context
// =============================================================================

/// Application state over in-memory backends, plus a store owner and an
/// administrator already signed up.
pub struct TestContext {
    pub state: AppState,
    pub owner: User,
    pub admin: User,
}

impl TestContext {
    /// # Panics
    ///
    /// Panics if the seed users cannot be written.
    pub async fn new() -> Self {
        Self::with_config(ClientConfig::default()).await
    }

    /// # Panics
    ///
    /// Panics if the seed users cannot be written.
    pub async fn with_config(config: ClientConfig) -> Self {
        let state = AppState::in_memory(config);
        let users = UserRepository::new(state.store());
        let owner = users
            .create(&User {
                id: UserId::new("owner"),
                username: "owner".into(),
                role: UserRole::StoreOwner,
                ..Default::default()
            })
            .await
            .expect("Failed to seed store owner");
        let admin = users
            .create(&User {
                id: UserId::new("admin"),
                username: "admin".into(),
                role: UserRole::Admin,
                ..Default::default()
            })
            .await
            .expect("Failed to seed admin");
        Self {
            state,
            owner,
            admin,
        }
    }

    /// Open `store` as the seeded owner.
    ///
    /// # Panics
    ///
    /// Panics if the store cannot be created.
    pub async fn open(&self, store: &Store) -> Store {
        self.state
            .stores()
            .create_store(&self.owner, store)
            .await
            .expect("Failed to open store")
    }

    /// Stock `item` as the seeded owner.
    ///
    /// # Panics
    ///
    /// Panics if the item cannot be created.
    pub async fn stock(&self, item: &Item) -> Item {
        self.state
            .stores()
            .add_item(&self.owner, item)
            .await
            .expect("Failed to add item")
    }
}

// =============================================================================
// Catalog Wrappers
// =============================================================================

/// Records every query a search cycle sends to the wrapped catalog.
pub struct CountingCatalog {
    inner: Arc<dyn CatalogSource>,
    queries: Mutex<Vec<String>>,
}

impl CountingCatalog {
    #[must_use]
    pub fn new(inner: Arc<dyn CatalogSource>) -> Self {
        Self {
            inner,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Queries that reached the item lookup, oldest first.
    #[must_use]
    pub fn queries(&self) -> Vec<String> {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl CatalogSource for CountingCatalog {
    async fn search_items(&self, query: &str) -> Result<Vec<Item>, RepositoryError> {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(query.to_owned());
        self.inner.search_items(query).await
    }

    async fn search_stores(&self, query: &str) -> Result<Vec<Store>, RepositoryError> {
        self.inner.search_stores(query).await
    }
}

// =============================================================================
// Document Store Wrappers
// =============================================================================

/// In-memory store whose queries on one collection can be made to fail.
pub struct FlakyStore {
    inner: MemoryStore,
    failing: Collection,
    enabled: AtomicBool,
    queries: AtomicUsize,
}

impl FlakyStore {
    /// Queries on `failing` return `StoreError::Unavailable` once enabled.
    #[must_use]
    pub fn new(failing: Collection) -> Self {
        Self {
            inner: MemoryStore::new(),
            failing,
            enabled: AtomicBool::new(false),
            queries: AtomicUsize::new(0),
        }
    }

    pub fn set_failing(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Number of queries seen, failed or not.
    #[must_use]
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError> {
        self.inner.get(collection, id).await
    }

    async fn add(&self, collection: Collection, data: Document) -> Result<String, StoreError> {
        self.inner.add(collection, data).await
    }

    async fn set(&self, collection: Collection, id: &str, data: Document) -> Result<(), StoreError> {
        self.inner.set(collection, id, data).await
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        fields: Document,
    ) -> Result<(), StoreError> {
        self.inner.update(collection, id, fields).await
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        self.inner.delete(collection, id).await
    }

    async fn query(&self, query: &Query) -> Result<Vec<Snapshot>, StoreError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if query.collection == self.failing && self.enabled.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!(
                "{} is offline",
                query.collection
            )));
        }
        self.inner.query(query).await
    }

    async fn array_union(
        &self,
        collection: Collection,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), StoreError> {
        self.inner.array_union(collection, id, field, value).await
    }

    async fn array_remove(
        &self,
        collection: Collection,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), StoreError> {
        self.inner.array_remove(collection, id, field, value).await
    }
}

/// Application state over a caller-supplied document store.
#[must_use]
pub fn state_over(store: Arc<dyn DocumentStore>) -> AppState {
    let config = ClientConfig::default();
    let blobs = MemoryBlobStore::new(config.storage_base_url.clone());
    AppState::new(
        config,
        store,
        Arc::new(blobs),
        Arc::new(MemoryAuthProvider::new()),
    )
}
