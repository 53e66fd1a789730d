//! Typed repositories over the document store.
//!
//! # Collections
//!
//! - `users` - Account profiles, keyed by the authentication uid
//! - `stores` - Store listings with location, hours and review aggregates
//! - `items` - Store inventory, linked by `storeId`
//! - `reviews` - Store and item reviews, linked by `storeId` / `itemId`
//!
//! Field names on the wire are camelCase. Documents are decoded leniently:
//! a missing or malformed field takes its default instead of failing the
//! whole document.

pub mod items;
pub mod reviews;
pub mod stores;
pub mod users;

use std::collections::HashSet;
use std::time::Duration;

use moka::future::Cache;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use lookoot_core::{Store, StoreId};

use crate::remote::{Collection, Document, DocumentStore, Query, Snapshot, StoreError};

pub use items::ItemRepository;
pub use reviews::{RatingSummary, ReviewRepository};
pub use stores::StoreRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Document store error.
    #[error("document store error: {0}")]
    Store(StoreError),

    /// Stored data could not be encoded or decoded.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., username already taken).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// The bounded wait for a response elapsed.
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

impl From<StoreError> for RepositoryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => Self::NotFound,
            other => Self::Store(other),
        }
    }
}

/// Encode a model into a document body.
pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Document, RepositoryError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(RepositoryError::DataCorruption(format!(
            "expected an object, encoded {other}"
        ))),
        Err(e) => Err(RepositoryError::DataCorruption(e.to_string())),
    }
}

/// Decode a document, taking its identifier from the document key rather
/// than any `id` field stored in the body.
pub(crate) fn decode<T: DeserializeOwned>(id: &str, mut data: Document) -> Result<T, RepositoryError> {
    data.insert("id".to_owned(), Value::String(id.to_owned()));
    serde_json::from_value(Value::Object(data))
        .map_err(|e| RepositoryError::DataCorruption(format!("document {id}: {e}")))
}

pub(crate) fn decode_all<T: DeserializeOwned>(
    snapshots: Vec<Snapshot>,
) -> Result<Vec<T>, RepositoryError> {
    snapshots
        .into_iter()
        .map(|s| decode(&s.id, s.data))
        .collect()
}

/// Build a partial-update body from field/value pairs.
pub(crate) fn fields<const N: usize>(pairs: [(&str, Value); N]) -> Document {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v))
        .collect()
}

/// Text search over one collection.
///
/// Exact matches (a tag equal to the lower-cased query) come first, followed
/// by partial matches, de-duplicated by identifier keeping the first
/// occurrence. The query is lower-cased but otherwise matched as typed,
/// surrounding whitespace included. A blank query returns every document.
pub(crate) async fn search_collection<T, F>(
    store: &dyn DocumentStore,
    collection: Collection,
    text: &str,
    id_of: impl Fn(&T) -> &str,
    matches_partial: F,
) -> Result<Vec<T>, RepositoryError>
where
    T: DeserializeOwned,
    F: Fn(&T, &str) -> bool,
{
    let needle = text.to_lowercase();
    let everything: Vec<T> = decode_all(store.query(&Query::new(collection)).await?)?;
    if needle.trim().is_empty() {
        return Ok(everything);
    }

    let exact: Vec<T> = decode_all(
        store
            .query(&Query::new(collection).where_array_contains("tags", needle.as_str()))
            .await?,
    )?;

    let mut seen = HashSet::new();
    let results: Vec<T> = exact
        .into_iter()
        .chain(everything.into_iter().filter(|doc| matches_partial(doc, &needle)))
        .filter(|doc| seen.insert(id_of(doc).to_owned()))
        .collect();
    debug!(%collection, query = %needle, count = results.len(), "Searched collection");
    Ok(results)
}

/// Cache for store lookups by id.
///
/// Entries expire after the configured TTL and are invalidated by the
/// store repository on update and delete.
#[derive(Clone)]
pub struct StoreCache {
    inner: Cache<StoreId, Store>,
}

impl StoreCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(1000)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub async fn get(&self, id: &StoreId) -> Option<Store> {
        self.inner.get(id).await
    }

    pub async fn insert(&self, store: Store) {
        self.inner.insert(store.id.clone(), store).await;
    }

    pub async fn invalidate(&self, id: &StoreId) {
        self.inner.invalidate(id).await;
    }
}

impl std::fmt::Debug for StoreCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreCache")
            .field("entries", &self.inner.entry_count())
            .finish()
    }
}
