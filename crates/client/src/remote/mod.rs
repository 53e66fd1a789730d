//! Seam to the managed document database.
//!
//! Documents are schemaless JSON objects addressed by collection and string
//! identifier. Repositories in [`crate::db`] decode them into the typed
//! models from `lookoot-core`; nothing above this module touches raw
//! documents.

mod blob;
mod memory;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

pub use blob::{BlobStore, MemoryBlobStore};
pub use memory::MemoryStore;

/// A raw document body.
pub type Document = Map<String, Value>;

/// Top-level collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Users,
    Stores,
    Items,
    Reviews,
}

impl Collection {
    pub const ALL: [Self; 4] = [Self::Users, Self::Stores, Self::Items, Self::Reviews];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Stores => "stores",
            Self::Items => "items",
            Self::Reviews => "reviews",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by a document store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `update` targeted a document that does not exist.
    #[error("no document {id} in {collection}")]
    NotFound { collection: Collection, id: String },

    /// Backend could not be reached or rejected the request.
    #[error("document store unavailable: {0}")]
    Unavailable(String),

    /// Document body could not be encoded.
    #[error("invalid document: {0}")]
    InvalidDocument(String),
}

/// A single query predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Field equals value.
    Eq(String, Value),
    /// Array field contains value.
    ArrayContains(String, Value),
}

impl Filter {
    /// Whether `doc` satisfies this predicate.
    #[must_use]
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Self::Eq(field, value) => doc.get(field) == Some(value),
            Self::ArrayContains(field, value) => doc
                .get(field)
                .and_then(Value::as_array)
                .is_some_and(|values| values.contains(value)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// A collection query: conjunctive filters, optional ordering and limit.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: Collection,
    pub filters: Vec<Filter>,
    pub order_by: Option<(String, Direction)>,
    pub limit: Option<usize>,
}

impl Query {
    #[must_use]
    pub const fn new(collection: Collection) -> Self {
        Self {
            collection,
            filters: Vec::new(),
            order_by: None,
            limit: None,
        }
    }

    #[must_use]
    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Eq(field.into(), value.into()));
        self
    }

    #[must_use]
    pub fn where_array_contains(
        mut self,
        field: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.filters
            .push(Filter::ArrayContains(field.into(), value.into()));
        self
    }

    #[must_use]
    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some((field.into(), direction));
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// A document returned from a query, with its identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub id: String,
    pub data: Document,
}

/// A schemaless document database.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document, `None` if absent.
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError>;

    /// Insert a document under a server-generated identifier.
    async fn add(&self, collection: Collection, data: Document) -> Result<String, StoreError>;

    /// Create or overwrite the document at `id`.
    async fn set(&self, collection: Collection, id: &str, data: Document)
    -> Result<(), StoreError>;

    /// Merge `fields` into an existing document.
    ///
    /// Fails with [`StoreError::NotFound`] when the document does not exist.
    async fn update(
        &self,
        collection: Collection,
        id: &str,
        fields: Document,
    ) -> Result<(), StoreError>;

    /// Delete a document. Deleting a missing document succeeds.
    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError>;

    async fn query(&self, query: &Query) -> Result<Vec<Snapshot>, StoreError>;

    /// Add `value` to the array at `field` unless already present.
    async fn array_union(
        &self,
        collection: Collection,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), StoreError> {
        let doc = self
            .get(collection, id)
            .await?
            .ok_or_else(|| StoreError::NotFound {
                collection,
                id: id.to_owned(),
            })?;
        let mut values = doc
            .get(field)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        if !values.contains(&value) {
            values.push(value);
        }
        let mut fields = Document::new();
        fields.insert(field.to_owned(), Value::Array(values));
        self.update(collection, id, fields).await
    }

    /// Remove every occurrence of `value` from the array at `field`.
    async fn array_remove(
        &self,
        collection: Collection,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), StoreError> {
        let doc = self
            .get(collection, id)
            .await?
            .ok_or_else(|| StoreError::NotFound {
                collection,
                id: id.to_owned(),
            })?;
        let values: Vec<Value> = doc
            .get(field)
            .and_then(Value::as_array)
            .map(|values| values.iter().filter(|v| **v != value).cloned().collect())
            .unwrap_or_default();
        let mut fields = Document::new();
        fields.insert(field.to_owned(), Value::Array(values));
        self.update(collection, id, fields).await
    }
}
