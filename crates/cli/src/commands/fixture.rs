//! YAML fixtures for the in-memory backend.
//!
//! A fixture lists raw documents per collection. Every document needs a
//! string `id`; the remaining fields are stored as-is, so fixtures can
//! contain the same malformed data a live backend might.
//!
//! ```yaml
//! stores:
//!   - id: s1
//!     name: Shoe World
//!     tags: [shoes, trainers]
//! items:
//!   - id: i1
//!     storeId: s1
//!     name: Running Shoe
//!     price: 59.99
//! ```

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use lookoot_client::remote::{Collection, Document, DocumentStore, StoreError};

/// Errors that can occur while loading a fixture.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// Fixture file does not exist.
    #[error("File not found: {0}")]
    NotFound(String),

    /// Fixture file could not be read.
    #[error("Failed to read fixture: {0}")]
    Io(#[from] std::io::Error),

    /// Fixture file is not valid YAML for the fixture layout.
    #[error("Invalid fixture: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A document has no usable `id`.
    #[error("{collection} document #{index} has no string id")]
    MissingId {
        collection: Collection,
        index: usize,
    },

    /// Writing to the document store failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Documents to load, grouped by collection.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Fixture {
    pub users: Vec<Document>,
    pub stores: Vec<Document>,
    pub items: Vec<Document>,
    pub reviews: Vec<Document>,
}

/// How many documents were written per collection.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FixtureCounts {
    pub users: usize,
    pub stores: usize,
    pub items: usize,
    pub reviews: usize,
}

impl FixtureCounts {
    #[must_use]
    pub const fn total(&self) -> usize {
        self.users + self.stores + self.items + self.reviews
    }
}

impl Fixture {
    /// Parse a fixture from YAML text.
    ///
    /// # Errors
    ///
    /// Returns `FixtureError::Yaml` if the text is not a fixture.
    pub fn parse(yaml: &str) -> Result<Self, FixtureError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read and parse a fixture file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable or malformed.
    pub async fn load(file_path: &str) -> Result<Self, FixtureError> {
        let path = Path::new(file_path);
        if !path.exists() {
            return Err(FixtureError::NotFound(file_path.to_string()));
        }

        info!(path = %file_path, "Loading fixture");
        let content = tokio::fs::read_to_string(path).await?;
        Self::parse(&content)
    }

    /// Write every document into `store`, keyed by its `id` field.
    ///
    /// Documents are checked before anything is written, so a fixture with a
    /// missing id leaves the store untouched.
    ///
    /// # Errors
    ///
    /// Returns `FixtureError::MissingId` for a document without an id and
    /// `FixtureError::Store` if a write fails.
    pub async fn apply(&self, store: &dyn DocumentStore) -> Result<FixtureCounts, FixtureError> {
        let batches = [
            (Collection::Users, &self.users),
            (Collection::Stores, &self.stores),
            (Collection::Items, &self.items),
            (Collection::Reviews, &self.reviews),
        ];

        let mut keyed = Vec::new();
        for (collection, docs) in batches {
            for (index, doc) in docs.iter().enumerate() {
                let id = match doc.get("id") {
                    Some(Value::String(id)) if !id.trim().is_empty() => id.trim().to_string(),
                    _ => return Err(FixtureError::MissingId { collection, index }),
                };
                keyed.push((collection, id, doc));
            }
        }

        for (collection, id, doc) in keyed {
            debug!(%collection, %id, "Writing fixture document");
            store.set(collection, &id, doc.clone()).await?;
        }

        let counts = FixtureCounts {
            users: self.users.len(),
            stores: self.stores.len(),
            items: self.items.len(),
            reviews: self.reviews.len(),
        };
        info!(
            users = counts.users,
            stores = counts.stores,
            items = counts.items,
            reviews = counts.reviews,
            "Fixture loaded"
        );
        Ok(counts)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use lookoot_client::remote::MemoryStore;

    const SAMPLE: &str = r"
stores:
  - id: s1
    name: Shoe World
    tags: shoes, trainers
items:
  - id: i1
    storeId: s1
    name: Running Shoe
    price: 59.99
";

    #[tokio::test]
    async fn test_apply_writes_documents_by_id() {
        let store = MemoryStore::new();
        let counts = Fixture::parse(SAMPLE).unwrap().apply(&store).await.unwrap();

        assert_eq!(counts.stores, 1);
        assert_eq!(counts.total(), 2);
        let doc = store.get(Collection::Items, "i1").await.unwrap().unwrap();
        assert_eq!(doc["name"], "Running Shoe");
    }

    #[tokio::test]
    async fn test_missing_id_writes_nothing() {
        let store = MemoryStore::new();
        let fixture = Fixture::parse(
            r"
stores:
  - id: s1
items:
  - name: No id
",
        )
        .unwrap();

        let err = fixture.apply(&store).await.unwrap_err();
        assert!(matches!(
            err,
            FixtureError::MissingId {
                collection: Collection::Items,
                index: 0
            }
        ));
        assert_eq!(store.len(Collection::Stores).await, 0);
    }

    #[test]
    fn test_empty_fixture() {
        let fixture = Fixture::parse("{}").unwrap();
        assert!(fixture.stores.is_empty());
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = Fixture::load("does/not/exist.yaml").await.unwrap_err();
        assert!(matches!(err, FixtureError::NotFound(_)));
    }
}
