//! Item repository.

use chrono::Utc;
use serde_json::json;
use tracing::{info, instrument};

use lookoot_core::{Item, ItemId, StoreId};

use super::{RepositoryError, decode, decode_all, encode, search_collection};
use crate::remote::{Collection, Direction, DocumentStore, Query};

/// Repository for the `items` collection.
pub struct ItemRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> ItemRepository<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Add an item to a store's inventory, stamping both timestamps.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the write fails.
    pub async fn create(&self, item: &Item) -> Result<Item, RepositoryError> {
        let now = Utc::now();
        let mut created = Item {
            created_at: Some(now),
            last_updated: Some(now),
            ..item.clone()
        };
        let mut data = encode(&created)?;
        data.remove("id");
        let id = self.store.add(Collection::Items, data).await?;
        created.id = ItemId::new(id);
        info!(item_id = %created.id, store_id = %created.store_id, "Created item");
        Ok(created)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the lookup fails.
    pub async fn get(&self, id: &ItemId) -> Result<Option<Item>, RepositoryError> {
        self.store
            .get(Collection::Items, id.as_str())
            .await?
            .map(|data| decode(id.as_str(), data))
            .transpose()
    }

    /// Overwrite an item's editable fields and stamp `lastUpdated`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item does not exist.
    pub async fn update(&self, item: &Item) -> Result<(), RepositoryError> {
        let mut data = encode(item)?;
        data.remove("id");
        data.remove("createdAt");
        data.remove("wishlistedBy");
        data.insert("lastUpdated".to_owned(), json!(Utc::now()));
        self.store
            .update(Collection::Items, item.id.as_str(), data)
            .await?;
        info!(item_id = %item.id, "Updated item");
        Ok(())
    }

    /// Delete an item and every review of it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if any delete fails.
    #[instrument(skip(self, id), fields(item_id = %id))]
    pub async fn delete(&self, id: &ItemId) -> Result<(), RepositoryError> {
        let reviews = self
            .store
            .query(&Query::new(Collection::Reviews).where_eq("itemId", id.as_str()))
            .await?;
        for review in &reviews {
            self.store.delete(Collection::Reviews, &review.id).await?;
        }
        self.store.delete(Collection::Items, id.as_str()).await?;
        info!(reviews = reviews.len(), "Deleted item");
        Ok(())
    }

    /// A store's inventory, most recently updated first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the query fails.
    pub async fn list_by_store(&self, store_id: &StoreId) -> Result<Vec<Item>, RepositoryError> {
        let query = Query::new(Collection::Items)
            .where_eq("storeId", store_id.as_str())
            .order_by("lastUpdated", Direction::Descending);
        decode_all(self.store.query(&query).await?)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Item>, RepositoryError> {
        decode_all(self.store.query(&Query::new(Collection::Items)).await?)
    }

    /// Items matching `text`: exact tag matches first, then partial matches.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if a query fails.
    pub async fn search(&self, text: &str) -> Result<Vec<Item>, RepositoryError> {
        search_collection(
            self.store,
            Collection::Items,
            text,
            |i: &Item| i.id.as_str(),
            Item::matches_partial,
        )
        .await
    }
}
