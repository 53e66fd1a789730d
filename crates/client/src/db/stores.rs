//! Store repository.
//!
//! Store lookups by id go through an optional [`StoreCache`]; every write
//! path invalidates the cached entry.

use chrono::Utc;
use serde_json::json;
use tracing::{debug, info, instrument};

use lookoot_core::{Store, StoreId, UserId};

use super::{RepositoryError, StoreCache, decode, decode_all, encode, fields, search_collection};
use crate::remote::{Collection, DocumentStore, Query};

/// Repository for the `stores` collection.
pub struct StoreRepository<'a> {
    store: &'a dyn DocumentStore,
    cache: Option<&'a StoreCache>,
}

impl<'a> StoreRepository<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store, cache: None }
    }

    /// Serve lookups by id from `cache`.
    #[must_use]
    pub const fn with_cache(mut self, cache: &'a StoreCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Create a store. The generated id is written into the document and
    /// `createdAt` / `lastUpdated` are stamped.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if a write fails.
    pub async fn create(&self, store: &Store) -> Result<Store, RepositoryError> {
        let now = Utc::now();
        let mut created = Store {
            created_at: Some(now),
            last_updated: Some(now),
            ..store.clone()
        };
        let id = self
            .store
            .add(Collection::Stores, encode(&created)?)
            .await?;
        self.store
            .update(Collection::Stores, &id, fields([("id", json!(id))]))
            .await?;
        created.id = StoreId::new(id);
        info!(store_id = %created.id, owner_id = %created.owner_id, "Created store");
        Ok(created)
    }

    /// Get a store by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the lookup fails.
    pub async fn get(&self, id: &StoreId) -> Result<Option<Store>, RepositoryError> {
        if let Some(cache) = self.cache
            && let Some(store) = cache.get(id).await
        {
            debug!(store_id = %id, "Cache hit for store");
            return Ok(Some(store));
        }

        let Some(data) = self.store.get(Collection::Stores, id.as_str()).await? else {
            return Ok(None);
        };
        let store: Store = decode(id.as_str(), data)?;
        if let Some(cache) = self.cache {
            cache.insert(store.clone()).await;
        }
        Ok(Some(store))
    }

    /// Get a store by id, failing if absent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such store exists.
    pub async fn require(&self, id: &StoreId) -> Result<Store, RepositoryError> {
        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Overwrite a store's editable fields and stamp `lastUpdated`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the store does not exist.
    pub async fn update(&self, store: &Store) -> Result<(), RepositoryError> {
        let mut data = encode(store)?;
        data.remove("createdAt");
        data.remove("followers");
        data.remove("rating");
        data.remove("reviewCount");
        data.insert("lastUpdated".to_owned(), json!(Utc::now()));
        self.store
            .update(Collection::Stores, store.id.as_str(), data)
            .await?;
        self.invalidate(&store.id).await;
        info!(store_id = %store.id, "Updated store");
        Ok(())
    }

    /// Record a recomputed review aggregate.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the store does not exist.
    pub async fn set_rating(
        &self,
        id: &StoreId,
        rating: f64,
        review_count: u32,
    ) -> Result<(), RepositoryError> {
        self.store
            .update(
                Collection::Stores,
                id.as_str(),
                fields([("rating", json!(rating)), ("reviewCount", json!(review_count))]),
            )
            .await?;
        self.invalidate(id).await;
        Ok(())
    }

    /// Delete a store together with its items and every review that
    /// references it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if any delete fails. Children are
    /// removed before the store itself.
    #[instrument(skip(self, id), fields(store_id = %id))]
    pub async fn delete(&self, id: &StoreId) -> Result<(), RepositoryError> {
        let items = self
            .store
            .query(&Query::new(Collection::Items).where_eq("storeId", id.as_str()))
            .await?;
        let reviews = self
            .store
            .query(&Query::new(Collection::Reviews).where_eq("storeId", id.as_str()))
            .await?;

        for review in &reviews {
            self.store.delete(Collection::Reviews, &review.id).await?;
        }
        for item in &items {
            self.store.delete(Collection::Items, &item.id).await?;
        }
        self.store.delete(Collection::Stores, id.as_str()).await?;
        self.invalidate(id).await;

        info!(
            items = items.len(),
            reviews = reviews.len(),
            "Deleted store"
        );
        Ok(())
    }

    /// Stores owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the query fails.
    pub async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<Store>, RepositoryError> {
        decode_all(
            self.store
                .query(&Query::new(Collection::Stores).where_eq("ownerId", owner.as_str()))
                .await?,
        )
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Store>, RepositoryError> {
        decode_all(self.store.query(&Query::new(Collection::Stores)).await?)
    }

    /// Stores matching `text`: exact tag matches first, then partial matches.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if a query fails.
    pub async fn search(&self, text: &str) -> Result<Vec<Store>, RepositoryError> {
        search_collection(
            self.store,
            Collection::Stores,
            text,
            |s: &Store| s.id.as_str(),
            Store::matches_partial,
        )
        .await
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the store does not exist.
    pub async fn add_follower(&self, id: &StoreId, user: &UserId) -> Result<(), RepositoryError> {
        self.store
            .array_union(Collection::Stores, id.as_str(), "followers", json!(user))
            .await?;
        self.invalidate(id).await;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the store does not exist.
    pub async fn remove_follower(&self, id: &StoreId, user: &UserId) -> Result<(), RepositoryError> {
        self.store
            .array_remove(Collection::Stores, id.as_str(), "followers", json!(user))
            .await?;
        self.invalidate(id).await;
        Ok(())
    }

    async fn invalidate(&self, id: &StoreId) {
        if let Some(cache) = self.cache {
            cache.invalidate(id).await;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::remote::MemoryStore;

    fn shoe_world() -> Store {
        Store {
            owner_id: UserId::new("owner"),
            name: "Shoe World".into(),
            categories: vec!["Clothing".into()],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_writes_own_id() {
        let backend = MemoryStore::new();
        let repo = StoreRepository::new(&backend);
        let created = repo.create(&shoe_world()).await.unwrap();

        let raw = backend
            .get(Collection::Stores, created.id.as_str())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(raw["id"], json!(created.id.as_str()));
        assert!(raw.contains_key("createdAt"));
        assert_eq!(
            repo.list_by_owner(&UserId::new("owner")).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn test_cache_is_invalidated_on_update() {
        let backend = MemoryStore::new();
        let cache = StoreCache::new(Duration::from_secs(300));
        let repo = StoreRepository::new(&backend).with_cache(&cache);
        let mut store = repo.create(&shoe_world()).await.unwrap();

        assert_eq!(repo.require(&store.id).await.unwrap().name, "Shoe World");
        store.name = "Shoe Universe".into();
        repo.update(&store).await.unwrap();
        assert_eq!(repo.require(&store.id).await.unwrap().name, "Shoe Universe");
    }

    #[tokio::test]
    async fn test_followers() {
        let backend = MemoryStore::new();
        let repo = StoreRepository::new(&backend);
        let store = repo.create(&shoe_world()).await.unwrap();
        let user = UserId::new("u1");

        repo.add_follower(&store.id, &user).await.unwrap();
        repo.add_follower(&store.id, &user).await.unwrap();
        assert_eq!(repo.require(&store.id).await.unwrap().followers, [user.clone()]);

        repo.remove_follower(&store.id, &user).await.unwrap();
        assert!(repo.require(&store.id).await.unwrap().followers.is_empty());
    }
}
