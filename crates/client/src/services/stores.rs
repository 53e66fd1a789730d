//! Store and inventory management, reviews and follows.

use std::time::Duration;

use tracing::{info, instrument, warn};

use lookoot_core::{Item, ItemId, Review, Store, StoreId, User, UserId, validation};

use crate::db::{
    ItemRepository, RepositoryError, ReviewRepository, StoreCache, StoreRepository, UserRepository,
};
use crate::error::{AppError, Result};
use crate::remote::DocumentStore;

/// Everything shown on a store's page.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreDetail {
    pub store: Store,
    /// Most recently updated first.
    pub items: Vec<Item>,
    /// Newest first.
    pub reviews: Vec<Review>,
}

/// Store owner and shopper operations on stores.
pub struct StoreService<'a> {
    store: &'a dyn DocumentStore,
    cache: &'a StoreCache,
    detail_timeout: Duration,
}

impl<'a> StoreService<'a> {
    #[must_use]
    pub const fn new(
        store: &'a dyn DocumentStore,
        cache: &'a StoreCache,
        detail_timeout: Duration,
    ) -> Self {
        Self {
            store,
            cache,
            detail_timeout,
        }
    }

    fn stores(&self) -> StoreRepository<'a> {
        StoreRepository::new(self.store).with_cache(self.cache)
    }

    fn items(&self) -> ItemRepository<'a> {
        ItemRepository::new(self.store)
    }

    fn reviews(&self) -> ReviewRepository<'a> {
        ReviewRepository::new(self.store)
    }

    // =========================================================================
    // Stores
    // =========================================================================

    /// Load a store with its inventory and reviews, bounded by the configured
    /// detail timeout.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Timeout` if the wait elapses and
    /// `RepositoryError::NotFound` if the store does not exist.
    #[instrument(skip(self, id), fields(store_id = %id))]
    pub async fn store_detail(&self, id: &StoreId) -> Result<StoreDetail> {
        let load = async {
            let store = self.stores().require(id).await?;
            let (items_repo, reviews_repo) = (self.items(), self.reviews());
            let (items, reviews) = tokio::join!(
                items_repo.list_by_store(id),
                reviews_repo.list_by_store(id)
            );
            Ok::<_, RepositoryError>(StoreDetail {
                store,
                items: items?,
                reviews: reviews?,
            })
        };

        match tokio::time::timeout(self.detail_timeout, load).await {
            Ok(detail) => Ok(detail?),
            Err(_) => {
                warn!(timeout = ?self.detail_timeout, "Timed out loading store detail");
                Err(RepositoryError::Timeout(self.detail_timeout).into())
            }
        }
    }

    /// Open a new store owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` unless `owner` may manage stores, and
    /// `AppError::Validation` for a blank name.
    pub async fn create_store(&self, owner: &User, store: &Store) -> Result<Store> {
        ensure_store_manager(owner)?;
        validation::required("Store name", &store.name)?;
        let store = Store {
            owner_id: owner.id.clone(),
            ..store.clone()
        };
        Ok(self.stores().create(&store).await?)
    }

    /// # Errors
    ///
    /// Returns `AppError::Forbidden` unless `actor` owns the store or is an
    /// administrator.
    pub async fn update_store(&self, actor: &User, store: &Store) -> Result<()> {
        let existing = self.stores().require(&store.id).await?;
        ensure_owner(actor, &existing)?;
        validation::required("Store name", &store.name)?;
        let store = Store {
            owner_id: existing.owner_id,
            ..store.clone()
        };
        Ok(self.stores().update(&store).await?)
    }

    /// Delete a store, its items and all their reviews.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` unless `actor` owns the store or is an
    /// administrator.
    pub async fn delete_store(&self, actor: &User, id: &StoreId) -> Result<()> {
        let existing = self.stores().require(id).await?;
        ensure_owner(actor, &existing)?;
        Ok(self.stores().delete(id).await?)
    }

    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn stores_owned_by(&self, owner: &UserId) -> Result<Vec<Store>> {
        Ok(self.stores().list_by_owner(owner).await?)
    }

    // =========================================================================
    // Inventory
    // =========================================================================

    /// Add an item to a store the actor owns.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` unless `actor` owns the store, and
    /// `AppError::Validation` for a blank name.
    pub async fn add_item(&self, actor: &User, item: &Item) -> Result<Item> {
        let store = self.stores().require(&item.store_id).await?;
        ensure_owner(actor, &store)?;
        validation::required("Item name", &item.name)?;
        Ok(self.items().create(item).await?)
    }

    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the item does not exist and
    /// `AppError::Forbidden` unless `actor` owns its store.
    pub async fn update_item(&self, actor: &User, item: &Item) -> Result<()> {
        let existing = self.require_item(&item.id).await?;
        let store = self.stores().require(&existing.store_id).await?;
        ensure_owner(actor, &store)?;
        validation::required("Item name", &item.name)?;
        let item = Item {
            store_id: existing.store_id,
            ..item.clone()
        };
        Ok(self.items().update(&item).await?)
    }

    /// Delete an item and its reviews.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the item does not exist and
    /// `AppError::Forbidden` unless `actor` owns its store.
    pub async fn delete_item(&self, actor: &User, id: &ItemId) -> Result<()> {
        let existing = self.require_item(id).await?;
        let store = self.stores().require(&existing.store_id).await?;
        ensure_owner(actor, &store)?;
        Ok(self.items().delete(id).await?)
    }

    /// Reviews of one item, newest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the item does not exist.
    pub async fn item_reviews(&self, id: &ItemId) -> Result<Vec<Review>> {
        self.require_item(id).await?;
        Ok(self.reviews().list_by_item(id).await?)
    }

    async fn require_item(&self, id: &ItemId) -> Result<Item> {
        self.items()
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Item".to_string()))
    }

    // =========================================================================
    // Reviews & Follows
    // =========================================================================

    /// Post a review by `author`. A store review also refreshes the store's
    /// `rating` and `reviewCount`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for a rating outside 1 to 5 and
    /// `AppError::Database` if the store or item does not exist.
    pub async fn add_review(&self, author: &User, review: &Review) -> Result<Review> {
        validation::rating(review.rating)?;
        self.stores().require(&review.store_id).await?;
        if let Some(item_id) = &review.item_id {
            let item = self.require_item(item_id).await?;
            if item.store_id != review.store_id {
                return Err(AppError::NotFound("Item".to_string()));
            }
        }

        let review = Review {
            user_id: author.id.clone(),
            likes: 0,
            ..review.clone()
        };
        let created = self.reviews().create(&review).await?;

        if created.is_store_review() {
            let summary = self.reviews().summarize_store(&created.store_id).await?;
            self.stores()
                .set_rating(&created.store_id, summary.average, summary.count)
                .await?;
            info!(
                store_id = %created.store_id,
                rating = summary.average,
                count = summary.count,
                "Updated store rating"
            );
        }
        Ok(created)
    }

    /// Follow a store, updating both the store and the user.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` with `NotFound` if either does not exist.
    pub async fn follow_store(&self, user: &UserId, store_id: &StoreId) -> Result<()> {
        self.stores().add_follower(store_id, user).await?;
        UserRepository::new(self.store)
            .add_followed_store(user, store_id)
            .await?;
        info!(user_id = %user, store_id = %store_id, "Followed store");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `AppError::Database` with `NotFound` if either does not exist.
    pub async fn unfollow_store(&self, user: &UserId, store_id: &StoreId) -> Result<()> {
        self.stores().remove_follower(store_id, user).await?;
        UserRepository::new(self.store)
            .remove_followed_store(user, store_id)
            .await?;
        info!(user_id = %user, store_id = %store_id, "Unfollowed store");
        Ok(())
    }
}

fn ensure_store_manager(user: &User) -> Result<()> {
    if user.role.can_manage_stores() {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "{} cannot manage stores",
            user.id
        )))
    }
}

fn ensure_owner(actor: &User, store: &Store) -> Result<()> {
    if actor.is_admin() || (actor.role.can_manage_stores() && actor.id == store.owner_id) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "{} does not own store {}",
            actor.id, store.id
        )))
    }
}
