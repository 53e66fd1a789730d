//! Review repository.

use chrono::Utc;
use tracing::info;

use lookoot_core::{ItemId, Review, ReviewId, StoreId};

use super::{RepositoryError, decode_all, encode};
use crate::remote::{Collection, Direction, DocumentStore, Query};

/// Aggregate of a store's store-level reviews.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingSummary {
    pub average: f64,
    pub count: u32,
}

impl RatingSummary {
    /// Average and count over `reviews`, ignoring item reviews.
    #[must_use]
    pub fn of(reviews: &[Review]) -> Self {
        let ratings: Vec<u32> = reviews
            .iter()
            .filter(|r| r.is_store_review())
            .map(|r| u32::from(r.rating))
            .collect();
        let count = u32::try_from(ratings.len()).unwrap_or(u32::MAX);
        if count == 0 {
            return Self {
                average: 0.0,
                count: 0,
            };
        }
        let total: u32 = ratings.iter().sum();
        Self {
            average: f64::from(total) / f64::from(count),
            count,
        }
    }
}

/// Repository for the `reviews` collection.
pub struct ReviewRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> ReviewRepository<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Store a review, stamping its timestamp.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the write fails.
    pub async fn create(&self, review: &Review) -> Result<Review, RepositoryError> {
        let mut created = Review {
            timestamp: Some(Utc::now()),
            ..review.clone()
        };
        let mut data = encode(&created)?;
        data.remove("id");
        let id = self.store.add(Collection::Reviews, data).await?;
        created.id = ReviewId::new(id);
        info!(review_id = %created.id, store_id = %created.store_id, "Created review");
        Ok(created)
    }

    /// Every review referencing a store (store and item reviews), newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the query fails.
    pub async fn list_by_store(&self, store_id: &StoreId) -> Result<Vec<Review>, RepositoryError> {
        let query = Query::new(Collection::Reviews)
            .where_eq("storeId", store_id.as_str())
            .order_by("timestamp", Direction::Descending);
        decode_all(self.store.query(&query).await?)
    }

    /// Reviews of one item, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the query fails.
    pub async fn list_by_item(&self, item_id: &ItemId) -> Result<Vec<Review>, RepositoryError> {
        let query = Query::new(Collection::Reviews)
            .where_eq("itemId", item_id.as_str())
            .order_by("timestamp", Direction::Descending);
        decode_all(self.store.query(&query).await?)
    }

    /// Recompute a store's aggregate from its store-level reviews.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the query fails.
    pub async fn summarize_store(&self, store_id: &StoreId) -> Result<RatingSummary, RepositoryError> {
        Ok(RatingSummary::of(&self.list_by_store(store_id).await?))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::remote::MemoryStore;
    use lookoot_core::UserId;

    fn review(store: &str, item: Option<&str>, rating: u8) -> Review {
        Review {
            user_id: UserId::new("u1"),
            store_id: StoreId::new(store),
            item_id: item.map(ItemId::new),
            rating,
            ..Default::default()
        }
    }

    #[test]
    fn test_summary_ignores_item_reviews() {
        let reviews = [
            review("s1", None, 5),
            review("s1", None, 2),
            review("s1", Some("i1"), 1),
        ];
        let summary = RatingSummary::of(&reviews);
        assert_eq!(summary.count, 2);
        assert!((summary.average - 3.5).abs() < f64::EPSILON);

        assert_eq!(RatingSummary::of(&[]).count, 0);
    }

    #[tokio::test]
    async fn test_list_by_item_and_store() {
        let backend = MemoryStore::new();
        let repo = ReviewRepository::new(&backend);
        repo.create(&review("s1", None, 4)).await.unwrap();
        repo.create(&review("s1", Some("i1"), 3)).await.unwrap();
        repo.create(&review("s2", None, 1)).await.unwrap();

        assert_eq!(repo.list_by_store(&StoreId::new("s1")).await.unwrap().len(), 2);
        let item_reviews = repo.list_by_item(&ItemId::new("i1")).await.unwrap();
        assert_eq!(item_reviews.len(), 1);
        assert_eq!(item_reviews[0].rating, 3);

        let summary = repo.summarize_store(&StoreId::new("s1")).await.unwrap();
        assert_eq!(summary.count, 1);
    }
}
