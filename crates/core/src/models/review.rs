//! Review documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::lenient;
use crate::{ItemId, ReviewId, StoreId, UserId};

/// A rating left by a user on a store, or on one of its items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Review {
    #[serde(deserialize_with = "lenient::or_default")]
    pub id: ReviewId,
    #[serde(deserialize_with = "lenient::or_default")]
    pub user_id: UserId,
    #[serde(deserialize_with = "lenient::or_default")]
    pub store_id: StoreId,
    /// `None` for a review of the store itself.
    #[serde(deserialize_with = "lenient::or_default")]
    pub item_id: Option<ItemId>,
    /// 1 to 5 stars.
    #[serde(deserialize_with = "lenient::or_default")]
    pub rating: u8,
    #[serde(deserialize_with = "lenient::or_default")]
    pub comment: String,
    #[serde(deserialize_with = "lenient::or_default")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub likes: u32,
}

impl Review {
    pub const MIN_RATING: u8 = 1;
    pub const MAX_RATING: u8 = 5;

    /// Whether this review counts towards the store's aggregate rating.
    #[must_use]
    pub const fn is_store_review(&self) -> bool {
        self.item_id.is_none()
    }
}
