//! Item documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::lenient;
use crate::{ItemId, Price, StoreId, Tags, UserId};

/// An item stocked by a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Item {
    #[serde(deserialize_with = "lenient::or_default")]
    pub id: ItemId,
    #[serde(deserialize_with = "lenient::or_default")]
    pub store_id: StoreId,
    #[serde(deserialize_with = "lenient::or_default")]
    pub name: String,
    #[serde(deserialize_with = "lenient::or_default")]
    pub description: String,
    #[serde(deserialize_with = "lenient::or_default")]
    pub price: Price,
    #[serde(deserialize_with = "lenient::string_list")]
    pub categories: Vec<String>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub tags: Tags,
    #[serde(deserialize_with = "lenient::or_true")]
    pub in_stock: bool,
    #[serde(deserialize_with = "lenient::or_default")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub wishlisted_by: Vec<UserId>,
}

impl Default for Item {
    fn default() -> Self {
        Self {
            id: ItemId::default(),
            store_id: StoreId::default(),
            name: String::new(),
            description: String::new(),
            price: Price::default(),
            categories: Vec::new(),
            tags: Tags::default(),
            in_stock: true,
            created_at: None,
            last_updated: None,
            wishlisted_by: Vec::new(),
        }
    }
}

impl Item {
    /// Exact match: one of the tags equals the lower-cased query.
    #[must_use]
    pub fn matches_exact(&self, lowercase_query: &str) -> bool {
        self.tags.contains_exact(lowercase_query)
    }

    /// Partial match: the lower-cased query is contained in the name,
    /// description, a category or a tag.
    #[must_use]
    pub fn matches_partial(&self, lowercase_query: &str) -> bool {
        self.name.to_lowercase().contains(lowercase_query)
            || self.description.to_lowercase().contains(lowercase_query)
            || self
                .categories
                .iter()
                .any(|c| c.to_lowercase().contains(lowercase_query))
            || self
                .tags
                .iter()
                .any(|t| t.to_lowercase().contains(lowercase_query))
    }
}
