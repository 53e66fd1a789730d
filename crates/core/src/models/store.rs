//! Store documents.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::types::lenient;
use crate::{GeoPoint, StoreId, Tags, UserId};

/// Weekday keys used by the `openingTimes` map, Monday first.
pub const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Opening and closing time for one weekday, as `HH:MM` strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpeningHours {
    #[serde(deserialize_with = "lenient::or_default")]
    pub open: String,
    #[serde(deserialize_with = "lenient::or_default")]
    pub close: String,
}

impl OpeningHours {
    #[must_use]
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }

    /// Whether `time` falls in `[open, close)`. Unparseable hours count as closed.
    #[must_use]
    pub fn is_open_at(&self, time: NaiveTime) -> bool {
        let parse = |s: &str| NaiveTime::parse_from_str(s, "%H:%M").ok();
        match (parse(&self.open), parse(&self.close)) {
            (Some(open), Some(close)) => open <= time && time < close,
            _ => false,
        }
    }
}

/// A physical store listed on Lookoot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Store {
    #[serde(deserialize_with = "lenient::or_default")]
    pub id: StoreId,
    #[serde(deserialize_with = "lenient::or_default")]
    pub owner_id: UserId,
    #[serde(deserialize_with = "lenient::or_default")]
    pub name: String,
    #[serde(deserialize_with = "lenient::or_default")]
    pub description: String,
    #[serde(deserialize_with = "lenient::or_default")]
    pub location: Option<GeoPoint>,
    #[serde(deserialize_with = "lenient::string_list")]
    pub categories: Vec<String>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub tags: Tags,
    /// Average of store-level review ratings.
    #[serde(deserialize_with = "lenient::or_default")]
    pub rating: f64,
    #[serde(deserialize_with = "lenient::or_default")]
    pub review_count: u32,
    #[serde(deserialize_with = "lenient::or_default")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub followers: Vec<UserId>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub opening_times: BTreeMap<String, OpeningHours>,
}

impl Store {
    /// Opening hours for `day`, if the store has published them.
    #[must_use]
    pub fn hours_on(&self, day: Weekday) -> Option<&OpeningHours> {
        let key = WEEKDAYS.get(day.num_days_from_monday() as usize)?;
        self.opening_times.get(*key)
    }

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
