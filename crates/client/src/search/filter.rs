//! Category, radius and sort handling for search results.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use lookoot_core::{GeoPoint, Price};

use super::SearchResult;
use crate::config::SearchConfig;

/// Sort orders offered in the search filter sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOption {
    /// Newest first; results without a creation time go last.
    DateAdded,
    /// Cheapest item first; stores after every item.
    PriceLowToHigh,
    /// Dearest item first; stores after every item.
    PriceHighToLow,
    /// Highest rated store first; items after every store.
    Rating,
    /// Most reviewed store first; items after every store.
    MostReviews,
}

impl SortOption {
    pub const ALL: [Self; 5] = [
        Self::DateAdded,
        Self::PriceLowToHigh,
        Self::PriceHighToLow,
        Self::Rating,
        Self::MostReviews,
    ];

    /// Parse from a command-line or query-string value.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "date-added" | "date_added" | "newest" => Some(Self::DateAdded),
            "price-ascending" | "price_asc" | "price-low-to-high" => Some(Self::PriceLowToHigh),
            "price-descending" | "price_desc" | "price-high-to-low" => {
                Some(Self::PriceHighToLow)
            }
            "rating" => Some(Self::Rating),
            "most-reviews" | "most_reviews" | "reviews" => Some(Self::MostReviews),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DateAdded => "date-added",
            Self::PriceLowToHigh => "price-ascending",
            Self::PriceHighToLow => "price-descending",
            Self::Rating => "rating",
            Self::MostReviews => "most-reviews",
        }
    }

    /// Label shown to users.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::DateAdded => "Date Added",
            Self::PriceLowToHigh => "Price: Low to High",
            Self::PriceHighToLow => "Price: High to Low",
            Self::Rating => "Rating",
            Self::MostReviews => "Most Reviews",
        }
    }

    /// Order two results under this option alone.
    #[must_use]
    pub fn compare(self, a: &SearchResult, b: &SearchResult) -> Ordering {
        match self {
            Self::DateAdded => match (a.created_at(), b.created_at()) {
                (Some(a), Some(b)) => b.cmp(&a),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            Self::PriceLowToHigh => a.price_or(Price::MAX).cmp(&b.price_or(Price::MAX)),
            Self::PriceHighToLow => b.price_or(Price::MIN).cmp(&a.price_or(Price::MIN)),
            Self::Rating => b.rating_or(f64::MIN).total_cmp(&a.rating_or(f64::MIN)),
            Self::MostReviews => b.review_count_or(-1).cmp(&a.review_count_or(-1)),
        }
    }
}

impl std::fmt::Display for SortOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Stable sort by `options` as a composite key: the first option decides,
/// later options break ties. No options leaves the order untouched.
pub fn sort_results(results: &mut [SearchResult], options: &[SortOption]) {
    if options.is_empty() {
        return;
    }
    results.sort_by(|a, b| {
        options
            .iter()
            .fold(Ordering::Equal, |ord, option| {
                ord.then_with(|| option.compare(a, b))
            })
    });
}

/// The user's current filter selection.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    /// Sort options, most significant first.
    pub sort: Vec<SortOption>,
    /// Categories to keep; empty keeps everything.
    pub categories: BTreeSet<String>,
    pub radius_km: f64,
    pub location: GeoPoint,
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new(&SearchConfig::default())
    }
}

impl FilterState {
    #[must_use]
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            sort: Vec::new(),
            categories: BTreeSet::new(),
            radius_km: config.radius_km,
            location: config.default_location,
        }
    }

    /// Whether `result` survives the category selection.
    #[must_use]
    pub fn matches_categories(&self, result: &SearchResult) -> bool {
        self.categories.is_empty()
            || result
                .categories()
                .iter()
                .any(|c| self.categories.contains(c))
    }

    /// Whether `result` is within the search radius. Items, and stores
    /// without a location, always are.
    #[must_use]
    pub fn within_radius(&self, result: &SearchResult) -> bool {
        match result {
            SearchResult::Store(store) => store
                .location
                .is_none_or(|point| point.distance_km(&self.location) <= self.radius_km),
            SearchResult::Item(_) => true,
        }
    }

    /// Filter by category and radius, then sort.
    #[must_use]
    pub fn apply(&self, results: Vec<SearchResult>) -> Vec<SearchResult> {
        let mut kept: Vec<SearchResult> = results
            .into_iter()
            .filter(|r| self.matches_categories(r) && self.within_radius(r))
            .collect();
        sort_results(&mut kept, &self.sort);
        kept
    }
}
