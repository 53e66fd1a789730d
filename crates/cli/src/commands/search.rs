//! One-shot search over a fixture.

use lookoot_client::AppState;
use lookoot_client::search::{FilterState, SearchResult, SearchState, SortOption};
use lookoot_core::GeoPoint;

/// Filters given on the command line. `None` keeps the configured default.
#[derive(Debug, Default)]
pub struct SearchOptions {
    pub sort: Vec<SortOption>,
    pub categories: Vec<String>,
    pub radius_km: Option<f64>,
    pub location: Option<GeoPoint>,
}

impl SearchOptions {
    /// Overlay these options on `base`.
    #[must_use]
    pub fn into_filters(self, base: FilterState) -> FilterState {
        FilterState {
            sort: self.sort,
            categories: if self.categories.is_empty() {
                base.categories
            } else {
                self.categories.into_iter().collect()
            },
            radius_km: self.radius_km.unwrap_or(base.radius_km),
            location: self.location.unwrap_or(base.location),
        }
    }
}

/// Apply `options`, run a single search cycle for `query` and print the
/// published results.
///
/// # Errors
///
/// Returns an error if the search cycle published one. Partial results are
/// printed first.
pub async fn run(
    state: &AppState,
    query: &str,
    options: SearchOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let manager = state.search();
    manager.replace_filters(options.into_filters(manager.filters()));

    manager.search(query).await;
    let published = manager.state();
    print_results(query, &published);

    match published.error {
        Some(error) => Err(error.into()),
        None => Ok(()),
    }
}

/// Parse a `--sort` value.
///
/// # Errors
///
/// Returns the list of accepted values when `s` is not one of them.
pub fn parse_sort(s: &str) -> Result<SortOption, String> {
    SortOption::parse(s).ok_or_else(|| {
        let accepted: Vec<&str> = SortOption::ALL
            .iter()
            .copied()
            .map(SortOption::as_str)
            .collect();
        format!("unknown sort '{s}', expected one of: {}", accepted.join(", "))
    })
}

#[allow(clippy::print_stdout)]
fn print_results(query: &str, state: &SearchState) {
    println!("{} result(s) for '{query}'", state.results.len());
    for result in &state.results {
        println!("  {}", describe(result));
    }
}

fn describe(result: &SearchResult) -> String {
    match result {
        SearchResult::Item(item) => format!("[item]  {} ({}) {}", item.name, item.id, item.price),
        SearchResult::Store(store) => format!(
            "[store] {} ({}) {:.1} stars from {} review(s)",
            store.name, store.id, store.rating, store.review_count
        ),
    }
}
