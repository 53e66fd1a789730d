//! Store page output.

use lookoot_client::AppState;
use lookoot_client::services::StoreDetail;
use lookoot_core::{StoreId, WEEKDAYS};

/// Load a store with its inventory and reviews and print it.
///
/// # Errors
///
/// Returns an error if the store does not exist or loading times out.
pub async fn show(state: &AppState, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let detail = state.stores().store_detail(&StoreId::new(id)).await?;
    print_detail(&detail);
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_detail(detail: &StoreDetail) {
    let store = &detail.store;
    println!("{} ({})", store.name, store.id);
    if !store.description.is_empty() {
        println!("  {}", store.description);
    }
    println!(
        "  {:.1} stars from {} review(s), {} follower(s)",
        store.rating,
        store.review_count,
        store.followers.len()
    );

    for day in WEEKDAYS {
        if let Some(hours) = store.opening_times.get(day) {
            println!("  {day:<9} {}-{}", hours.open, hours.close);
        }
    }

    println!("Items:");
    for item in &detail.items {
        let stock = if item.in_stock { "" } else { " (out of stock)" };
        println!("  {} {}{stock}", item.name, item.price);
    }

    println!("Reviews:");
    for review in &detail.reviews {
        let target = review
            .item_id
            .as_ref()
            .map_or_else(|| "store".to_string(), ToString::to_string);
        println!("  {}/5 on {target}: {}", review.rating, review.comment);
    }
}
