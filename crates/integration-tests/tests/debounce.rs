//! Keystroke debouncing, driven on a paused tokio clock.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use lookoot_client::config::SearchConfig;
use lookoot_client::remote::MemoryStore;
use lookoot_client::search::{RemoteCatalog, SearchManager};
use lookoot_integration_tests::CountingCatalog;

fn manager() -> (SearchManager, Arc<CountingCatalog>) {
    let catalog = Arc::new(CountingCatalog::new(Arc::new(RemoteCatalog::new(
        Arc::new(MemoryStore::new()),
    ))));
    let manager = SearchManager::new(catalog.clone(), &SearchConfig::default());
    (manager, catalog)
}

/// Let spawned timers and searches run after the clock moves.
async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_rapid_typing_runs_one_search_for_last_query() {
    let (manager, catalog) = manager();

    for text in ["s", "sh", "sho", "shoe"] {
        manager.on_query_change(text);
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert!(catalog.queries().is_empty());
    assert_eq!(manager.state().query, "shoe");

    tokio::time::sleep(Duration::from_millis(300)).await;
    settle().await;
    assert_eq!(catalog.queries(), ["shoe"]);
    assert!(!manager.state().is_loading);
}

#[tokio::test(start_paused = true)]
async fn test_pauses_longer_than_debounce_search_each_query() {
    let (manager, catalog) = manager();

    manager.on_query_change("boots");
    tokio::time::sleep(Duration::from_millis(350)).await;
    settle().await;
    manager.on_query_change("boot");
    tokio::time::sleep(Duration::from_millis(350)).await;
    settle().await;

    assert_eq!(catalog.queries(), ["boots", "boot"]);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_cancels_pending_search() {
    let (manager, catalog) = manager();

    manager.on_query_change("scarf");
    manager.shutdown();
    tokio::time::sleep(Duration::from_secs(1)).await;
    settle().await;

    assert!(catalog.queries().is_empty());
    assert_eq!(manager.state().query, "scarf");
}

#[tokio::test(start_paused = true)]
async fn test_subscribers_see_published_results() {
    let (manager, _catalog) = manager();
    let mut updates = manager.subscribe();

    manager.on_query_change("anything");
    updates.changed().await.unwrap();
    assert_eq!(updates.borrow_and_update().query, "anything");

    tokio::time::sleep(Duration::from_millis(300)).await;
    settle().await;
    let state = updates.borrow_and_update().clone();
    assert!(!state.is_loading);
    assert!(state.results.is_empty());
    assert!(state.error.is_none());
}
