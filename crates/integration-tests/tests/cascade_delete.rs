//! Deleting stores and items removes everything that hangs off them.

#![allow(clippy::unwrap_used)]

use lookoot_client::AppError;
use lookoot_client::db::{ItemRepository, RepositoryError, ReviewRepository, StoreRepository};
use lookoot_client::remote::{Collection, DocumentStore, Query};
use lookoot_core::{Review, StoreId, User, UserId};
use lookoot_integration_tests::{TestContext, item, store};

fn shopper() -> User {
    User {
        id: UserId::new("shopper"),
        ..Default::default()
    }
}

async fn count(store: &dyn DocumentStore, collection: Collection, field: &str, id: &str) -> usize {
    store
        .query(&Query::new(collection).where_eq(field, id))
        .await
        .unwrap()
        .len()
}

async fn review(ctx: &TestContext, store_id: &StoreId, item: Option<&lookoot_core::Item>) {
    ctx.state
        .stores()
        .add_review(
            &shopper(),
            &Review {
                store_id: store_id.clone(),
                item_id: item.map(|i| i.id.clone()),
                rating: 4,
                comment: "Grand".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_deleting_store_removes_items_and_reviews() {
    let ctx = TestContext::new().await;
    let doomed = ctx.open(&store("Closing Down", &[], &[])).await;
    let kept = ctx.open(&store("Staying Open", &[], &[])).await;
    let boots = ctx.stock(&item(&doomed, "Boots", 5000, &[])).await;
    let hats = ctx.stock(&item(&kept, "Hats", 1500, &[])).await;
    review(&ctx, &doomed.id, None).await;
    review(&ctx, &doomed.id, Some(&boots)).await;
    review(&ctx, &kept.id, Some(&hats)).await;

    // Warm the cache so a stale entry would show up below
    ctx.state.stores().store_detail(&doomed.id).await.unwrap();
    ctx.state
        .stores()
        .delete_store(&ctx.owner, &doomed.id)
        .await
        .unwrap();

    let backend = ctx.state.store();
    assert_eq!(count(backend, Collection::Items, "storeId", doomed.id.as_str()).await, 0);
    assert_eq!(count(backend, Collection::Reviews, "storeId", doomed.id.as_str()).await, 0);
    assert!(
        StoreRepository::new(backend)
            .get(&doomed.id)
            .await
            .unwrap()
            .is_none()
    );
    assert!(matches!(
        ctx.state.stores().store_detail(&doomed.id).await.unwrap_err(),
        AppError::Database(RepositoryError::NotFound)
    ));

    let survivor = ctx.state.stores().store_detail(&kept.id).await.unwrap();
    assert_eq!(survivor.items.len(), 1);
    assert_eq!(survivor.reviews.len(), 1);
}

#[tokio::test]
async fn test_deleting_item_removes_only_its_reviews() {
    let ctx = TestContext::new().await;
    let shop = ctx.open(&store("Cheese Shop", &[], &[])).await;
    let brie = ctx.stock(&item(&shop, "Brie", 450, &[])).await;
    let cheddar = ctx.stock(&item(&shop, "Cheddar", 380, &[])).await;
    review(&ctx, &shop.id, Some(&brie)).await;
    review(&ctx, &shop.id, Some(&cheddar)).await;
    review(&ctx, &shop.id, None).await;

    assert_eq!(
        ctx.state.stores().item_reviews(&brie.id).await.unwrap().len(),
        1
    );
    ctx.state
        .stores()
        .delete_item(&ctx.owner, &brie.id)
        .await
        .unwrap();
    assert!(matches!(
        ctx.state.stores().item_reviews(&brie.id).await.unwrap_err(),
        AppError::NotFound(_)
    ));

    let backend = ctx.state.store();
    assert!(ItemRepository::new(backend).get(&brie.id).await.unwrap().is_none());
    let reviews = ReviewRepository::new(backend)
        .list_by_store(&shop.id)
        .await
        .unwrap();
    assert_eq!(reviews.len(), 2);
    assert!(reviews.iter().all(|r| r.item_id.as_ref() != Some(&brie.id)));

    let detail = ctx.state.stores().store_detail(&shop.id).await.unwrap();
    assert_eq!(detail.items, [cheddar]);
    assert_eq!(detail.store.review_count, 1);
}

#[tokio::test]
async fn test_only_owner_or_admin_may_delete() {
    let ctx = TestContext::new().await;
    let shop = ctx.open(&store("Guarded", &[], &[])).await;

    let err = ctx
        .state
        .stores()
        .delete_store(&shopper(), &shop.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    ctx.state
        .stores()
        .delete_store(&ctx.admin, &shop.id)
        .await
        .unwrap();
    assert!(ctx.state.stores().store_detail(&shop.id).await.is_err());
}
