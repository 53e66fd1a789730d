//! Administrator moderation and push notification registration.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use serde_json::json;

use lookoot_client::AppError;
use lookoot_client::services::notifications::{MemorySink, PushMessage, handle_push};
use lookoot_core::{User, UserId, UserRole};
use lookoot_integration_tests::TestContext;

async fn requester(ctx: &TestContext, id: &str) -> User {
    let users = lookoot_client::db::UserRepository::new(ctx.state.store());
    let user = users
        .create(&User {
            id: UserId::new(id),
            username: id.to_owned(),
            ..Default::default()
        })
        .await
        .unwrap();
    ctx.state
        .profiles()
        .request_store_ownership(&user.id)
        .await
        .unwrap();
    user
}

#[tokio::test]
async fn test_admin_reviews_pending_requests() {
    let ctx = TestContext::new().await;
    let approved = requester(&ctx, "approved").await;
    let declined = requester(&ctx, "declined").await;
    let admin = ctx.state.admin();

    let mut pending: Vec<UserId> = admin
        .pending_requests(&ctx.admin)
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.id)
        .collect();
    pending.sort();
    assert_eq!(pending, [approved.id.clone(), declined.id.clone()]);

    admin
        .approve_store_owner(&ctx.admin, &approved.id)
        .await
        .unwrap();
    admin
        .decline_store_owner(&ctx.admin, &declined.id)
        .await
        .unwrap();
    assert!(admin.pending_requests(&ctx.admin).await.unwrap().is_empty());

    let profiles = ctx.state.profiles();
    assert_eq!(
        profiles.get(&approved.id).await.unwrap().role,
        UserRole::StoreOwner
    );
    let declined = profiles.get(&declined.id).await.unwrap();
    assert_eq!(declined.role, UserRole::User);
    assert!(declined.store_owner_request_status.is_none());
}

#[tokio::test]
async fn test_role_changes_need_an_admin() {
    let ctx = TestContext::new().await;
    let admin = ctx.state.admin();

    let err = admin
        .set_role(&ctx.owner, &ctx.owner.id, UserRole::Admin)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
    assert_eq!(err.user_message(), "You do not have permission to do that.");

    admin
        .set_role(&ctx.admin, &ctx.owner.id, UserRole::User)
        .await
        .unwrap();
    let demoted = ctx.state.profiles().get(&ctx.owner.id).await.unwrap();
    assert_eq!(demoted.role, UserRole::User);

    let everyone = admin.list_users(&ctx.admin).await.unwrap();
    assert_eq!(everyone.len(), 2);
}

#[tokio::test]
async fn test_register_token_and_render_push() {
    let ctx = TestContext::new().await;
    ctx.state
        .notifications()
        .register_token(&ctx.owner.id, "device-123")
        .await
        .unwrap();
    assert_eq!(
        ctx.state
            .profiles()
            .get(&ctx.owner.id)
            .await
            .unwrap()
            .messaging_token
            .as_deref(),
        Some("device-123")
    );

    let message: PushMessage = serde_json::from_value(json!({
        "from": "lookoot",
        "notification": {"title": "New follower"}
    }))
    .unwrap();
    let sink = MemorySink::new();
    assert_eq!(handle_push(&message, &sink), 1);
    let shown = sink.shown();
    assert_eq!(shown[0].title, "New follower");
    assert_eq!(shown[0].body, "");
}
