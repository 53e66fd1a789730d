//! Account lifecycle from sign-up to deletion.

#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use secrecy::SecretString;

use lookoot_client::AppError;
use lookoot_client::services::auth::{
    AccountService, AuthEmail, AuthError, AuthErrorCode, MemoryAuthProvider,
};
use lookoot_core::{StoreOwnerRequestStatus, ValidationError};
use lookoot_integration_tests::{TestContext, store};

fn secret(s: &str) -> SecretString {
    SecretString::from(s.to_owned())
}

#[tokio::test]
async fn test_sign_up_edit_profile_and_log_in() {
    let ctx = TestContext::new().await;
    let accounts = ctx.state.accounts();

    let user = accounts
        .sign_up(" Morag@Example.com ", &secret("tattie5cone"), "morag")
        .await
        .unwrap();
    assert_eq!(user.email, "Morag@Example.com");

    let profiles = ctx.state.profiles();
    profiles
        .update_profile(&user.id, "morag.m", "Knits and reads")
        .await
        .unwrap();
    profiles
        .update_personal_details(
            &user.id,
            "+44 7700 900123",
            "1988-02-29",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        )
        .await
        .unwrap();
    profiles.set_dark_mode(&user.id, true).await.unwrap();

    let logged_in = accounts
        .log_in("morag@example.com", &secret("tattie5cone"))
        .await
        .unwrap();
    assert_eq!(logged_in.id, user.id);
    assert_eq!(logged_in.username, "morag.m");
    assert_eq!(logged_in.bio, "Knits and reads");
    assert!(logged_in.dark_mode);
    assert_eq!(
        logged_in.date_of_birth,
        NaiveDate::from_ymd_opt(1988, 2, 29)
    );
}

#[tokio::test]
async fn test_provider_errors_map_to_user_messages() {
    let ctx = TestContext::new().await;
    let accounts = ctx.state.accounts();

    let weak = accounts
        .sign_up("weak@example.com", &secret("abc"), "weakling")
        .await
        .unwrap_err();
    assert!(matches!(
        weak,
        AuthError::Provider(AuthErrorCode::WeakPassword)
    ));
    assert_eq!(
        AppError::from(weak).user_message(),
        "The password is too weak."
    );

    accounts
        .sign_up("taken@example.com", &secret("hunter22"), "first")
        .await
        .unwrap();
    let taken = accounts
        .sign_up("taken@example.com", &secret("hunter22"), "second")
        .await
        .unwrap_err();
    assert_eq!(
        taken.user_message(),
        "The email address is already in use by another account."
    );

    let wrong = accounts
        .log_in("taken@example.com", &secret("not-it"))
        .await
        .unwrap_err();
    assert_eq!(wrong.user_message(), "The password is incorrect.");

    let bad_name = accounts
        .sign_up("name@example.com", &secret("hunter22"), "no spaces!")
        .await
        .unwrap_err();
    assert!(matches!(
        bad_name,
        AuthError::Validation(ValidationError::UsernameCharacters)
    ));
}

#[tokio::test]
async fn test_change_email_and_password() {
    let ctx = TestContext::new().await;
    let accounts = ctx.state.accounts();
    let user = accounts
        .sign_up("old@example.com", &secret("hunter22"), "mover")
        .await
        .unwrap();

    accounts
        .change_email(&user.id, "new@example.com")
        .await
        .unwrap();
    accounts
        .change_password(&user.id, &secret("hunter22"), &secret("hunter33"))
        .await
        .unwrap();

    assert!(
        accounts
            .log_in("old@example.com", &secret("hunter33"))
            .await
            .is_err()
    );
    let user = accounts
        .log_in("new@example.com", &secret("hunter33"))
        .await
        .unwrap();
    assert_eq!(user.email, "new@example.com");
}

#[tokio::test]
async fn test_password_reset_email() {
    let ctx = TestContext::new().await;
    let auth = MemoryAuthProvider::new();
    let accounts = AccountService::new(&auth, ctx.state.store());
    accounts
        .sign_up("forgetful@example.com", &secret("hunter22"), "forgetful")
        .await
        .unwrap();

    let unknown = accounts
        .send_password_reset("stranger@example.com")
        .await
        .unwrap_err();
    assert_eq!(
        AppError::from(unknown).user_message(),
        "There is no user account with this email."
    );

    accounts
        .send_password_reset(" Forgetful@Example.com ")
        .await
        .unwrap();
    assert_eq!(
        auth.sent_emails().await,
        [AuthEmail::PasswordReset {
            email: "forgetful@example.com".into()
        }]
    );
}

#[tokio::test]
async fn test_email_verification_flow() {
    let ctx = TestContext::new().await;
    let auth = MemoryAuthProvider::new();
    let accounts = AccountService::new(&auth, ctx.state.store());
    let user = accounts
        .sign_up("fresh@example.com", &secret("hunter22"), "fresh")
        .await
        .unwrap();
    assert!(!accounts.is_email_verified(&user.id).await.unwrap());

    accounts.send_email_verification(&user.id).await.unwrap();
    assert!(matches!(
        auth.sent_emails().await.as_slice(),
        [AuthEmail::Verification { uid, email }] if uid == &user.id && email == "fresh@example.com"
    ));
    // Not verified until the link is followed
    assert!(!accounts.is_email_verified(&user.id).await.unwrap());

    auth.confirm_email(&user.id).await.unwrap();
    assert!(accounts.is_email_verified(&user.id).await.unwrap());

    accounts
        .change_email(&user.id, "moved@example.com")
        .await
        .unwrap();
    assert!(!accounts.is_email_verified(&user.id).await.unwrap());
}

#[tokio::test]
async fn test_store_ownership_request_to_first_store() {
    let ctx = TestContext::new().await;
    let user = ctx
        .state
        .accounts()
        .sign_up("maker@example.com", &secret("hunter22"), "maker")
        .await
        .unwrap();

    // A plain user cannot open a store yet
    let refused = ctx
        .state
        .stores()
        .create_store(&user, &store("Maker Space", &[], &[]))
        .await
        .unwrap_err();
    assert!(matches!(refused, AppError::Forbidden(_)));

    ctx.state
        .profiles()
        .request_store_ownership(&user.id)
        .await
        .unwrap();
    let pending = ctx.state.admin().pending_requests(&ctx.admin).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(
        pending[0].store_owner_request_status,
        Some(StoreOwnerRequestStatus::Pending)
    );

    ctx.state
        .admin()
        .approve_store_owner(&ctx.admin, &user.id)
        .await
        .unwrap();
    let owner = ctx.state.profiles().get(&user.id).await.unwrap();
    let opened = ctx
        .state
        .stores()
        .create_store(&owner, &store("Maker Space", &[], &[]))
        .await
        .unwrap();
    assert_eq!(
        ctx.state.stores().stores_owned_by(&owner.id).await.unwrap(),
        [opened]
    );

    // Already an owner, so a second request is refused
    assert!(matches!(
        ctx.state
            .profiles()
            .request_store_ownership(&user.id)
            .await
            .unwrap_err(),
        AppError::Forbidden(_)
    ));
}

#[tokio::test]
async fn test_follow_and_unfollow_store() {
    let ctx = TestContext::new().await;
    let shop = ctx.open(&store("Followable", &[], &[])).await;
    let fan = ctx
        .state
        .accounts()
        .sign_up("fan@example.com", &secret("hunter22"), "fan")
        .await
        .unwrap();

    ctx.state.stores().follow_store(&fan.id, &shop.id).await.unwrap();
    ctx.state.stores().follow_store(&fan.id, &shop.id).await.unwrap();
    let detail = ctx.state.stores().store_detail(&shop.id).await.unwrap();
    assert_eq!(detail.store.followers, [fan.id.clone()]);
    assert_eq!(
        ctx.state.profiles().get(&fan.id).await.unwrap().followed_stores,
        [shop.id.clone()]
    );

    ctx.state
        .stores()
        .unfollow_store(&fan.id, &shop.id)
        .await
        .unwrap();
    let detail = ctx.state.stores().store_detail(&shop.id).await.unwrap();
    assert!(detail.store.followers.is_empty());
}

#[tokio::test]
async fn test_delete_account_removes_profile() {
    let ctx = TestContext::new().await;
    let accounts = ctx.state.accounts();
    let user = accounts
        .sign_up("leaving@example.com", &secret("hunter22"), "leaving")
        .await
        .unwrap();

    let wrong = accounts
        .delete_account(&user.id, "leaving@example.com", &secret("guess"))
        .await
        .unwrap_err();
    assert!(matches!(
        wrong,
        AuthError::Provider(AuthErrorCode::WrongPassword)
    ));

    accounts
        .delete_account(&user.id, "leaving@example.com", &secret("hunter22"))
        .await
        .unwrap();
    assert!(ctx.state.profiles().get(&user.id).await.is_err());
    assert!(
        accounts
            .log_in("leaving@example.com", &secret("hunter22"))
            .await
            .is_err()
    );
}
