//! Account moderation, restricted to administrators.

use tracing::{info, warn};

use lookoot_core::{User, UserId, UserRole};

use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::remote::DocumentStore;

/// Administrator actions on user accounts.
pub struct AdminService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AdminService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self {
            users: UserRepository::new(store),
        }
    }

    /// # Errors
    ///
    /// Returns `AppError::Forbidden` unless `actor` is an administrator.
    pub async fn list_users(&self, actor: &User) -> Result<Vec<User>> {
        ensure_admin(actor)?;
        Ok(self.users.list_all().await?)
    }

    /// Users waiting for a store-owner decision.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` unless `actor` is an administrator.
    pub async fn pending_requests(&self, actor: &User) -> Result<Vec<User>> {
        Ok(self
            .list_users(actor)
            .await?
            .into_iter()
            .filter(User::has_pending_store_request)
            .collect())
    }

    /// Grant store ownership.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` unless `actor` is an administrator.
    pub async fn approve_store_owner(&self, actor: &User, uid: &UserId) -> Result<()> {
        ensure_admin(actor)?;
        self.users.approve_store_ownership(uid).await?;
        info!(admin_id = %actor.id, user_id = %uid, "Approved store owner request");
        Ok(())
    }

    /// Reject a request, clearing its status.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` unless `actor` is an administrator.
    pub async fn decline_store_owner(&self, actor: &User, uid: &UserId) -> Result<()> {
        ensure_admin(actor)?;
        self.users.decline_store_ownership(uid).await?;
        info!(admin_id = %actor.id, user_id = %uid, "Declined store owner request");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `AppError::Forbidden` unless `actor` is an administrator.
    pub async fn set_role(&self, actor: &User, uid: &UserId, role: UserRole) -> Result<()> {
        ensure_admin(actor)?;
        self.users.update_role(uid, role).await?;
        info!(admin_id = %actor.id, user_id = %uid, %role, "Changed role");
        Ok(())
    }
}

fn ensure_admin(actor: &User) -> Result<()> {
    if actor.is_admin() {
        Ok(())
    } else {
        warn!(user_id = %actor.id, "Rejected admin action");
        Err(AppError::Forbidden(format!("{} is not an administrator", actor.id)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::remote::MemoryStore;
    use lookoot_core::StoreOwnerRequestStatus;

    async fn seed(store: &MemoryStore) -> (User, User) {
        let users = UserRepository::new(store);
        let admin = users
            .create(&User {
                id: UserId::new("admin"),
                role: UserRole::Admin,
                ..Default::default()
            })
            .await
            .unwrap();
        let shopper = users
            .create(&User {
                id: UserId::new("shopper"),
                store_owner_request_status: Some(StoreOwnerRequestStatus::Pending),
                ..Default::default()
            })
            .await
            .unwrap();
        (admin, shopper)
    }

    #[tokio::test]
    async fn test_non_admin_is_forbidden() {
        let store = MemoryStore::new();
        let (_, shopper) = seed(&store).await;
        let admin = AdminService::new(&store);

        assert!(matches!(
            admin.list_users(&shopper).await.unwrap_err(),
            AppError::Forbidden(_)
        ));
        assert!(matches!(
            admin
                .set_role(&shopper, &shopper.id, UserRole::Admin)
                .await
                .unwrap_err(),
            AppError::Forbidden(_)
        ));
    }

    #[tokio::test]
    async fn test_approve_pending_request() {
        let store = MemoryStore::new();
        let (actor, shopper) = seed(&store).await;
        let admin = AdminService::new(&store);

        let pending = admin.pending_requests(&actor).await.unwrap();
        assert_eq!(pending.len(), 1);

        admin.approve_store_owner(&actor, &shopper.id).await.unwrap();
        let updated = UserRepository::new(&store).require(&shopper.id).await.unwrap();
        assert_eq!(updated.role, UserRole::StoreOwner);
        assert!(admin.pending_requests(&actor).await.unwrap().is_empty());
    }
}
