//! User repository.

use chrono::Utc;
use serde_json::{Value, json};
use tracing::{debug, info};

use lookoot_core::{StoreId, StoreOwnerRequestStatus, User, UserId, UserRole};

use super::{RepositoryError, decode, decode_all, encode, fields};
use crate::remote::{Collection, Document, DocumentStore, Query};

/// Repository for the `users` collection.
pub struct UserRepository<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> UserRepository<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Create the profile document for a freshly registered account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a document already exists for the uid.
    pub async fn create(&self, user: &User) -> Result<User, RepositoryError> {
        if self
            .store
            .get(Collection::Users, user.id.as_str())
            .await?
            .is_some()
        {
            return Err(RepositoryError::Conflict(format!(
                "user {} already exists",
                user.id
            )));
        }

        let now = Utc::now();
        let user = User {
            created_at: Some(now),
            last_updated: Some(now),
            ..user.clone()
        };
        self.store
            .set(Collection::Users, user.id.as_str(), encode(&user)?)
            .await?;
        info!(user_id = %user.id, "Created user");
        Ok(user)
    }

    /// Get a user by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the lookup fails.
    pub async fn get(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        debug!(user_id = %id, "Fetching user");
        self.store
            .get(Collection::Users, id.as_str())
            .await?
            .map(|data| decode(id.as_str(), data))
            .transpose()
    }

    /// Get a user by id, failing if absent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such user exists.
    pub async fn require(&self, id: &UserId) -> Result<User, RepositoryError> {
        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// All users, in identifier order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<User>, RepositoryError> {
        decode_all(self.store.query(&Query::new(Collection::Users)).await?)
    }

    /// Merge profile fields into the user document and stamp `lastUpdated`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn update_fields(&self, id: &UserId, mut data: Document) -> Result<(), RepositoryError> {
        data.insert("lastUpdated".to_owned(), json!(Utc::now()));
        self.store
            .update(Collection::Users, id.as_str(), data)
            .await?;
        info!(user_id = %id, "Updated user");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn update_role(&self, id: &UserId, role: UserRole) -> Result<(), RepositoryError> {
        self.update_fields(id, fields([("role", json!(role))])).await
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn update_email(&self, id: &UserId, email: &str) -> Result<(), RepositoryError> {
        self.update_fields(id, fields([("email", json!(email))])).await
    }

    /// Whether `username` is unused by any account other than `except`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the query fails.
    pub async fn is_username_available(
        &self,
        username: &str,
        except: Option<&UserId>,
    ) -> Result<bool, RepositoryError> {
        let query = Query::new(Collection::Users).where_eq("username", username);
        let taken = self
            .store
            .query(&query)
            .await?
            .into_iter()
            .any(|s| except.is_none_or(|uid| uid.as_str() != s.id));
        Ok(!taken)
    }

    /// Mark the user as waiting for store-owner approval.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn request_store_ownership(&self, id: &UserId) -> Result<(), RepositoryError> {
        self.update_fields(
            id,
            fields([(
                "storeOwnerRequestStatus",
                json!(StoreOwnerRequestStatus::Pending),
            )]),
        )
        .await
    }

    /// Approve a pending request: status `APPROVED`, role `STORE_OWNER`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn approve_store_ownership(&self, id: &UserId) -> Result<(), RepositoryError> {
        self.update_fields(
            id,
            fields([
                (
                    "storeOwnerRequestStatus",
                    json!(StoreOwnerRequestStatus::Approved),
                ),
                ("role", json!(UserRole::StoreOwner)),
            ]),
        )
        .await
    }

    /// Decline a request by clearing its status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn decline_store_ownership(&self, id: &UserId) -> Result<(), RepositoryError> {
        self.update_fields(id, fields([("storeOwnerRequestStatus", Value::Null)]))
            .await
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn set_messaging_token(&self, id: &UserId, token: &str) -> Result<(), RepositoryError> {
        self.update_fields(id, fields([("messagingToken", json!(token))]))
            .await
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn add_followed_store(&self, id: &UserId, store_id: &StoreId) -> Result<(), RepositoryError> {
        self.store
            .array_union(
                Collection::Users,
                id.as_str(),
                "followedStores",
                json!(store_id),
            )
            .await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn remove_followed_store(
        &self,
        id: &UserId,
        store_id: &StoreId,
    ) -> Result<(), RepositoryError> {
        self.store
            .array_remove(
                Collection::Users,
                id.as_str(),
                "followedStores",
                json!(store_id),
            )
            .await?;
        Ok(())
    }

    /// Delete the user document.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the delete fails.
    pub async fn delete(&self, id: &UserId) -> Result<(), RepositoryError> {
        self.store.delete(Collection::Users, id.as_str()).await?;
        info!(user_id = %id, "Deleted user");
        Ok(())
    }
}
