//! Account authentication.
//!
//! The managed authentication backend sits behind [`AuthProvider`]. Failures
//! carry the provider's error code, which [`auth_error_message`] maps to the
//! text shown to users. [`AccountService`] keeps the provider account and
//! the `users` document in step.

mod error;
mod memory;

pub use error::{AuthError, AuthErrorCode, auth_error_message};
pub use memory::{AuthEmail, MIN_PASSWORD_LENGTH, MemoryAuthProvider};

use async_trait::async_trait;
use secrecy::SecretString;
use tracing::{info, warn};

use lookoot_core::{User, UserId, UserRole, ValidationError, validation};

use crate::db::{RepositoryError, UserRepository};
use crate::remote::DocumentStore;

/// Email/password authentication backend.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Create an account and return its uid.
    async fn sign_up(&self, email: &str, password: &SecretString) -> Result<UserId, AuthError>;

    async fn sign_in(&self, email: &str, password: &SecretString) -> Result<UserId, AuthError>;

    async fn change_password(
        &self,
        uid: &UserId,
        current: &SecretString,
        new: &SecretString,
    ) -> Result<(), AuthError>;

    async fn change_email(&self, uid: &UserId, new_email: &str) -> Result<(), AuthError>;

    async fn delete_account(&self, uid: &UserId) -> Result<(), AuthError>;

    /// Email a password reset link to the account registered under `email`.
    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError>;

    /// Email a verification link to the account's current address.
    async fn send_email_verification(&self, uid: &UserId) -> Result<(), AuthError>;

    async fn is_email_verified(&self, uid: &UserId) -> Result<bool, AuthError>;
}

/// Account lifecycle: registration, login, email changes and deletion.
pub struct AccountService<'a> {
    auth: &'a dyn AuthProvider,
    users: UserRepository<'a>,
}

impl<'a> AccountService<'a> {
    #[must_use]
    pub const fn new(auth: &'a dyn AuthProvider, store: &'a dyn DocumentStore) -> Self {
        Self {
            auth,
            users: UserRepository::new(store),
        }
    }

    // =========================================================================
    // Registration & Login
    // =========================================================================

    /// Register a new account and create its profile document.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for a bad username or email, or one
    /// that is already taken, and `AuthError::Provider` if the provider
    /// rejects the credentials.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &SecretString,
        username: &str,
    ) -> Result<User, AuthError> {
        let username = validation::username(username)?;
        let email = validation::email(email)?;
        if !self.users.is_username_available(&username, None).await? {
            return Err(ValidationError::UsernameTaken.into());
        }

        let uid = self.auth.sign_up(&email, password).await?;
        let user = User {
            id: uid.clone(),
            email,
            username,
            role: UserRole::User,
            ..Default::default()
        };

        match self.users.create(&user).await {
            Ok(user) => {
                info!(user_id = %user.id, "Signed up");
                Ok(user)
            }
            Err(e) => {
                // Leave no provider account without a profile behind.
                if let Err(cleanup) = self.auth.delete_account(&uid).await {
                    warn!(user_id = %uid, error = %cleanup, "Failed to remove orphaned account");
                }
                Err(e.into())
            }
        }
    }

    /// Sign in and load the user's profile.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Provider` for bad credentials and
    /// `AuthError::Repository(NotFound)` if the profile document is missing.
    pub async fn log_in(&self, email: &str, password: &SecretString) -> Result<User, AuthError> {
        let uid = self.auth.sign_in(email, password).await?;
        let user = self.users.require(&uid).await?;
        info!(user_id = %uid, "Logged in");
        Ok(user)
    }

    // =========================================================================
    // Account Changes
    // =========================================================================

    /// Change the sign-in email and the profile's copy of it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for a malformed address and
    /// `AuthError::Provider` if the provider rejects the change.
    pub async fn change_email(&self, uid: &UserId, new_email: &str) -> Result<(), AuthError> {
        let email = validation::email(new_email)?;
        self.auth.change_email(uid, &email).await?;
        self.users.update_email(uid, &email).await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `AuthError::Provider` if the current password is wrong or the
    /// new one is too weak.
    pub async fn change_password(
        &self,
        uid: &UserId,
        current: &SecretString,
        new: &SecretString,
    ) -> Result<(), AuthError> {
        self.auth.change_password(uid, current, new).await
    }

    // =========================================================================
    // Recovery & Verification
    // =========================================================================

    /// Send a password reset email.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for a malformed address and
    /// `AuthError::Provider(UserNotFound)` if no account uses it.
    pub async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let email = validation::email(email)?;
        self.auth.send_password_reset(&email).await?;
        info!("Sent password reset email");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `AuthError::Provider(UserNotFound)` for an unknown account.
    pub async fn send_email_verification(&self, uid: &UserId) -> Result<(), AuthError> {
        self.auth.send_email_verification(uid).await?;
        info!(user_id = %uid, "Sent verification email");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `AuthError::Provider(UserNotFound)` for an unknown account.
    pub async fn is_email_verified(&self, uid: &UserId) -> Result<bool, AuthError> {
        self.auth.is_email_verified(uid).await
    }

    /// Delete an account after re-authenticating with its credentials.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Provider` for bad credentials and
    /// `AuthError::AccountMismatch` if they belong to someone else.
    pub async fn delete_account(
        &self,
        uid: &UserId,
        email: &str,
        password: &SecretString,
    ) -> Result<(), AuthError> {
        let confirmed = self.auth.sign_in(email, password).await?;
        if &confirmed != uid {
            return Err(AuthError::AccountMismatch);
        }
        self.auth.delete_account(uid).await?;
        match self.users.delete(uid).await {
            Ok(()) | Err(RepositoryError::NotFound) => {}
            Err(e) => return Err(e.into()),
        }
        info!(user_id = %uid, "Deleted account");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::remote::MemoryStore;

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_owned())
    }

    #[tokio::test]
    async fn test_sign_up_creates_profile() {
        let auth = MemoryAuthProvider::new();
        let store = MemoryStore::new();
        let accounts = AccountService::new(&auth, &store);

        let user = accounts
            .sign_up("shopper@example.com", &secret("hunter22"), "shopper")
            .await
            .unwrap();
        assert_eq!(user.username, "shopper");

        let logged_in = accounts
            .log_in("shopper@example.com", &secret("hunter22"))
            .await
            .unwrap();
        assert_eq!(logged_in.id, user.id);
        assert_eq!(logged_in.email, "shopper@example.com");
    }

    #[tokio::test]
    async fn test_sign_up_rejects_taken_username() {
        let auth = MemoryAuthProvider::new();
        let store = MemoryStore::new();
        let accounts = AccountService::new(&auth, &store);
        accounts
            .sign_up("a@example.com", &secret("hunter22"), "shopper")
            .await
            .unwrap();

        let err = accounts
            .sign_up("b@example.com", &secret("hunter22"), "shopper")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AuthError::Validation(ValidationError::UsernameTaken)
        ));
        assert!(
            auth.sign_in("b@example.com", &secret("hunter22"))
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_password_reset_validates_before_sending() {
        let auth = MemoryAuthProvider::new();
        let store = MemoryStore::new();
        let accounts = AccountService::new(&auth, &store);

        let err = accounts.send_password_reset("nope").await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
        assert!(auth.sent_emails().await.is_empty());
    }

    #[tokio::test]
    async fn test_delete_requires_matching_credentials() {
        let auth = MemoryAuthProvider::new();
        let store = MemoryStore::new();
        let accounts = AccountService::new(&auth, &store);
        let a = accounts
            .sign_up("a@example.com", &secret("hunter22"), "alpha")
            .await
            .unwrap();
        accounts
            .sign_up("b@example.com", &secret("hunter22"), "bravo")
            .await
            .unwrap();

        let err = accounts
            .delete_account(&a.id, "b@example.com", &secret("hunter22"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::AccountMismatch));

        accounts
            .delete_account(&a.id, "a@example.com", &secret("hunter22"))
            .await
            .unwrap();
        assert!(store.get(crate::remote::Collection::Users, a.id.as_str()).await.unwrap().is_none());
    }
}
