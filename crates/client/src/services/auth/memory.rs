//! In-memory authentication provider with Argon2id password hashes.

use std::collections::HashMap;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use lookoot_core::{UserId, validation};

use super::{AuthError, AuthErrorCode, AuthProvider};

/// Passwords shorter than this are rejected as weak.
pub const MIN_PASSWORD_LENGTH: usize = 6;

struct Account {
    uid: UserId,
    password_hash: String,
    email_verified: bool,
}

/// An email the provider would have sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEmail {
    PasswordReset { email: String },
    Verification { uid: UserId, email: String },
}

/// Accounts keyed by lower-cased email address.
///
/// Outbound emails are kept in an outbox instead of being delivered.
#[derive(Default)]
pub struct MemoryAuthProvider {
    accounts: RwLock<HashMap<String, Account>>,
    outbox: RwLock<Vec<AuthEmail>>,
}

impl MemoryAuthProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emails sent so far, oldest first.
    pub async fn sent_emails(&self) -> Vec<AuthEmail> {
        self.outbox.read().await.clone()
    }

    /// Mark the account's email as verified, as following the link would.
    ///
    /// # Errors
    ///
    /// Returns `AuthErrorCode::UserNotFound` for an unknown account.
    pub async fn confirm_email(&self, uid: &UserId) -> Result<(), AuthError> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .values_mut()
            .find(|a| &a.uid == uid)
            .ok_or(AuthErrorCode::UserNotFound)?;
        account.email_verified = true;
        Ok(())
    }
}

impl std::fmt::Debug for MemoryAuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryAuthProvider").finish_non_exhaustive()
    }
}

#[async_trait]
impl AuthProvider for MemoryAuthProvider {
    async fn sign_up(&self, email: &str, password: &SecretString) -> Result<UserId, AuthError> {
        let key = normalize_email(email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&key) {
            return Err(AuthErrorCode::EmailAlreadyInUse.into());
        }
        let uid = UserId::new(Uuid::new_v4().simple().to_string());
        accounts.insert(
            key,
            Account {
                uid: uid.clone(),
                password_hash,
                email_verified: false,
            },
        );
        info!(user_id = %uid, "Registered account");
        Ok(uid)
    }

    async fn sign_in(&self, email: &str, password: &SecretString) -> Result<UserId, AuthError> {
        let key = normalize_email(email)?;
        let accounts = self.accounts.read().await;
        let account = accounts.get(&key).ok_or(AuthErrorCode::UserNotFound)?;
        verify_password(password, &account.password_hash)?;
        debug!(user_id = %account.uid, "Signed in");
        Ok(account.uid.clone())
    }

    async fn change_password(
        &self,
        uid: &UserId,
        current: &SecretString,
        new: &SecretString,
    ) -> Result<(), AuthError> {
        validate_password(new)?;
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .values_mut()
            .find(|a| &a.uid == uid)
            .ok_or(AuthErrorCode::UserNotFound)?;
        verify_password(current, &account.password_hash)?;
        account.password_hash = hash_password(new)?;
        info!(user_id = %uid, "Changed password");
        Ok(())
    }

    async fn change_email(&self, uid: &UserId, new_email: &str) -> Result<(), AuthError> {
        let new_key = normalize_email(new_email)?;
        let mut accounts = self.accounts.write().await;
        if accounts.get(&new_key).is_some_and(|a| &a.uid != uid) {
            return Err(AuthErrorCode::EmailAlreadyInUse.into());
        }
        let old_key = accounts
            .iter()
            .find(|(_, a)| &a.uid == uid)
            .map(|(k, _)| k.clone())
            .ok_or(AuthErrorCode::UserNotFound)?;
        if let Some(mut account) = accounts.remove(&old_key) {
            // A new address has to be verified again
            account.email_verified &= old_key == new_key;
            accounts.insert(new_key, account);
        }
        info!(user_id = %uid, "Changed email");
        Ok(())
    }

    async fn delete_account(&self, uid: &UserId) -> Result<(), AuthError> {
        let mut accounts = self.accounts.write().await;
        let before = accounts.len();
        accounts.retain(|_, a| &a.uid != uid);
        if accounts.len() == before {
            return Err(AuthErrorCode::UserNotFound.into());
        }
        info!(user_id = %uid, "Deleted account");
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let key = normalize_email(email)?;
        if !self.accounts.read().await.contains_key(&key) {
            return Err(AuthErrorCode::UserNotFound.into());
        }
        self.outbox
            .write()
            .await
            .push(AuthEmail::PasswordReset { email: key });
        debug!("Queued password reset email");
        Ok(())
    }

    async fn send_email_verification(&self, uid: &UserId) -> Result<(), AuthError> {
        let email = self
            .accounts
            .read()
            .await
            .iter()
            .find(|(_, a)| &a.uid == uid)
            .map(|(k, _)| k.clone())
            .ok_or(AuthErrorCode::UserNotFound)?;
        self.outbox.write().await.push(AuthEmail::Verification {
            uid: uid.clone(),
            email,
        });
        debug!(user_id = %uid, "Queued verification email");
        Ok(())
    }

    async fn is_email_verified(&self, uid: &UserId) -> Result<bool, AuthError> {
        self.accounts
            .read()
            .await
            .values()
            .find(|a| &a.uid == uid)
            .map(|a| a.email_verified)
            .ok_or_else(|| AuthErrorCode::UserNotFound.into())
    }
}

fn normalize_email(email: &str) -> Result<String, AuthError> {
    validation::email(email)
        .map(|e| e.to_lowercase())
        .map_err(|_| AuthErrorCode::InvalidEmail.into())
}

fn validate_password(password: &SecretString) -> Result<(), AuthError> {
    if password.expose_secret().chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthErrorCode::WeakPassword.into());
    }
    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &SecretString) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.expose_secret().as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored hash.
fn verify_password(password: &SecretString, hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|_| AuthError::PasswordHash)?;
    Argon2::default()
        .verify_password(password.expose_secret().as_bytes(), &parsed)
        .map_err(|_| AuthErrorCode::WrongPassword.into())
}
