//! Profile editing.
//!
//! Every field is validated before anything is sent to the backend, so a
//! rejected edit leaves the stored profile untouched.

use chrono::NaiveDate;
use serde_json::{Value, json};
use tracing::info;
use url::Url;
use uuid::Uuid;

use lookoot_core::{User, UserId, ValidationError, validation};

use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::remote::{BlobStore, Document, DocumentStore};

/// Object path for a new profile picture.
#[must_use]
pub fn profile_picture_path(uid: &UserId) -> String {
    format!(
        "profilePictures/{uid}/profile_{uid}_{}.jpg",
        Uuid::new_v4().simple()
    )
}

/// Profile updates for the signed-in user.
pub struct ProfileService<'a> {
    users: UserRepository<'a>,
    blobs: &'a dyn BlobStore,
}

impl<'a> ProfileService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore, blobs: &'a dyn BlobStore) -> Self {
        Self {
            users: UserRepository::new(store),
            blobs,
        }
    }

    /// # Errors
    ///
    /// Returns `AppError::Database` with `NotFound` if the user does not exist.
    pub async fn get(&self, uid: &UserId) -> Result<User> {
        Ok(self.users.require(uid).await?)
    }

    /// Change username and bio.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if the username is malformed or
    /// belongs to another account.
    pub async fn update_profile(&self, uid: &UserId, username: &str, bio: &str) -> Result<()> {
        let username = validation::username(username)?;
        if !self.users.is_username_available(&username, Some(uid)).await? {
            return Err(ValidationError::UsernameTaken.into());
        }
        let mut fields = Document::new();
        fields.insert("username".to_owned(), json!(username));
        fields.insert("bio".to_owned(), json!(bio.trim()));
        self.users.update_fields(uid, fields).await?;
        Ok(())
    }

    /// Set phone number and date of birth. Blank values clear the field.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for a non-UK-mobile number, an
    /// unparseable date, or a date after `today`.
    pub async fn update_personal_details(
        &self,
        uid: &UserId,
        phone_number: &str,
        date_of_birth: &str,
        today: NaiveDate,
    ) -> Result<()> {
        let phone = phone_number.trim();
        let phone = if phone.is_empty() {
            Value::Null
        } else {
            validation::uk_phone_number(phone)?;
            json!(phone)
        };
        let dob = if date_of_birth.trim().is_empty() {
            Value::Null
        } else {
            json!(validation::date_of_birth(date_of_birth, today)?)
        };

        let mut fields = Document::new();
        fields.insert("phoneNumber".to_owned(), phone);
        fields.insert("dateOfBirth".to_owned(), dob);
        self.users.update_fields(uid, fields).await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `AppError::Database` if the user does not exist.
    pub async fn set_dark_mode(&self, uid: &UserId, enabled: bool) -> Result<()> {
        let mut fields = Document::new();
        fields.insert("isDarkMode".to_owned(), json!(enabled));
        self.users.update_fields(uid, fields).await?;
        Ok(())
    }

    /// Upload a JPEG profile picture and point the profile at it.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for an empty upload and
    /// `AppError::Storage` if the upload fails.
    pub async fn upload_profile_picture(&self, uid: &UserId, jpeg: Vec<u8>) -> Result<Url> {
        if jpeg.is_empty() {
            return Err(ValidationError::Required("Profile picture").into());
        }
        // Fail before uploading if the profile is gone.
        self.users.require(uid).await?;

        let path = profile_picture_path(uid);
        let url = self.blobs.upload(&path, jpeg, "image/jpeg").await?;
        let mut fields = Document::new();
        fields.insert("profilePictureUrl".to_owned(), json!(url.as_str()));
        self.users.update_fields(uid, fields).await?;
        info!(user_id = %uid, %path, "Uploaded profile picture");
        Ok(url)
    }

    /// Ask an administrator to make this user a store owner.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` if the user can already manage stores.
    pub async fn request_store_ownership(&self, uid: &UserId) -> Result<()> {
        let user = self.users.require(uid).await?;
        if user.role.can_manage_stores() {
            return Err(AppError::Forbidden(format!(
                "{} is already a {}",
                user.id, user.role
            )));
        }
        self.users.request_store_ownership(uid).await?;
        info!(user_id = %uid, "Requested store ownership");
        Ok(())
    }
}
