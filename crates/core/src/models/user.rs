//! User documents.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::types::lenient;
use crate::{StoreId, StoreOwnerRequestStatus, UserId, UserRole};

/// Username shown until the user picks one.
pub const PLACEHOLDER_USERNAME: &str = "N/A";

/// A Lookoot account. The document ID is the authentication provider's uid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    #[serde(deserialize_with = "lenient::or_default")]
    pub id: UserId,
    #[serde(deserialize_with = "lenient::or_default")]
    pub email: String,
    #[serde(deserialize_with = "username_or_placeholder")]
    pub username: String,
    #[serde(deserialize_with = "lenient::or_default")]
    pub bio: String,
    #[serde(deserialize_with = "lenient::or_default")]
    pub role: UserRole,
    #[serde(deserialize_with = "lenient::or_default")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub followers: Vec<UserId>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub following: Vec<UserId>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub store_owner_request_status: Option<StoreOwnerRequestStatus>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub profile_picture_url: Option<String>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub followed_stores: Vec<StoreId>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub phone_number: Option<String>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(rename = "isDarkMode", deserialize_with = "lenient::or_default")]
    pub dark_mode: bool,
    #[serde(deserialize_with = "lenient::or_default")]
    pub messaging_token: Option<String>,
}

impl Default for User {
    fn default() -> Self {
        Self {
            id: UserId::default(),
            email: String::new(),
            username: PLACEHOLDER_USERNAME.to_owned(),
            bio: String::new(),
            role: UserRole::default(),
            created_at: None,
            last_updated: None,
            followers: Vec::new(),
            following: Vec::new(),
            store_owner_request_status: None,
            profile_picture_url: None,
            followed_stores: Vec::new(),
            phone_number: None,
            date_of_birth: None,
            dark_mode: false,
            messaging_token: None,
        }
    }
}

impl User {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    #[must_use]
    pub fn has_pending_store_request(&self) -> bool {
        self.store_owner_request_status == Some(StoreOwnerRequestStatus::Pending)
    }
}

fn username_or_placeholder<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value
        .as_str()
        .map_or_else(|| PLACEHOLDER_USERNAME.to_owned(), str::to_owned))
}
