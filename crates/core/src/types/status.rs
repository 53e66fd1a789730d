//! Role and request status enums for user documents.

use serde::{Deserialize, Serialize};

/// Account role with different permission levels.
///
/// Stored in the `role` field of a user document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Browses stores and items, writes reviews.
    #[default]
    User,
    /// Manages one or more stores and their inventories.
    StoreOwner,
    /// Moderates accounts and approves store-owner requests.
    Admin,
}

impl UserRole {
    /// Whether this role may manage store inventories.
    #[must_use]
    pub const fn can_manage_stores(self) -> bool {
        matches!(self, Self::StoreOwner | Self::Admin)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "USER"),
            Self::StoreOwner => write!(f, "STORE_OWNER"),
            Self::Admin => write!(f, "ADMIN"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "USER" => Ok(Self::User),
            "STORE_OWNER" => Ok(Self::StoreOwner),
            "ADMIN" => Ok(Self::Admin),
            _ => Err(format!("invalid user role: {s}")),
        }
    }
}

/// Progress of a user's request to become a store owner.
///
/// Absent on the document until the user asks; cleared when declined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StoreOwnerRequestStatus {
    Pending,
    Approved,
}
