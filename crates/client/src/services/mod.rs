//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Account registration, login and deletion
//! - `profile` - Profile edits, personal details and profile pictures
//! - `stores` - Store and inventory management, reviews and follows
//! - `admin` - Store-owner approvals and role changes
//! - `notifications` - Messaging tokens and push rendering
//!
//! Services borrow their backends for the duration of a call; construct
//! them from an [`AppState`](crate::AppState) as needed.

pub mod admin;
pub mod auth;
pub mod notifications;
pub mod profile;
pub mod stores;

pub use admin::AdminService;
pub use auth::{AccountService, AuthProvider, MemoryAuthProvider};
pub use notifications::{NotificationService, NotificationSink};
pub use profile::ProfileService;
pub use stores::{StoreDetail, StoreService};
