//! Document types for the `users`, `stores`, `items` and `reviews` collections.
//!
//! Field names follow the document store's camelCase convention. Every
//! field has a default so that partially written documents still decode.

pub mod item;
pub mod review;
pub mod store;
pub mod user;

pub use item::Item;
pub use review::Review;
pub use store::{OpeningHours, Store, WEEKDAYS};
pub use user::User;
