//! Core types for Lookoot.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod geo;
pub mod id;
pub mod lenient;
pub mod price;
pub mod status;
pub mod tags;

pub use geo::GeoPoint;
pub use id::*;
pub use price::Price;
pub use status::*;
pub use tags::Tags;
