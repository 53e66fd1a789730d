//! Lookoot Core - Shared domain types.
//!
//! This crate provides the document types used across all Lookoot components:
//! - `client` - Repositories, services and the search manager
//! - `cli` - Fixture loading and search tooling
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no document
//! store access, no async runtime. Documents are decoded leniently: a missing
//! or malformed field falls back to its default instead of rejecting the
//! whole document.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, tags, roles and geo points
//! - [`models`] - User, store, item and review documents
//! - [`validation`] - Input checks run before any remote call

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::ValidationError;
