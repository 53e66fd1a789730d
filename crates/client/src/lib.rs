//! Lookoot client library.
//!
//! Typed access to the document store, account and profile services, and
//! the debounced search aggregation manager. The managed backend (document
//! store, authentication, object storage) is reached through the traits in
//! [`remote`] and [`services::auth`]; in-memory implementations are provided
//! for tests and local tooling.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod remote;
pub mod search;
pub mod services;
pub mod state;

pub use error::{AppError, Result};
pub use state::AppState;
