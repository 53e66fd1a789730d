//! Subcommand implementations.

pub mod fixture;
pub mod notify;
pub mod search;
pub mod store;
