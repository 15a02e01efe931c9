//! Roster Core - Domain entities, services, and traits.
//!
//! This crate contains the account validation and mutation rules.
//! It is database-agnostic and defines traits that are implemented
//! by the `storage-sqlite` crate.

pub mod accounts;
pub mod errors;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
