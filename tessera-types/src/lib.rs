//! Core type definitions for Tessera.
//!
//! This crate defines the small, protocol-agnostic values shared by the
//! primitive layer and the primitives built on it:
//! - Partition and session identifiers
//! - Monotonic versions and versioned values
//!
//! Nothing here knows about partitions, protocols or proxies; those live in
//! `tessera-primitive`.

mod ids;
mod version;

pub use ids::{PartitionId, SessionId};
pub use version::{Version, Versioned};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("invalid partition id: {0}")]
    InvalidPartitionId(String),
}
