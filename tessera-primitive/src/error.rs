//! Error types for the primitive layer.

use tessera_types::PartitionId;
use thiserror::Error;

/// Result type for primitive operations.
pub type PrimitiveResult<T> = Result<T, PrimitiveError>;

/// Errors that can occur while building or operating a primitive.
#[derive(Debug, Error)]
pub enum PrimitiveError {
    /// The primitive configuration names no protocol.
    #[error("no protocol configured")]
    MissingProtocol,

    /// The primitive configuration names no serializer.
    #[error("no serializer configured")]
    MissingSerializer,

    /// No partition group implements the requested protocol.
    #[error("no partition group for protocol {protocol}")]
    NoPartitionGroup { protocol: String },

    /// The partition group could not place the primitive.
    #[error("partition group {group} has no partition for {name}")]
    NoPartition { group: String, name: String },

    /// The session handshake with the hosting partition failed.
    #[error("connection to partition {partition} failed: {reason}")]
    Connection {
        partition: PartitionId,
        reason: String,
    },

    /// A mutating operation was issued on a read-only primitive.
    #[error("{name} is read-only: rejected {operation}")]
    ReadOnly { name: String, operation: String },

    /// The primitive's session has been closed.
    #[error("{name} is closed")]
    Closed { name: String },

    /// The hosting state machine refused the operation.
    #[error("{operation} rejected: {reason}")]
    Rejected { operation: String, reason: String },

    /// The hosting state machine does not implement the operation.
    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    /// No state machine is registered for the primitive type.
    #[error("unsupported primitive type: {0}")]
    UnsupportedType(String),

    /// A document path could not be parsed or is not valid here.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Encoding or decoding an operation envelope failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The configured codec failed.
    #[error("codec error: {0}")]
    Codec(String),

    /// A deferred response was dropped before completing.
    #[error("channel closed")]
    ChannelClosed,
}

impl PrimitiveError {
    /// Shorthand for [`PrimitiveError::Rejected`].
    pub fn rejected(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Rejected {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error was raised before any request left the client.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingProtocol | Self::MissingSerializer)
    }

    /// Whether the error reflects a cluster topology problem.
    pub fn is_topology(&self) -> bool {
        matches!(self, Self::NoPartitionGroup { .. } | Self::NoPartition { .. })
    }
}
