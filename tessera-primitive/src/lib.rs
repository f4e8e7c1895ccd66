//! Primitive construction and access layer for Tessera.
//!
//! A primitive is a named, replicated data structure hosted on one partition
//! of a cluster. This crate turns a name plus a [`PrimitiveConfig`] into a
//! connected, typed handle:
//!
//! # Architecture
//!
//! - **Config**: Serializer, protocol, caching and read-only settings
//! - **Types**: Primitive type descriptors, optionally ordered
//! - **Partition**: Traits a protocol implements to expose its topology
//! - **Proxy**: The client side of a session with a primitive's partition
//! - **Builder**: Resolves a partition, connects a proxy and wraps it
//! - **Blocking**: Drives asynchronous primitives from synchronous callers
//!
//! Protocols plug in by implementing [`PartitionService`],
//! [`PartitionGroup`], [`Partition`], [`PrimitiveClient`] and
//! [`PrimitiveProxy`]. The [`local`] module provides an in-process
//! implementation.
//!
//! # Example
//!
//! ```
//! use tessera_primitive::{Ordering, PrimitiveType};
//!
//! let tree = PrimitiveType::new("document-tree");
//! let sorted = tree.ordered(Ordering::Natural);
//!
//! assert!(sorted.is_same_kind(&tree));
//! assert_eq!(sorted.to_string(), "document-tree[natural]");
//! ```

mod blocking;
mod builder;
mod config;
mod error;
pub mod local;
mod management;
pub mod partition;
mod primitive_type;
mod protocol;
pub mod proxy;
mod serializer;
mod session;

pub use blocking::Blocking;
pub use builder::{AsyncPrimitive, OrderedKind, PrimitiveBuilder, PrimitiveKind};
pub use config::{DEFAULT_CACHE_SIZE, PrimitiveConfig};
pub use error::{PrimitiveError, PrimitiveResult};
pub use management::PrimitiveManagementService;
pub use partition::{
    Partition, PartitionGroup, PartitionService, PrimitiveClient, partition_index,
};
pub use primitive_type::{Ordering, PrimitiveType};
pub use protocol::{Consistency, PrimitiveProtocol, ProtocolType};
pub use proxy::{Operation, OperationId, OperationKind, PrimitiveEvent, PrimitiveProxy};
pub use serializer::{Codec, JsonCodec, Serializer};
pub use session::{PrimitiveContext, ProxySession};
