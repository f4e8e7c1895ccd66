//! Partition topology abstraction.
//!
//! Defines the traits a protocol implementation exposes to the primitive
//! layer: a service listing partition groups, groups owning partitions, and
//! partitions handing out primitive clients. The primitive layer only reads
//! through these traits and never changes membership or routing.

use crate::error::PrimitiveResult;
use crate::primitive_type::PrimitiveType;
use crate::protocol::{PrimitiveProtocol, ProtocolType};
use crate::proxy::PrimitiveProxy;
use std::sync::Arc;
use tessera_types::PartitionId;
use xxhash_rust::xxh3::xxh3_64;

/// Creates proxies for primitives hosted on one partition.
pub trait PrimitiveClient: Send + Sync {
    /// Creates an unconnected proxy. Local; performs no I/O.
    fn new_proxy(
        &self,
        name: &str,
        primitive_type: &PrimitiveType,
        protocol: &PrimitiveProtocol,
    ) -> PrimitiveResult<Box<dyn PrimitiveProxy>>;
}

/// One independently replicated shard.
pub trait Partition: Send + Sync {
    fn id(&self) -> PartitionId;

    /// The partition's already-connected primitive client.
    fn client(&self) -> Arc<dyn PrimitiveClient>;
}

/// A set of partitions implementing one protocol.
pub trait PartitionGroup: Send + Sync {
    fn name(&self) -> &str;

    fn protocol_type(&self) -> &ProtocolType;

    fn partitions(&self) -> Vec<Arc<dyn Partition>>;

    fn partition(&self, id: PartitionId) -> Option<Arc<dyn Partition>> {
        self.partitions().into_iter().find(|p| p.id() == id)
    }

    /// Returns the partition owning `key`.
    ///
    /// Partitions are ordered by id before routing, so the result depends
    /// only on the key and the set of partition ids.
    fn partition_for(&self, key: &str) -> Option<Arc<dyn Partition>> {
        let mut partitions = self.partitions();
        partitions.sort_by_key(|p| p.id());
        let index = partition_index(key, partitions.len())?;
        Some(partitions.swap_remove(index))
    }
}

/// Resolves partition groups for protocols.
pub trait PartitionService: Send + Sync {
    fn partition_groups(&self) -> Vec<Arc<dyn PartitionGroup>>;

    /// Returns the group a protocol resolves to.
    ///
    /// A protocol naming a group must match that group's name and protocol
    /// type. Otherwise the first group implementing the protocol type wins.
    fn partition_group(&self, protocol: &PrimitiveProtocol) -> Option<Arc<dyn PartitionGroup>> {
        self.partition_groups().into_iter().find(|group| {
            group.protocol_type() == &protocol.protocol_type
                && protocol.group.as_deref().is_none_or(|name| group.name() == name)
        })
    }
}

/// Maps a key onto one of `count` partitions.
///
/// Returns `None` for an empty group.
pub fn partition_index(key: &str, count: usize) -> Option<usize> {
    if count == 0 {
        return None;
    }
    Some((xxh3_64(key.as_bytes()) % count as u64) as usize)
}
