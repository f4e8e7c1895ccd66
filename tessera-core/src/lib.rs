//! Distributed lock and document tree primitives for Tessera.
//!
//! [`Tessera`] is the entry point: it hands out builders for each primitive
//! kind, pre-loaded with a default [`PrimitiveConfig`].
//!
//! ```no_run
//! use tessera_core::{DocumentPath, Tessera};
//!
//! # async fn demo() -> tessera_primitive::PrimitiveResult<()> {
//! let tessera = Tessera::local(3, tokio::runtime::Handle::current());
//!
//! let lock = tessera.lock_builder("jobs").build_async_primitive().await?;
//! let fence = lock.lock().await?;
//!
//! let tree = tessera.tree_builder::<String>("config").build_async_primitive().await?;
//! tree.set(&DocumentPath::parse("/owner")?, &format!("worker@{fence}")).await?;
//! lock.unlock().await?;
//! # Ok(())
//! # }
//! ```

pub mod lock;
pub mod tree;

pub use lock::{
    AsyncDistributedLock, DistributedLock, DistributedLockBuilder, LOCK_TYPE, LockKind,
    LockService,
};
pub use tree::{
    AsyncDocumentTree, DOCUMENT_TREE_TYPE, DocumentPath, DocumentTree, DocumentTreeBuilder,
    DocumentTreeKind, DocumentTreeService, TreeOptions, TreeValue,
};

use std::sync::Arc;
use tessera_primitive::local::{LocalPartitionGroup, LocalPartitionService, ServiceRegistry};
use tessera_primitive::{
    PartitionService, PrimitiveConfig, PrimitiveManagementService, PrimitiveProtocol,
    ProtocolType, Serializer,
};
use tokio::runtime::Handle;

/// Name of the partition group created by [`local_partition_service`].
pub const LOCAL_GROUP: &str = "raft";

/// State machines for every primitive kind in this crate.
pub fn services() -> ServiceRegistry {
    let mut registry = ServiceRegistry::new();
    registry
        .register(&LOCK_TYPE, |_| Ok(Box::new(LockService::new())))
        .register(&DOCUMENT_TREE_TYPE, |primitive_type| {
            Ok(Box::new(DocumentTreeService::new(primitive_type.ordering())))
        });
    registry
}

/// An in-process multi-raft group of `partitions` partitions hosting every
/// primitive kind in this crate.
pub fn local_partition_service(partitions: u32) -> LocalPartitionService {
    LocalPartitionService::new().with_group(LocalPartitionGroup::new(
        LOCAL_GROUP,
        ProtocolType::MULTI_RAFT,
        partitions,
        &services(),
    ))
}

/// Hands out primitive builders sharing one management service and a default
/// configuration.
#[derive(Debug, Clone)]
pub struct Tessera {
    management: PrimitiveManagementService,
    defaults: PrimitiveConfig,
}

impl Tessera {
    /// Builders start from the multi-raft protocol and the JSON serializer.
    pub fn new(management: PrimitiveManagementService) -> Self {
        let mut defaults = PrimitiveConfig::default();
        defaults
            .set_protocol(PrimitiveProtocol::multi_raft())
            .set_serializer(Serializer::json());
        Self::with_default_config(management, defaults)
    }

    pub fn with_default_config(
        management: PrimitiveManagementService,
        defaults: PrimitiveConfig,
    ) -> Self {
        Self {
            management,
            defaults,
        }
    }

    /// Connects to a fresh [`local_partition_service`].
    pub fn local(partitions: u32, runtime: Handle) -> Self {
        let service: Arc<dyn PartitionService> = Arc::new(local_partition_service(partitions));
        Self::new(PrimitiveManagementService::new(service, runtime))
    }

    pub fn lock_builder(&self, name: impl Into<String>) -> DistributedLockBuilder {
        DistributedLockBuilder::with_config(name, self.defaults.clone(), self.management.clone())
    }

    pub fn tree_builder<V: TreeValue>(&self, name: impl Into<String>) -> DocumentTreeBuilder<V> {
        DocumentTreeBuilder::with_config(name, self.defaults.clone(), self.management.clone())
    }

    pub fn management(&self) -> &PrimitiveManagementService {
        &self.management
    }

    pub fn default_config(&self) -> &PrimitiveConfig {
        &self.defaults
    }

    pub fn default_config_mut(&mut self) -> &mut PrimitiveConfig {
        &mut self.defaults
    }
}
