//! Shared services primitives are built against.

use crate::partition::PartitionService;
use std::fmt;
use std::sync::Arc;
use tokio::runtime::Handle;

/// Cluster-facing services shared by every primitive builder.
///
/// The runtime handle drives blocking facades: synchronous primitives block
/// their caller on this runtime.
#[derive(Clone)]
pub struct PrimitiveManagementService {
    partition_service: Arc<dyn PartitionService>,
    runtime: Handle,
}

impl PrimitiveManagementService {
    pub fn new(partition_service: Arc<dyn PartitionService>, runtime: Handle) -> Self {
        Self {
            partition_service,
            runtime,
        }
    }

    /// Uses the runtime the caller is running on.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn current(partition_service: Arc<dyn PartitionService>) -> Self {
        Self::new(partition_service, Handle::current())
    }

    pub fn partition_service(&self) -> &Arc<dyn PartitionService> {
        &self.partition_service
    }

    pub fn runtime(&self) -> &Handle {
        &self.runtime
    }
}

impl fmt::Debug for PrimitiveManagementService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let groups: Vec<String> = self
            .partition_service
            .partition_groups()
            .iter()
            .map(|g| g.name().to_string())
            .collect();
        f.debug_struct("PrimitiveManagementService")
            .field("groups", &groups)
            .finish()
    }
}
