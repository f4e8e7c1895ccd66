//! In-process partitions.

use super::proxy::LocalProxy;
use super::service::{PrimitiveService, ServiceRegistry};
use crate::error::{PrimitiveError, PrimitiveResult};
use crate::partition::{Partition, PartitionGroup, PartitionService, PrimitiveClient};
use crate::primitive_type::PrimitiveType;
use crate::protocol::{PrimitiveProtocol, ProtocolType};
use crate::proxy::{PrimitiveEvent, PrimitiveProxy};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tessera_types::PartitionId;
use tokio::sync::broadcast;
use tracing::debug;

/// Event buffer per primitive instance. Slow subscribers past this lag.
const EVENT_CAPACITY: usize = 256;

/// One hosted primitive: its state machine and its event channel.
pub(crate) struct PrimitiveInstance {
    pub(crate) primitive_type: PrimitiveType,
    pub(crate) service: Mutex<Box<dyn PrimitiveService>>,
    pub(crate) events: broadcast::Sender<PrimitiveEvent>,
}

/// State shared by a partition, its client and every proxy it created.
pub(crate) struct PartitionState {
    pub(crate) id: PartitionId,
    registry: ServiceRegistry,
    instances: Mutex<HashMap<String, Arc<PrimitiveInstance>>>,
    refuse_connections: AtomicBool,
    connect_attempts: AtomicUsize,
    operations: AtomicUsize,
}

impl PartitionState {
    fn new(id: PartitionId, registry: ServiceRegistry) -> Self {
        Self {
            id,
            registry,
            instances: Mutex::new(HashMap::new()),
            refuse_connections: AtomicBool::new(false),
            connect_attempts: AtomicUsize::new(0),
            operations: AtomicUsize::new(0),
        }
    }

    /// Records a connect attempt and fails it if the partition refuses.
    pub(crate) fn admit(&self) -> PrimitiveResult<()> {
        self.connect_attempts.fetch_add(1, Ordering::SeqCst);
        if self.refuse_connections.load(Ordering::SeqCst) {
            return Err(PrimitiveError::Connection {
                partition: self.id,
                reason: "partition refused the session".into(),
            });
        }
        Ok(())
    }

    pub(crate) fn record_operation(&self) {
        self.operations.fetch_add(1, Ordering::SeqCst);
    }

    /// Returns the hosted instance for `name`, creating it on first use.
    pub(crate) fn instance(
        &self,
        name: &str,
        primitive_type: &PrimitiveType,
    ) -> PrimitiveResult<Arc<PrimitiveInstance>> {
        let mut instances = self.instances.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = instances.get(name) {
            if &existing.primitive_type != primitive_type {
                return Err(PrimitiveError::Connection {
                    partition: self.id,
                    reason: format!(
                        "{name} is hosted as {}, not {primitive_type}",
                        existing.primitive_type
                    ),
                });
            }
            return Ok(existing.clone());
        }

        let service = self.registry.create(primitive_type)?;
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let instance = Arc::new(PrimitiveInstance {
            primitive_type: primitive_type.clone(),
            service: Mutex::new(service),
            events,
        });
        debug!(partition = %self.id, name, primitive_type = %primitive_type, "created primitive");
        instances.insert(name.to_string(), instance.clone());
        Ok(instance)
    }
}

/// Client for one in-process partition.
pub struct LocalPrimitiveClient {
    state: Arc<PartitionState>,
}

impl LocalPrimitiveClient {
    pub fn partition_id(&self) -> PartitionId {
        self.state.id
    }

    /// Makes every following connect attempt fail (or succeed again).
    pub fn refuse_connections(&self, refuse: bool) {
        self.state.refuse_connections.store(refuse, Ordering::SeqCst);
    }

    /// Number of connect attempts seen by the partition.
    pub fn connect_attempts(&self) -> usize {
        self.state.connect_attempts.load(Ordering::SeqCst)
    }

    /// Number of operations executed by the partition.
    pub fn operation_count(&self) -> usize {
        self.state.operations.load(Ordering::SeqCst)
    }

    /// Names of the primitives hosted on the partition, sorted.
    pub fn primitive_names(&self) -> Vec<String> {
        let instances = self
            .state
            .instances
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = instances.keys().cloned().collect();
        names.sort();
        names
    }
}

impl PrimitiveClient for LocalPrimitiveClient {
    fn new_proxy(
        &self,
        name: &str,
        primitive_type: &PrimitiveType,
        protocol: &PrimitiveProtocol,
    ) -> PrimitiveResult<Box<dyn PrimitiveProxy>> {
        if !self.state.registry.supports(primitive_type) {
            return Err(PrimitiveError::UnsupportedType(primitive_type.to_string()));
        }
        Ok(Box::new(LocalProxy::new(
            name,
            primitive_type.clone(),
            protocol.consistency,
            self.state.clone(),
        )))
    }
}

impl fmt::Debug for LocalPrimitiveClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalPrimitiveClient")
            .field("partition", &self.state.id)
            .finish()
    }
}

/// An in-process partition.
#[derive(Debug)]
pub struct LocalPartition {
    id: PartitionId,
    client: Arc<LocalPrimitiveClient>,
}

impl LocalPartition {
    pub fn new(id: PartitionId, registry: ServiceRegistry) -> Self {
        Self {
            id,
            client: Arc::new(LocalPrimitiveClient {
                state: Arc::new(PartitionState::new(id, registry)),
            }),
        }
    }

    /// The concrete client, for inspection.
    pub fn local_client(&self) -> &Arc<LocalPrimitiveClient> {
        &self.client
    }
}

impl Partition for LocalPartition {
    fn id(&self) -> PartitionId {
        self.id
    }

    fn client(&self) -> Arc<dyn PrimitiveClient> {
        self.client.clone()
    }
}

/// A group of in-process partitions implementing one protocol type.
#[derive(Debug)]
pub struct LocalPartitionGroup {
    name: String,
    protocol_type: ProtocolType,
    partitions: Vec<Arc<LocalPartition>>,
}

impl LocalPartitionGroup {
    /// Creates a group with partitions numbered `1..=partition_count`, each
    /// hosting the state machines in `registry`.
    pub fn new(
        name: impl Into<String>,
        protocol_type: ProtocolType,
        partition_count: u32,
        registry: &ServiceRegistry,
    ) -> Self {
        let partitions = (1..=partition_count)
            .map(|id| Arc::new(LocalPartition::new(PartitionId::new(id), registry.clone())))
            .collect();
        Self {
            name: name.into(),
            protocol_type,
            partitions,
        }
    }

    pub fn local_partitions(&self) -> &[Arc<LocalPartition>] {
        &self.partitions
    }

    pub fn local_partition(&self, id: PartitionId) -> Option<&Arc<LocalPartition>> {
        self.partitions.iter().find(|p| p.id == id)
    }

    /// Connect attempts summed over the group's partitions.
    pub fn connect_attempts(&self) -> usize {
        self.partitions
            .iter()
            .map(|p| p.client.connect_attempts())
            .sum()
    }

    /// Sets [`LocalPrimitiveClient::refuse_connections`] on every partition.
    pub fn refuse_connections(&self, refuse: bool) {
        for partition in &self.partitions {
            partition.client.refuse_connections(refuse);
        }
    }
}

impl PartitionGroup for LocalPartitionGroup {
    fn name(&self) -> &str {
        &self.name
    }

    fn protocol_type(&self) -> &ProtocolType {
        &self.protocol_type
    }

    fn partitions(&self) -> Vec<Arc<dyn Partition>> {
        self.partitions
            .iter()
            .map(|p| p.clone() as Arc<dyn Partition>)
            .collect()
    }
}

/// Partition service over in-process groups.
#[derive(Debug, Default)]
pub struct LocalPartitionService {
    groups: Vec<Arc<LocalPartitionGroup>>,
}

impl LocalPartitionService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group(mut self, group: LocalPartitionGroup) -> Self {
        self.groups.push(Arc::new(group));
        self
    }

    pub fn group(&self, name: &str) -> Option<&Arc<LocalPartitionGroup>> {
        self.groups.iter().find(|g| g.name == name)
    }
}

impl PartitionService for LocalPartitionService {
    fn partition_groups(&self) -> Vec<Arc<dyn PartitionGroup>> {
        self.groups
            .iter()
            .map(|g| g.clone() as Arc<dyn PartitionGroup>)
            .collect()
    }
}
