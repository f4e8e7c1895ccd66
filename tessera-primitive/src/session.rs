//! Typed access to a connected proxy.

use crate::error::{PrimitiveError, PrimitiveResult};
use crate::primitive_type::PrimitiveType;
use crate::proxy::{Operation, OperationId, OperationKind, PrimitiveEvent, PrimitiveProxy};
use crate::serializer::Serializer;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use tessera_types::{PartitionId, SessionId};
use tokio::sync::broadcast;
use tracing::debug;

/// A connected proxy plus the client-side gates every operation passes.
///
/// Read-only sessions reject commands here, before anything is sent.
#[derive(Clone)]
pub struct ProxySession {
    proxy: Arc<dyn PrimitiveProxy>,
    read_only: bool,
}

impl ProxySession {
    pub fn new(proxy: Arc<dyn PrimitiveProxy>, read_only: bool) -> Self {
        Self { proxy, read_only }
    }

    pub fn name(&self) -> &str {
        self.proxy.name()
    }

    pub fn primitive_type(&self) -> &PrimitiveType {
        self.proxy.primitive_type()
    }

    pub fn partition_id(&self) -> PartitionId {
        self.proxy.partition_id()
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.proxy.session_id()
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn is_connected(&self) -> bool {
        self.proxy.is_connected()
    }

    /// Encodes `request`, executes it and decodes the response.
    pub async fn invoke<Req, Resp>(&self, id: OperationId, request: &Req) -> PrimitiveResult<Resp>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        if self.read_only && id.kind() == OperationKind::Command {
            return Err(PrimitiveError::ReadOnly {
                name: self.name().to_string(),
                operation: id.name().to_string(),
            });
        }
        debug!(name = self.name(), operation = %id, "executing");
        let operation = Operation::encode(id, request)?;
        let response = self.proxy.execute(operation).await?;
        Ok(serde_json::from_slice(&response)?)
    }

    pub fn events(&self) -> PrimitiveResult<broadcast::Receiver<PrimitiveEvent>> {
        self.proxy.events()
    }

    pub async fn close(&self) -> PrimitiveResult<()> {
        self.proxy.close().await
    }
}

impl fmt::Debug for ProxySession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxySession")
            .field("name", &self.name())
            .field("type", self.primitive_type())
            .field("partition", &self.partition_id())
            .field("session", &self.session_id())
            .field("read_only", &self.read_only)
            .finish()
    }
}

/// Everything a primitive facade is constructed from.
#[derive(Debug, Clone)]
pub struct PrimitiveContext {
    session: ProxySession,
    serializer: Serializer,
    cache_capacity: Option<usize>,
}

impl PrimitiveContext {
    pub fn new(
        session: ProxySession,
        serializer: Serializer,
        cache_capacity: Option<usize>,
    ) -> Self {
        Self {
            session,
            serializer,
            cache_capacity,
        }
    }

    pub fn session(&self) -> &ProxySession {
        &self.session
    }

    pub fn serializer(&self) -> &Serializer {
        &self.serializer
    }

    /// Capacity of the client-side read cache, if caching is enabled.
    pub fn cache_capacity(&self) -> Option<usize> {
        self.cache_capacity
    }
}
