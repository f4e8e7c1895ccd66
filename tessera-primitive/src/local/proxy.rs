//! Sessions against in-process partitions.

use super::partition::{PartitionState, PrimitiveInstance};
use super::service::{ServiceContext, ServiceResponse};
use crate::error::{PrimitiveError, PrimitiveResult};
use crate::primitive_type::PrimitiveType;
use crate::protocol::Consistency;
use crate::proxy::{Operation, PrimitiveEvent, PrimitiveProxy};
use async_trait::async_trait;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError};
use tessera_types::{PartitionId, SessionId};
use tokio::sync::broadcast;
use tracing::debug;

struct Connection {
    session: SessionId,
    instance: Arc<PrimitiveInstance>,
}

/// Proxy for a primitive hosted on a [`LocalPartition`](super::LocalPartition).
pub struct LocalProxy {
    name: String,
    primitive_type: PrimitiveType,
    consistency: Consistency,
    partition: Arc<PartitionState>,
    connection: Option<Connection>,
    closed: AtomicBool,
}

impl LocalProxy {
    pub(crate) fn new(
        name: &str,
        primitive_type: PrimitiveType,
        consistency: Consistency,
        partition: Arc<PartitionState>,
    ) -> Self {
        Self {
            name: name.to_string(),
            primitive_type,
            consistency,
            partition,
            connection: None,
            closed: AtomicBool::new(false),
        }
    }

    /// The consistency level requested through the protocol.
    pub fn consistency(&self) -> Consistency {
        self.consistency
    }

    fn connection(&self) -> PrimitiveResult<&Connection> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(PrimitiveError::Closed {
                name: self.name.clone(),
            });
        }
        self.connection.as_ref().ok_or_else(|| PrimitiveError::Closed {
            name: self.name.clone(),
        })
    }
}

#[async_trait]
impl PrimitiveProxy for LocalProxy {
    fn name(&self) -> &str {
        &self.name
    }

    fn primitive_type(&self) -> &PrimitiveType {
        &self.primitive_type
    }

    fn partition_id(&self) -> PartitionId {
        self.partition.id
    }

    fn session_id(&self) -> Option<SessionId> {
        self.connection.as_ref().map(|c| c.session)
    }

    fn is_connected(&self) -> bool {
        self.connection.is_some() && !self.closed.load(Ordering::SeqCst)
    }

    async fn connect(&mut self) -> PrimitiveResult<()> {
        if self.connection.is_some() {
            return Ok(());
        }
        self.partition.admit()?;
        // Sessions are opened asynchronously even in-process.
        tokio::task::yield_now().await;

        let instance = self.partition.instance(&self.name, &self.primitive_type)?;
        let session = SessionId::new();
        debug!(
            partition = %self.partition.id,
            name = %self.name,
            %session,
            "opened session"
        );
        self.connection = Some(Connection { session, instance });
        Ok(())
    }

    async fn execute(&self, operation: Operation) -> PrimitiveResult<Vec<u8>> {
        let connection = self.connection()?;
        self.partition.record_operation();

        let response = {
            let mut service = connection
                .instance
                .service
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let mut context = ServiceContext::new(connection.session, &connection.instance.events);
            service.apply(&mut context, &operation)
        };

        match response {
            ServiceResponse::Ready(result) => result,
            ServiceResponse::Deferred(receiver) => {
                receiver.await.map_err(|_| PrimitiveError::ChannelClosed)?
            }
        }
    }

    fn events(&self) -> PrimitiveResult<broadcast::Receiver<PrimitiveEvent>> {
        Ok(self.connection()?.instance.events.subscribe())
    }

    async fn close(&self) -> PrimitiveResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        if let Some(connection) = &self.connection {
            let mut service = connection
                .instance
                .service
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let mut context = ServiceContext::new(connection.session, &connection.instance.events);
            service.on_close(&mut context);
            debug!(
                partition = %self.partition.id,
                name = %self.name,
                session = %connection.session,
                "closed session"
            );
        }
        Ok(())
    }
}

impl fmt::Debug for LocalProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalProxy")
            .field("name", &self.name)
            .field("type", &self.primitive_type)
            .field("partition", &self.partition.id)
            .field("session", &self.session_id())
            .finish()
    }
}
