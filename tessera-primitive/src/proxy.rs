//! Proxy abstraction.
//!
//! A proxy is the client side of a session between one primitive instance
//! and the partition hosting it. Protocol implementations provide proxies
//! through their [`PrimitiveClient`](crate::partition::PrimitiveClient);
//! everything above this trait is protocol-agnostic.

use crate::error::PrimitiveResult;
use crate::primitive_type::PrimitiveType;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::fmt;
use tessera_types::{PartitionId, SessionId};
use tokio::sync::broadcast;

/// Whether an operation may change primitive state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Mutates state. Rejected on read-only primitives.
    Command,
    /// Reads state only.
    Query,
}

/// Names an operation understood by a primitive's state machine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperationId {
    name: Cow<'static, str>,
    kind: OperationKind,
}

impl OperationId {
    pub const fn command(name: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            kind: OperationKind::Command,
        }
    }

    pub const fn query(name: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            kind: OperationKind::Query,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A single request submitted through a proxy.
///
/// Payloads are JSON envelopes; values carried inside them have already been
/// encoded by the primitive's configured serializer.
#[derive(Debug, Clone)]
pub struct Operation {
    id: OperationId,
    payload: Vec<u8>,
}

impl Operation {
    pub fn new(id: OperationId, payload: Vec<u8>) -> Self {
        Self { id, payload }
    }

    /// Builds an operation with an encoded request envelope.
    pub fn encode<T: Serialize + ?Sized>(id: OperationId, request: &T) -> PrimitiveResult<Self> {
        Ok(Self {
            id,
            payload: serde_json::to_vec(request)?,
        })
    }

    pub fn id(&self) -> &OperationId {
        &self.id
    }

    pub fn is_command(&self) -> bool {
        self.id.kind == OperationKind::Command
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Decodes the request envelope.
    pub fn decode<T: DeserializeOwned>(&self) -> PrimitiveResult<T> {
        Ok(serde_json::from_slice(&self.payload)?)
    }
}

/// A change notification published by a primitive's state machine to every
/// session of that primitive.
#[derive(Debug, Clone)]
pub struct PrimitiveEvent {
    kind: String,
    payload: Vec<u8>,
}

impl PrimitiveEvent {
    pub fn encode<T: Serialize + ?Sized>(
        kind: impl Into<String>,
        body: &T,
    ) -> PrimitiveResult<Self> {
        Ok(Self {
            kind: kind.into(),
            payload: serde_json::to_vec(body)?,
        })
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn decode<T: DeserializeOwned>(&self) -> PrimitiveResult<T> {
        Ok(serde_json::from_slice(&self.payload)?)
    }
}

/// Client side of a primitive session.
#[async_trait]
pub trait PrimitiveProxy: Send + Sync {
    /// The primitive name.
    fn name(&self) -> &str;

    /// The type the session was opened for.
    fn primitive_type(&self) -> &PrimitiveType;

    /// The partition hosting the primitive.
    fn partition_id(&self) -> PartitionId;

    /// The session id, once connected.
    fn session_id(&self) -> Option<SessionId>;

    /// Returns whether a session is established and not yet closed.
    fn is_connected(&self) -> bool;

    /// Opens the session. This is the only step of primitive construction
    /// that talks to the partition.
    async fn connect(&mut self) -> PrimitiveResult<()>;

    /// Submits an operation and waits for its result.
    async fn execute(&self, operation: Operation) -> PrimitiveResult<Vec<u8>>;

    /// Subscribes to events published by the primitive.
    fn events(&self) -> PrimitiveResult<broadcast::Receiver<PrimitiveEvent>>;

    /// Closes the session, releasing any state it holds on the partition.
    async fn close(&self) -> PrimitiveResult<()>;
}
