//! State machine interface for locally hosted primitives.

use crate::error::{PrimitiveError, PrimitiveResult};
use crate::primitive_type::PrimitiveType;
use crate::proxy::{Operation, PrimitiveEvent};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tessera_types::SessionId;
use tokio::sync::{broadcast, oneshot};

/// Result of applying an operation.
pub enum ServiceResponse {
    /// The operation completed.
    Ready(PrimitiveResult<Vec<u8>>),
    /// The operation completes later, when the state machine answers through
    /// the paired sender (for example a lock waiter being granted).
    Deferred(oneshot::Receiver<PrimitiveResult<Vec<u8>>>),
}

impl ServiceResponse {
    /// Completes with an encoded value.
    pub fn ok<T: Serialize + ?Sized>(value: &T) -> Self {
        Self::Ready(serde_json::to_vec(value).map_err(PrimitiveError::from))
    }

    /// Completes with an encoded value or the error.
    pub fn from_result<T: Serialize>(result: PrimitiveResult<T>) -> Self {
        match result {
            Ok(value) => Self::ok(&value),
            Err(e) => Self::err(e),
        }
    }

    pub fn err(error: PrimitiveError) -> Self {
        Self::Ready(Err(error))
    }

    pub fn deferred(receiver: oneshot::Receiver<PrimitiveResult<Vec<u8>>>) -> Self {
        Self::Deferred(receiver)
    }
}

impl fmt::Debug for ServiceResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(result) => f.debug_tuple("Ready").field(&result.is_ok()).finish(),
            Self::Deferred(_) => f.write_str("Deferred"),
        }
    }
}

/// What a state machine sees of the session that issued an operation.
pub struct ServiceContext<'a> {
    session: SessionId,
    events: &'a broadcast::Sender<PrimitiveEvent>,
}

impl<'a> ServiceContext<'a> {
    pub fn new(session: SessionId, events: &'a broadcast::Sender<PrimitiveEvent>) -> Self {
        Self { session, events }
    }

    /// The session that issued the operation.
    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Publishes an event to every open session of the primitive.
    pub fn publish(&self, event: PrimitiveEvent) {
        // No receivers is not an error.
        let _ = self.events.send(event);
    }
}

/// A primitive state machine.
pub trait PrimitiveService: Send {
    fn apply(&mut self, context: &mut ServiceContext<'_>, operation: &Operation)
    -> ServiceResponse;

    /// Called once when a session of the primitive closes.
    fn on_close(&mut self, context: &mut ServiceContext<'_>) {
        let _ = context;
    }
}

/// Creates a state machine for a (possibly ordered) primitive type.
pub type ServiceFactory =
    Arc<dyn Fn(&PrimitiveType) -> PrimitiveResult<Box<dyn PrimitiveService>> + Send + Sync>;

/// State machine factories keyed by primitive type name.
#[derive(Clone, Default)]
pub struct ServiceRegistry {
    factories: HashMap<String, ServiceFactory>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the factory for every variant of `primitive_type`.
    pub fn register<F>(&mut self, primitive_type: &PrimitiveType, factory: F) -> &mut Self
    where
        F: Fn(&PrimitiveType) -> PrimitiveResult<Box<dyn PrimitiveService>> + Send + Sync + 'static,
    {
        self.factories
            .insert(primitive_type.name().to_string(), Arc::new(factory));
        self
    }

    pub fn supports(&self, primitive_type: &PrimitiveType) -> bool {
        self.factories.contains_key(primitive_type.name())
    }

    pub fn create(&self, primitive_type: &PrimitiveType) -> PrimitiveResult<Box<dyn PrimitiveService>> {
        let factory = self
            .factories
            .get(primitive_type.name())
            .ok_or_else(|| PrimitiveError::UnsupportedType(primitive_type.to_string()))?;
        factory(primitive_type)
    }
}

impl fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        types.sort_unstable();
        f.debug_struct("ServiceRegistry").field("types", &types).finish()
    }
}
