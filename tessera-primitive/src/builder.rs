//! Primitive construction.
//!
//! One generic [`PrimitiveBuilder`] serves every primitive kind. What differs
//! between kinds (type identity, partition key, how a connected proxy is
//! wrapped) lives in a small [`PrimitiveKind`] strategy.
//!
//! ## Build Process
//!
//! 1. **Protocol**: Read the configured protocol and serializer (no I/O)
//! 2. **Group**: Resolve the partition group implementing the protocol
//! 3. **Partition**: Route the primitive's key to one partition of the group
//! 4. **Client**: Take the partition's primitive client
//! 5. **Proxy**: Create a proxy for the name, type and protocol
//! 6. **Connect**: Open the session (the only suspension point)
//! 7. **Wrap**: Build the typed asynchronous primitive, then its blocking facade
//!
//! Each step fails with its own error and nothing is retried.

use crate::config::PrimitiveConfig;
use crate::error::{PrimitiveError, PrimitiveResult};
use crate::management::PrimitiveManagementService;
use crate::primitive_type::{Ordering, PrimitiveType};
use crate::protocol::PrimitiveProtocol;
use crate::proxy::PrimitiveProxy;
use crate::serializer::Serializer;
use crate::session::{PrimitiveContext, ProxySession};
use async_trait::async_trait;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

/// An asynchronous primitive facade.
#[async_trait]
pub trait AsyncPrimitive: Send + Sync + 'static {
    fn name(&self) -> &str;

    fn primitive_type(&self) -> &PrimitiveType;

    /// Closes the primitive's session.
    async fn close(&self) -> PrimitiveResult<()>;
}

/// Per-kind construction strategy.
pub trait PrimitiveKind: Send + Sync + 'static {
    /// Builder options specific to the kind.
    type Options: Clone + Default + Send + Sync + 'static;

    /// The asynchronous facade.
    type Async: AsyncPrimitive;

    /// The blocking facade.
    type Sync: Send + 'static;

    /// The canonical type descriptor.
    fn base_type() -> PrimitiveType;

    /// The descriptor for the given options. Must be a pure function of them.
    fn primitive_type(options: &Self::Options) -> PrimitiveType {
        let _ = options;
        Self::base_type()
    }

    /// The key routed to a partition. Defaults to the primitive name.
    fn partition_key<'a>(name: &'a str, options: &Self::Options) -> &'a str {
        let _ = options;
        name
    }

    /// Wraps a connected session into the asynchronous facade.
    fn wrap(context: PrimitiveContext, options: &Self::Options) -> PrimitiveResult<Self::Async>;

    /// Adapts the asynchronous facade into the blocking one.
    fn synchronize(primitive: Self::Async, runtime: Handle) -> Self::Sync;
}

/// Kinds whose type identity is parameterized by a child ordering.
pub trait OrderedKind: PrimitiveKind {
    fn ordering(options: &Self::Options) -> Option<Ordering>;

    fn set_ordering(options: &mut Self::Options, ordering: Option<Ordering>);
}

/// Builds a named primitive of kind `K`.
pub struct PrimitiveBuilder<K: PrimitiveKind> {
    name: String,
    config: PrimitiveConfig,
    options: K::Options,
    management: PrimitiveManagementService,
    _kind: PhantomData<fn() -> K>,
}

impl<K: PrimitiveKind> PrimitiveBuilder<K> {
    pub fn new(name: impl Into<String>, management: PrimitiveManagementService) -> Self {
        Self::with_config(name, PrimitiveConfig::default(), management)
    }

    pub fn with_config(
        name: impl Into<String>,
        config: PrimitiveConfig,
        management: PrimitiveManagementService,
    ) -> Self {
        Self {
            name: name.into(),
            config,
            options: K::Options::default(),
            management,
            _kind: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &PrimitiveConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut PrimitiveConfig {
        &mut self.config
    }

    pub fn options(&self) -> &K::Options {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut K::Options {
        &mut self.options
    }

    pub fn with_serializer(mut self, serializer: Serializer) -> Self {
        self.config.set_serializer(serializer);
        self
    }

    pub fn with_protocol(mut self, protocol: PrimitiveProtocol) -> Self {
        self.config.set_protocol(protocol);
        self
    }

    pub fn with_cache_enabled(mut self) -> Self {
        self.config.enable_cache();
        self
    }

    pub fn with_cache_size(mut self, cache_size: usize) -> Self {
        self.config.set_cache_size(cache_size);
        self
    }

    pub fn with_read_only(mut self) -> Self {
        self.config.enable_read_only();
        self
    }

    /// The type descriptor the primitive will be created with.
    pub fn primitive_type(&self) -> PrimitiveType {
        K::primitive_type(&self.options)
    }

    /// Builds the primitive and returns its blocking facade.
    pub async fn build_async(&self) -> PrimitiveResult<K::Sync> {
        let primitive = self.build_async_primitive().await?;
        Ok(K::synchronize(primitive, self.management.runtime().clone()))
    }

    /// Builds the primitive and returns its asynchronous facade.
    pub async fn build_async_primitive(&self) -> PrimitiveResult<K::Async> {
        let mut proxy = self.new_proxy()?;

        let connected = proxy.connect().await;
        if let Err(e) = connected {
            warn!(
                name = %self.name,
                partition = %proxy.partition_id(),
                "failed to connect primitive: {e}"
            );
            return Err(e);
        }
        let proxy: Arc<dyn PrimitiveProxy> = Arc::from(proxy);
        info!(
            name = %self.name,
            primitive_type = %proxy.primitive_type(),
            partition = %proxy.partition_id(),
            session = ?proxy.session_id(),
            "primitive connected"
        );

        let context = PrimitiveContext::new(
            ProxySession::new(proxy.clone(), self.config.is_read_only()),
            self.serializer()?.clone(),
            self.config.cache_capacity(),
        );
        match K::wrap(context, &self.options) {
            Ok(primitive) => Ok(primitive),
            Err(e) => {
                if let Err(close_err) = proxy.close().await {
                    debug!(name = %self.name, "failed to close proxy: {close_err}");
                }
                Err(e)
            }
        }
    }

    /// Blocking variant of [`build_async`](Self::build_async), driven on the
    /// management service's runtime.
    ///
    /// # Panics
    ///
    /// Panics when called from inside an asynchronous task.
    pub fn build(&self) -> PrimitiveResult<K::Sync> {
        self.management.runtime().block_on(self.build_async())
    }

    fn serializer(&self) -> PrimitiveResult<&Serializer> {
        self.config
            .serializer()
            .ok_or(PrimitiveError::MissingSerializer)
    }

    /// Steps 1-5: local resolution down to an unconnected proxy.
    fn new_proxy(&self) -> PrimitiveResult<Box<dyn PrimitiveProxy>> {
        let protocol = self
            .config
            .protocol()
            .ok_or(PrimitiveError::MissingProtocol)?;
        self.serializer()?;

        let group = self
            .management
            .partition_service()
            .partition_group(protocol)
            .ok_or_else(|| PrimitiveError::NoPartitionGroup {
                protocol: protocol.to_string(),
            })?;

        let key = K::partition_key(&self.name, &self.options);
        let partition = group
            .partition_for(key)
            .ok_or_else(|| PrimitiveError::NoPartition {
                group: group.name().to_string(),
                name: self.name.clone(),
            })?;

        let primitive_type = self.primitive_type();
        debug!(
            name = %self.name,
            primitive_type = %primitive_type,
            group = group.name(),
            partition = %partition.id(),
            "resolved partition"
        );

        partition
            .client()
            .new_proxy(&self.name, &primitive_type, protocol)
    }
}

impl<K: OrderedKind> PrimitiveBuilder<K> {
    /// Sets the order in which children are listed.
    pub fn with_ordering(mut self, ordering: Ordering) -> Self {
        K::set_ordering(&mut self.options, Some(ordering));
        self
    }

    /// Clears the ordering, returning to the canonical type.
    pub fn without_ordering(mut self) -> Self {
        K::set_ordering(&mut self.options, None);
        self
    }

    pub fn ordering(&self) -> Option<Ordering> {
        K::ordering(&self.options)
    }
}

impl<K: PrimitiveKind> Clone for PrimitiveBuilder<K> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            config: self.config.clone(),
            options: self.options.clone(),
            management: self.management.clone(),
            _kind: PhantomData,
        }
    }
}

impl<K: PrimitiveKind> std::fmt::Debug for PrimitiveBuilder<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrimitiveBuilder")
            .field("name", &self.name)
            .field("type", &self.primitive_type())
            .field("config", &self.config)
            .finish()
    }
}
