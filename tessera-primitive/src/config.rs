//! Primitive configuration.
//!
//! [`PrimitiveConfig`] is a plain mutable record. Setters return `&mut Self`
//! so configuration can be chained, and none of them validate: a missing
//! protocol or serializer is reported when the primitive is built.
//!
//! ```
//! use tessera_primitive::{PrimitiveConfig, PrimitiveProtocol, Serializer};
//!
//! let mut config = PrimitiveConfig::new();
//! config
//!     .set_protocol(PrimitiveProtocol::multi_raft())
//!     .set_serializer(Serializer::json())
//!     .enable_cache()
//!     .set_cache_size(256);
//!
//! assert!(config.is_cache_enabled());
//! assert_eq!(config.cache_size(), 256);
//! ```

use crate::protocol::PrimitiveProtocol;
use crate::serializer::Serializer;
use serde::{Deserialize, Serialize};

/// Capacity of the client-side read cache when none is configured.
pub const DEFAULT_CACHE_SIZE: usize = 1000;

/// How a primitive instance is created and operated.
///
/// The serializer is not part of the serialized form; configs loaded from
/// JSON need one set before they can be built.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrimitiveConfig {
    #[serde(skip)]
    serializer: Option<Serializer>,
    protocol: Option<PrimitiveProtocol>,
    cache_enabled: bool,
    cache_size: usize,
    read_only: bool,
}

impl PrimitiveConfig {
    /// Creates a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the serializer used to encode values held in the primitive.
    pub fn set_serializer(&mut self, serializer: Serializer) -> &mut Self {
        self.serializer = Some(serializer);
        self
    }

    /// Returns the serializer, if one has been set.
    pub fn serializer(&self) -> Option<&Serializer> {
        self.serializer.as_ref()
    }

    /// Sets the protocol, replacing any previous one.
    pub fn set_protocol(&mut self, protocol: PrimitiveProtocol) -> &mut Self {
        self.protocol = Some(protocol);
        self
    }

    /// Returns the protocol, if one has been set.
    pub fn protocol(&self) -> Option<&PrimitiveProtocol> {
        self.protocol.as_ref()
    }

    /// Enables client-side read caching.
    pub fn enable_cache(&mut self) -> &mut Self {
        self.set_cache_enabled(true)
    }

    /// Enables or disables client-side read caching.
    pub fn set_cache_enabled(&mut self, cache_enabled: bool) -> &mut Self {
        self.cache_enabled = cache_enabled;
        self
    }

    /// Returns whether client-side read caching is enabled.
    pub fn is_cache_enabled(&self) -> bool {
        self.cache_enabled
    }

    /// Sets the cache capacity. Ignored unless caching is enabled.
    pub fn set_cache_size(&mut self, cache_size: usize) -> &mut Self {
        self.cache_size = cache_size;
        self
    }

    /// Returns the configured cache capacity.
    pub fn cache_size(&self) -> usize {
        self.cache_size
    }

    /// Marks the primitive read-only.
    pub fn enable_read_only(&mut self) -> &mut Self {
        self.set_read_only(true)
    }

    /// Sets whether the primitive is read-only.
    pub fn set_read_only(&mut self, read_only: bool) -> &mut Self {
        self.read_only = read_only;
        self
    }

    /// Returns whether the primitive is read-only.
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Cache capacity if caching is enabled.
    pub fn cache_capacity(&self) -> Option<usize> {
        self.cache_enabled.then_some(self.cache_size)
    }
}

impl Default for PrimitiveConfig {
    fn default() -> Self {
        Self {
            serializer: None,
            protocol: None,
            cache_enabled: false,
            cache_size: DEFAULT_CACHE_SIZE,
            read_only: false,
        }
    }
}
