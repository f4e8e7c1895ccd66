//! Value codecs.
//!
//! The primitive layer never inspects user values. It stores a
//! [`Serializer`] handle in the primitive configuration and hands it to the
//! primitive facade, which uses it to turn values into bytes before they are
//! placed in an operation.

use crate::error::{PrimitiveError, PrimitiveResult};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;

/// A pluggable wire encoding for primitive values.
///
/// Codecs work on the `serde_json::Value` data model so that they stay
/// object-safe; [`Serializer`] bridges typed values to it.
pub trait Codec: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    fn encode(&self, value: &serde_json::Value) -> PrimitiveResult<Vec<u8>>;

    fn decode(&self, bytes: &[u8]) -> PrimitiveResult<serde_json::Value>;
}

/// JSON text encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn name(&self) -> &str {
        "json"
    }

    fn encode(&self, value: &serde_json::Value) -> PrimitiveResult<Vec<u8>> {
        Ok(serde_json::to_vec(value)?)
    }

    fn decode(&self, bytes: &[u8]) -> PrimitiveResult<serde_json::Value> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Shared handle to a codec.
#[derive(Clone)]
pub struct Serializer {
    codec: Arc<dyn Codec>,
}

impl Serializer {
    pub fn new(codec: impl Codec + 'static) -> Self {
        Self {
            codec: Arc::new(codec),
        }
    }

    /// A serializer backed by [`JsonCodec`].
    pub fn json() -> Self {
        Self::new(JsonCodec)
    }

    pub fn codec_name(&self) -> &str {
        self.codec.name()
    }

    pub fn encode<T: Serialize + ?Sized>(&self, value: &T) -> PrimitiveResult<Vec<u8>> {
        let value = serde_json::to_value(value)?;
        self.codec.encode(&value)
    }

    pub fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> PrimitiveResult<T> {
        let value = self.codec.decode(bytes)?;
        serde_json::from_value(value).map_err(|e| PrimitiveError::Codec(e.to_string()))
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Self::json()
    }
}

impl fmt::Debug for Serializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Serializer")
            .field("codec", &self.codec.name())
            .finish()
    }
}
