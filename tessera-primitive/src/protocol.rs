//! Primitive protocol descriptors.
//!
//! A protocol names the replication mechanism a primitive should be hosted
//! by. The partition service maps it to a partition group; the group's
//! clients receive it unchanged when creating proxies.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Name of a protocol family implemented by partition groups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProtocolType(Cow<'static, str>);

impl ProtocolType {
    /// Consensus-based partitions.
    pub const MULTI_RAFT: ProtocolType = ProtocolType(Cow::Borrowed("multi-raft"));
    /// Primary-backup partitions.
    pub const MULTI_PRIMARY: ProtocolType = ProtocolType(Cow::Borrowed("multi-primary"));

    /// Creates a protocol type from a name.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// Returns the protocol name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProtocolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Consistency level requested from the hosting partition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Consistency {
    /// Every read observes all writes completed before it began.
    #[default]
    Linearizable,
    /// Reads observe writes in order but may lag behind.
    Sequential,
}

/// Selects the partition group that hosts a primitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrimitiveProtocol {
    /// The protocol family.
    pub protocol_type: ProtocolType,
    /// Explicit partition group. When unset, the first group implementing
    /// `protocol_type` is used.
    #[serde(default)]
    pub group: Option<String>,
    /// Requested consistency level.
    #[serde(default)]
    pub consistency: Consistency,
}

impl PrimitiveProtocol {
    pub fn new(protocol_type: ProtocolType) -> Self {
        Self {
            protocol_type,
            group: None,
            consistency: Consistency::default(),
        }
    }

    pub fn multi_raft() -> Self {
        Self::new(ProtocolType::MULTI_RAFT)
    }

    pub fn multi_primary() -> Self {
        Self::new(ProtocolType::MULTI_PRIMARY)
    }

    /// Pins the protocol to a named partition group.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_consistency(mut self, consistency: Consistency) -> Self {
        self.consistency = consistency;
        self
    }
}

impl fmt::Display for PrimitiveProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.group {
            Some(group) => write!(f, "{}@{}", self.protocol_type, group),
            None => write!(f, "{}", self.protocol_type),
        }
    }
}
