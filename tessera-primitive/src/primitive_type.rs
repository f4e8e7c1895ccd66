//! Primitive type descriptors and child orderings.
//!
//! A [`PrimitiveType`] is the identity both sides of a session agree on: the
//! client uses it when asking a partition for a proxy, and the partition uses
//! it to pick the state machine that will execute the primitive's operations.
//! Ordered primitives carry their [`Ordering`] as part of that identity.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Order in which a tree primitive lists the children of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ordering {
    /// Children sorted by name.
    Natural,
    /// Children in the order they were created.
    Insertion,
}

impl fmt::Display for Ordering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ordering::Natural => f.write_str("natural"),
            Ordering::Insertion => f.write_str("insertion"),
        }
    }
}

/// Identifies a kind of primitive, optionally parameterized by an ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrimitiveType {
    name: Cow<'static, str>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ordering: Option<Ordering>,
}

impl PrimitiveType {
    /// The canonical (unordered) descriptor for a type name.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            ordering: None,
        }
    }

    /// Descriptor for a type name known only at runtime.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            ordering: None,
        }
    }

    /// The ordered variant of this type.
    #[must_use]
    pub fn ordered(&self, ordering: Ordering) -> Self {
        Self {
            name: self.name.clone(),
            ordering: Some(ordering),
        }
    }

    /// The canonical variant of this type.
    #[must_use]
    pub fn unordered(&self) -> Self {
        Self {
            name: self.name.clone(),
            ordering: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ordering(&self) -> Option<Ordering> {
        self.ordering
    }

    pub fn is_ordered(&self) -> bool {
        self.ordering.is_some()
    }

    /// Whether both descriptors share a base identity, ignoring ordering.
    pub fn is_same_kind(&self, other: &PrimitiveType) -> bool {
        self.name == other.name
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ordering {
            Some(ordering) => write!(f, "{}[{}]", self.name, ordering),
            None => f.write_str(&self.name),
        }
    }
}
