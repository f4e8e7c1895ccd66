//! Versions assigned by primitive state machines.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A monotonically increasing version assigned by a primitive.
///
/// Locks hand out a new version on every grant (a fencing token); document
/// trees stamp every node write with one.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(u64);

impl Version {
    /// The version that precedes every assigned version.
    pub const INITIAL: Version = Version(0);

    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Returns the following version.
    #[must_use]
    pub const fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A value paired with the version at which it was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Versioned<V> {
    pub value: V,
    pub version: Version,
}

impl<V> Versioned<V> {
    pub fn new(value: V, version: Version) -> Self {
        Self { value, version }
    }

    /// Transforms the value, keeping the version.
    pub fn map<U>(self, f: impl FnOnce(V) -> U) -> Versioned<U> {
        Versioned {
            value: f(self.value),
            version: self.version,
        }
    }

    /// Fallible variant of [`Versioned::map`].
    pub fn try_map<U, E>(self, f: impl FnOnce(V) -> Result<U, E>) -> Result<Versioned<U>, E> {
        Ok(Versioned {
            value: f(self.value)?,
            version: self.version,
        })
    }
}
