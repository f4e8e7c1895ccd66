//! Slash-separated node paths.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tessera_primitive::{PrimitiveError, PrimitiveResult};

/// Absolute path of a node in a document tree, such as `/config/db/url`.
///
/// The root is `/`. Segments are non-empty and contain no `/`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentPath {
    segments: Vec<String>,
}

impl DocumentPath {
    pub fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Parses an absolute path.
    pub fn parse(path: &str) -> PrimitiveResult<Self> {
        let rest = path
            .strip_prefix('/')
            .ok_or_else(|| PrimitiveError::InvalidPath(format!("{path}: must start with '/'")))?;
        if rest.is_empty() {
            return Ok(Self::root());
        }
        let segments = rest
            .split('/')
            .map(|segment| {
                if segment.is_empty() {
                    Err(PrimitiveError::InvalidPath(format!("{path}: empty segment")))
                } else {
                    Ok(segment.to_string())
                }
            })
            .collect::<PrimitiveResult<Vec<_>>>()?;
        Ok(Self { segments })
    }

    /// The path of a direct child.
    pub fn child(&self, name: &str) -> PrimitiveResult<Self> {
        if name.is_empty() || name.contains('/') {
            return Err(PrimitiveError::InvalidPath(format!(
                "{self}: invalid child name {name:?}"
            )));
        }
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Ok(Self { segments })
    }

    /// The parent path, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.segments.split_last()?;
        Some(Self {
            segments: init.to_vec(),
        })
    }

    /// The last segment, or `None` for the root.
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Whether `other` lies strictly below this path.
    pub fn is_ancestor_of(&self, other: &DocumentPath) -> bool {
        other.segments.len() > self.segments.len() && other.segments.starts_with(&self.segments)
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for DocumentPath {
    type Err = PrimitiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DocumentPath {
    type Error = PrimitiveError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for DocumentPath {
    type Error = PrimitiveError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<DocumentPath> for String {
    fn from(path: DocumentPath) -> Self {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_root_and_nested_paths() {
        assert!(DocumentPath::parse("/").unwrap().is_root());
        let path = DocumentPath::parse("/a/b/c").unwrap();
        assert_eq!(path.segments(), ["a", "b", "c"]);
        assert_eq!(path.name(), Some("c"));
        assert_eq!(path.depth(), 3);
    }

    #[test]
    fn rejects_relative_and_empty_segments() {
        for bad in ["", "a/b", "//", "/a//b", "/a/"] {
            assert!(
                matches!(DocumentPath::parse(bad), Err(PrimitiveError::InvalidPath(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn parent_and_child_are_inverse() {
        let path = DocumentPath::parse("/a/b").unwrap();
        let parent = path.parent().unwrap();
        assert_eq!(parent.to_string(), "/a");
        assert_eq!(parent.child("b").unwrap(), path);
        assert!(DocumentPath::root().parent().is_none());
        assert!(path.child("x/y").is_err());
    }

    #[test]
    fn ancestry_is_strict() {
        let a = DocumentPath::parse("/a").unwrap();
        let ab = DocumentPath::parse("/a/b").unwrap();
        let abc = DocumentPath::parse("/abc").unwrap();
        assert!(DocumentPath::root().is_ancestor_of(&a));
        assert!(a.is_ancestor_of(&ab));
        assert!(!a.is_ancestor_of(&a));
        assert!(!a.is_ancestor_of(&abc));
    }

    #[test]
    fn serializes_as_string() {
        let path = DocumentPath::parse("/x/y").unwrap();
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, "\"/x/y\"");
        assert_eq!(serde_json::from_str::<DocumentPath>(&json).unwrap(), path);
        assert!(serde_json::from_str::<DocumentPath>("\"x\"").is_err());
    }

    proptest! {
        #[test]
        fn display_parses_back(segments in proptest::collection::vec("[a-z0-9_-]{1,8}", 0..5)) {
            let text = format!("/{}", segments.join("/"));
            let path = DocumentPath::parse(&text).unwrap();
            prop_assert_eq!(path.to_string(), text);
            prop_assert_eq!(path.depth(), segments.len());
        }
    }
}
