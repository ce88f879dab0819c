//! Dotted field paths.
//!
//! A [`FieldPath`] names a position inside a document (`address.city`). Paths are
//! compared segment by segment, so `a.b` is an ancestor of `a.b.c` but not of `a.bc`.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use smallvec::{smallvec, SmallVec};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// A non-empty, ordered sequence of field names.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath {
    segments: SmallVec<[String; 4]>,
}

impl FieldPath {
    /// Parse a dot-separated path. Empty paths and empty segments are rejected.
    pub fn parse(path: &str) -> Result<Self> {
        if path.is_empty() {
            return Err(Error::InvalidPath("field path cannot be empty".to_string()));
        }

        let segments: SmallVec<[String; 4]> = path.split('.').map(str::to_owned).collect();
        if segments.iter().any(String::is_empty) {
            return Err(Error::InvalidPath(format!(
                "field path \"{path}\" contains an empty segment"
            )));
        }

        Ok(Self { segments })
    }

    /// A single-segment path. `name` is taken verbatim.
    pub fn new_root(name: impl Into<String>) -> Self {
        Self {
            segments: smallvec![name.into()],
        }
    }

    /// This path extended by one segment.
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.into());
        Self { segments }
    }

    /// This path re-rooted under `root`: `b.c` with root `a` becomes `a.b.c`.
    pub fn with_new_root(&self, root: &str) -> Self {
        let mut segments = SmallVec::with_capacity(self.segments.len() + 1);
        segments.push(root.to_owned());
        segments.extend(self.segments.iter().cloned());
        Self { segments }
    }

    pub fn parent(&self) -> Option<Self> {
        let len = self.segments.len();
        (len > 1).then(|| Self {
            segments: self.segments[..len - 1].iter().cloned().collect(),
        })
    }

    pub fn leaf(&self) -> &str {
        &self.segments[self.segments.len() - 1]
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments, always at least one.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Strict ancestors, deepest first: `a.b.c` yields `a.b` then `a`.
    pub fn ancestors(&self) -> impl Iterator<Item = FieldPath> + '_ {
        (1..self.segments.len()).rev().map(move |len| Self {
            segments: self.segments[..len].iter().cloned().collect(),
        })
    }

    /// True if `self` equals `prefix` or lies below it.
    pub fn starts_with(&self, prefix: &FieldPath) -> bool {
        prefix.segments.len() <= self.segments.len()
            && self.segments[..prefix.segments.len()] == prefix.segments[..]
    }

    pub fn is_ancestor_of(&self, other: &FieldPath) -> bool {
        self.segments.len() < other.segments.len() && other.starts_with(self)
    }

    pub fn is_descendant_of(&self, other: &FieldPath) -> bool {
        other.is_ancestor_of(self)
    }

    /// The remainder of `self` below a strict ancestor `prefix`.
    pub fn strip_prefix(&self, prefix: &FieldPath) -> Option<FieldPath> {
        prefix.is_ancestor_of(self).then(|| Self {
            segments: self.segments[prefix.segments.len()..].iter().cloned().collect(),
        })
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl fmt::Debug for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldPath({self})")
    }
}

impl FromStr for FieldPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        FieldPath::parse(&raw).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> FieldPath {
        FieldPath::parse(s).unwrap()
    }

    #[test]
    fn test_parse_rejects_empty_segments() {
        assert!(FieldPath::parse("").is_err());
        assert!(FieldPath::parse("a..b").is_err());
        assert!(FieldPath::parse(".a").is_err());
        assert!(FieldPath::parse("a.").is_err());
        assert_eq!(path("a.b.c").depth(), 3);
    }

    #[test]
    fn test_ancestry_is_segment_based() {
        assert!(path("a.b").is_ancestor_of(&path("a.b.c")));
        assert!(!path("a.b").is_ancestor_of(&path("a.bc")));
        assert!(!path("a.b").is_ancestor_of(&path("a.b")));
        assert!(path("a.b.c").is_descendant_of(&path("a")));
        assert!(path("a.b").starts_with(&path("a.b")));
    }

    #[test]
    fn test_ancestors_deepest_first() {
        let ancestors: Vec<String> = path("a.b.c").ancestors().map(|p| p.to_string()).collect();
        assert_eq!(ancestors, vec!["a.b", "a"]);
        assert_eq!(path("a").ancestors().count(), 0);
    }

    #[test]
    fn test_re_rooting() {
        assert_eq!(path("b.c").with_new_root("a"), path("a.b.c"));
        assert_eq!(path("a.b.c").strip_prefix(&path("a")), Some(path("b.c")));
        assert_eq!(path("a").strip_prefix(&path("a")), None);
        assert_eq!(path("a.b").parent(), Some(path("a")));
        assert_eq!(path("a.b").leaf(), "b");
    }

    #[test]
    fn test_serializes_as_dotted_string() {
        let encoded = serde_json::to_string(&path("a.b")).unwrap();
        assert_eq!(encoded, "\"a.b\"");
        let decoded: FieldPath = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, path("a.b"));
        assert!(serde_json::from_str::<FieldPath>("\"a..b\"").is_err());
    }
}
