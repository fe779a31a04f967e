#![forbid(unsafe_code)]

//! Canonical topic paths.
//!
//! A [`TopicPath`] addresses one location in a data tree. The root is `"/"`;
//! children are `"/a"`, `"/a/b"`, and so on. Paths are canonical: exactly one
//! string spells each location, so equality, hashing, and ordering all derive
//! from the underlying string.
//!
//! # Invariants
//!
//! 1. Every path starts with `/` and contains no empty segment.
//! 2. `"/"` is the only path with zero segments.
//! 3. Descendant checks are segment-aware: `/ab` is **not** a descendant of
//!    `/a`.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Empty input | `parse("")` | `PathError::Empty` |
//! | No leading slash | `parse("a/b")` | `PathError::MissingLeadingSlash` |
//! | Empty segment | `parse("/a//b")`, `parse("/a/")` | `PathError::EmptySegment` |
//! | Separator in key | `child("a/b")` | `PathError::SeparatorInSegment` |

use std::fmt;

/// Errors from path construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The input string was empty.
    Empty,
    /// The input did not start with `/`.
    MissingLeadingSlash(String),
    /// The input contained an empty segment (doubled or trailing `/`).
    EmptySegment(String),
    /// A child key contained the `/` separator.
    SeparatorInSegment(String),
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty path"),
            Self::MissingLeadingSlash(p) => write!(f, "path '{p}' does not start with '/'"),
            Self::EmptySegment(p) => write!(f, "path '{p}' contains an empty segment"),
            Self::SeparatorInSegment(s) => write!(f, "segment '{s}' contains '/'"),
        }
    }
}

impl std::error::Error for PathError {}

/// A canonical `/`-separated path into a data tree.
///
/// # Example
///
/// ```
/// use pathbus_core::TopicPath;
///
/// let root = TopicPath::root();
/// let x = root.child("x").unwrap();
/// let xa = x.child("a").unwrap();
/// assert_eq!(xa.as_str(), "/x/a");
/// assert!(xa.is_descendant_of(&x));
/// assert!(!xa.is_descendant_of(&xa));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TopicPath(String);

impl TopicPath {
    /// The root path `"/"`.
    #[must_use]
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Parse a path string into canonical form.
    pub fn parse(input: &str) -> Result<Self, PathError> {
        if input.is_empty() {
            return Err(PathError::Empty);
        }
        if input == "/" {
            return Ok(Self::root());
        }
        if !input.starts_with('/') {
            return Err(PathError::MissingLeadingSlash(input.to_string()));
        }
        if input[1..].split('/').any(str::is_empty) {
            return Err(PathError::EmptySegment(input.to_string()));
        }
        Ok(Self(input.to_string()))
    }

    /// Construct from a string already known to be canonical.
    ///
    /// Used internally when rebuilding paths from trie segments.
    pub(crate) fn from_canonical(path: String) -> Self {
        debug_assert!(Self::parse(&path).is_ok());
        Self(path)
    }

    /// Whether this is the root path `"/"`.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// The canonical string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The child path for a property named `key`.
    ///
    /// The root special case yields `"/key"`; otherwise `"self/key"`.
    pub fn child(&self, key: &str) -> Result<Self, PathError> {
        if key.is_empty() {
            return Err(PathError::EmptySegment(self.0.clone()));
        }
        if key.contains('/') {
            return Err(PathError::SeparatorInSegment(key.to_string()));
        }
        if self.is_root() {
            Ok(Self(format!("/{key}")))
        } else {
            Ok(Self(format!("{}/{key}", self.0)))
        }
    }

    /// The parent path, or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind('/') {
            Some(0) => Some(Self::root()),
            Some(idx) => Some(Self(self.0[..idx].to_string())),
            None => None,
        }
    }

    /// The final segment, or `None` for the root.
    #[must_use]
    pub fn leaf(&self) -> Option<&str> {
        if self.is_root() {
            return None;
        }
        self.0.rfind('/').map(|idx| &self.0[idx + 1..])
    }

    /// Iterate the path's segments. The root yields nothing.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        let body = if self.is_root() { "" } else { &self.0[1..] };
        body.split('/').filter(|s| !s.is_empty())
    }

    /// Whether `self` is a **strict** descendant of `ancestor`,
    /// segment-aware: `/ab` is not a descendant of `/a`.
    #[must_use]
    pub fn is_descendant_of(&self, ancestor: &Self) -> bool {
        if ancestor.is_root() {
            return !self.is_root();
        }
        self.0.len() > ancestor.0.len()
            && self.0.starts_with(ancestor.0.as_str())
            && self.0.as_bytes()[ancestor.0.len()] == b'/'
    }
}

impl fmt::Display for TopicPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TopicPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
