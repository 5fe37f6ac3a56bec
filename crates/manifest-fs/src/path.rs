//! Manifest file identity
//!
//! Every manifest the merger reports, every record location, and every
//! module root is compared as a [`NormalizedPath`]. Two spellings of the
//! same file (`a\b.xml` and `a/b.xml`, `a//b.xml`) must compare equal or
//! provenance lookups silently miss.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A path normalized to forward slashes with empty segments collapsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct NormalizedPath {
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self::from_text(&path.as_ref().to_string_lossy())
    }

    fn from_text(text: &str) -> Self {
        let slashed = text.replace('\\', "/");
        let absolute = slashed.starts_with('/');
        let mut inner = slashed
            .split('/')
            .filter(|segment| !segment.is_empty() && *segment != ".")
            .collect::<Vec<_>>()
            .join("/");
        if absolute {
            inner.insert(0, '/');
        }
        Self { inner }
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Join this path with a relative segment.
    pub fn join(&self, segment: &str) -> Self {
        if self.inner.is_empty() {
            return Self::from_text(segment);
        }
        Self::from_text(&format!("{}/{}", self.inner, segment))
    }

    /// Get the parent directory.
    pub fn parent(&self) -> Option<Self> {
        match self.inner.rfind('/') {
            Some(0) if self.inner.len() > 1 => Some(Self {
                inner: "/".to_string(),
            }),
            Some(idx) if idx > 0 => Some(Self {
                inner: self.inner[..idx].to_string(),
            }),
            _ => None,
        }
    }

    /// Get the file name component.
    pub fn file_name(&self) -> Option<&str> {
        self.inner.rsplit('/').next().filter(|name| !name.is_empty())
    }

    /// Get the extension if present.
    pub fn extension(&self) -> Option<&str> {
        self.file_name().and_then(|name| {
            let idx = name.rfind('.')?;
            if idx == 0 { None } else { Some(&name[idx + 1..]) }
        })
    }

    /// True when `dir` is this path or one of its ancestors, compared by
    /// whole segments (`/app` does not contain `/application/x.xml`).
    pub fn is_within(&self, dir: &NormalizedPath) -> bool {
        if dir.inner.is_empty() || dir.inner == "/" {
            return dir.inner.is_empty() || self.inner.starts_with('/');
        }
        self.inner == dir.inner
            || self
                .inner
                .strip_prefix(&dir.inner)
                .is_some_and(|rest| rest.starts_with('/'))
    }

    /// True when `fragment` occurs anywhere in the normalized text.
    ///
    /// Used for marker directories such as `exploded-aar` that identify
    /// library manifests.
    pub fn contains(&self, fragment: &str) -> bool {
        self.inner.contains(fragment)
    }

    /// Check if this path exists on the filesystem.
    pub fn exists(&self) -> bool {
        self.to_native().exists()
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::from_text(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::from_text(&s)
    }
}

impl From<NormalizedPath> for String {
    fn from(p: NormalizedPath) -> Self {
        p.inner
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}
