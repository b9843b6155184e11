//! Slash-normalized path handling
//!
//! Rule regexps and destination templates are written with `/` separators,
//! so every path shown to them goes through [`NormalizedPath`] first.

use std::path::{Path, PathBuf};

/// A path rendered with forward slashes regardless of platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedPath {
    inner: String,
}

impl NormalizedPath {
    /// Create a NormalizedPath from any path-like input.
    ///
    /// Backslashes become forward slashes. A trailing slash is kept, since
    /// it marks a destination that names a directory.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let inner = path.as_ref().to_string_lossy().replace('\\', "/");
        Self { inner }
    }

    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a platform-native PathBuf for I/O.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Whether the path was written as a directory (`dest/`).
    pub fn names_directory(&self) -> bool {
        self.inner.ends_with('/')
    }

    /// Place `source`'s file name under this path if it names a directory,
    /// otherwise return the path unchanged.
    pub fn place(&self, source: &Path) -> PathBuf {
        match source.file_name() {
            Some(name) if self.names_directory() => self.to_native().join(name),
            _ => self.to_native(),
        }
    }

    /// Get the final component, ignoring any trailing slash.
    pub fn file_name(&self) -> Option<&str> {
        self.inner
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}
