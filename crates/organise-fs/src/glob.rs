//! Source glob expansion
//!
//! Turns a resolved source template into the ordered list of candidate paths
//! the rule matcher will look at. Relative patterns are anchored at a root
//! directory; `*` does not cross `/` and does not match hidden entries, while
//! `**` recurses.

use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use tracing::debug;

use crate::{Error, Result};

const GLOB_CHARS: &[char] = &['*', '?', '['];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// The result of expanding one source pattern.
#[derive(Debug, Default)]
pub struct GlobExpansion {
    /// The pattern handed to the glob engine, after anchoring at the root.
    pub pattern: String,
    /// Deepest directory of the pattern that contains no wildcards.
    pub literal_root: PathBuf,
    /// Whether `literal_root` exists. When it does not, `paths` is empty.
    pub root_exists: bool,
    /// Matching paths in lexicographic order.
    pub paths: Vec<PathBuf>,
    /// Entries that could not be read while walking.
    pub errors: Vec<Error>,
}

impl GlobExpansion {
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Expand `pattern` relative to `root`.
///
/// An invalid pattern is an error. A missing literal root is not: it yields
/// an empty expansion with `root_exists == false`.
pub fn expand(root: &Path, pattern: &str) -> Result<GlobExpansion> {
    let anchored = anchor(root, pattern);
    let entries = glob::glob_with(&anchored, MATCH_OPTIONS).map_err(|e| Error::InvalidGlob {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })?;

    let literal_root = literal_root(root, pattern);
    let root_exists = literal_root.exists();
    let mut expansion = GlobExpansion {
        pattern: anchored,
        literal_root,
        root_exists,
        ..Default::default()
    };

    if !root_exists {
        debug!(root = %expansion.literal_root.display(), "Glob root does not exist");
        return Ok(expansion);
    }

    for entry in entries {
        match entry {
            Ok(path) => expansion.paths.push(path),
            Err(e) => {
                let path = e.path().to_path_buf();
                expansion.errors.push(Error::io(path, e.into()));
            }
        }
    }
    expansion.paths.sort();

    debug!(
        pattern = %expansion.pattern,
        matches = expansion.paths.len(),
        "Expanded glob"
    );
    Ok(expansion)
}

/// Join a relative pattern onto `root`, escaping any wildcard characters
/// that happen to appear in the root itself.
pub fn anchor(root: &Path, pattern: &str) -> String {
    if Path::new(pattern).is_absolute() {
        return pattern.to_string();
    }
    let escaped = Pattern::escape(&root.to_string_lossy());
    format!("{}/{}", escaped.trim_end_matches('/'), pattern)
}

/// The leading run of wildcard-free segments of `pattern`, resolved against
/// `root` when relative.
pub fn literal_root(root: &Path, pattern: &str) -> PathBuf {
    let mut prefix = String::new();
    for (i, segment) in pattern.split('/').enumerate() {
        if segment.contains(GLOB_CHARS) {
            break;
        }
        if i > 0 {
            prefix.push('/');
        }
        prefix.push_str(segment);
    }

    if prefix.is_empty() && pattern.starts_with('/') {
        prefix.push('/');
    }

    let prefix = PathBuf::from(prefix);
    if prefix.is_absolute() {
        prefix
    } else {
        root.join(prefix)
    }
}
