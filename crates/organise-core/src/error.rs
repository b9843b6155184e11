//! Error types for organise-core

use std::path::PathBuf;

/// Result type for organise-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while planning or applying an organisation run.
///
/// Everything except [`Error::RequiredRuleUnsatisfied`] is a configuration
/// problem and aborts the run before the filesystem is touched.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A token or backreference has no value after resolution
    #[error("Unresolved token {token} in '{template}'")]
    UnresolvedToken { token: String, template: String },

    /// Variables reference each other in a loop
    #[error("Cyclic variable definition: {}", names.join(" -> "))]
    CyclicVariable { names: Vec<String> },

    /// A required rule produced no matches
    #[error("Required rule #{index} ({pattern}) matched no files")]
    RequiredRuleUnsatisfied { index: usize, pattern: String },

    /// A rule regexp failed to compile
    #[error("Invalid regular expression '{pattern}': {message}")]
    InvalidRegex { pattern: String, message: String },

    /// A rule regexp failed while searching a path
    #[error("Regular expression '{pattern}' failed on {path}: {message}")]
    RegexExecution {
        pattern: String,
        path: PathBuf,
        message: String,
    },

    /// A destination references a group the rule regexp does not declare
    #[error("Rule #{index} destination references undeclared group '{group}'")]
    UnknownBackreference { index: usize, group: String },

    /// `symlink` and `link_type` disagree
    #[error("Rule #{index} sets symlink: {symlink} but link_type: {link_type}")]
    AmbiguousOperation {
        index: usize,
        symlink: bool,
        link_type: String,
    },

    /// Two distinct sources resolve to the same destination
    #[error("Destination {destination} is produced by both {first} and {second}")]
    DestinationConflict {
        destination: PathBuf,
        first: PathBuf,
        second: PathBuf,
    },

    /// A destination is its own source, contains it, or lies inside a
    /// directory being copied onto it
    #[error("Rule #{index} would place {path} at {destination}, overlapping its own source")]
    OverlappingDestination {
        index: usize,
        path: PathBuf,
        destination: PathBuf,
    },

    /// Filesystem error from organise-fs
    #[error(transparent)]
    Fs(#[from] organise_fs::Error),
}
