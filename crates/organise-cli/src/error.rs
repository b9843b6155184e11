//! Error types for organise-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from organise-core
    #[error(transparent)]
    Core(#[from] organise_core::Error),

    /// Error from organise-fs
    #[error(transparent)]
    Fs(#[from] organise_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Report serialization error
    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),

    /// The run completed but did not succeed
    #[error("Run failed: {unsatisfied} required rule(s) unsatisfied, {failed} file(s) failed")]
    RunFailed { unsatisfied: usize, failed: usize },

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
