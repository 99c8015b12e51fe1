//! Error types for the command line front end.
//!
//! Library failures arrive as [`crate::repack::Error`] and are wrapped here
//! together with argument, I/O and serialization errors.

use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, RepackError>;

/// Main error type for all CLI operations
#[derive(Error, Debug)]
pub enum RepackError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Pipeline errors
    #[error("{0}")]
    Repack(#[from] crate::repack::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Nothing matched the requested input
    #[error("No {what} found in {}", path.display())]
    NothingFound {
        /// What was searched for
        what: &'static str,
        /// Where it was searched for
        path: std::path::PathBuf,
    },
}

impl RepackError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        use crate::repack::Error;

        match self {
            Self::Repack(Error::PayloadNotFound { bundle, .. }) => vec![format!(
                "Check that {} contains its binary under Versions/Current, Versions/A, Versions/B or the bundle root",
                bundle.display()
            )],
            Self::Repack(Error::Archive { .. }) => {
                vec!["Check that the input is a readable zip archive and the output directory is writable".to_string()]
            }
            Self::Repack(e) if !e.is_fatal() => vec![
                "Rewrites need install_name_tool from the Xcode command line tools".to_string(),
                "Run without --strict to tolerate rewrite failures".to_string(),
            ],
            Self::Cli(_) => vec!["Run with --help for usage".to_string()],
            _ => Vec::new(),
        }
    }
}
