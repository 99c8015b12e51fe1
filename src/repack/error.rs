//! Error types for the repackaging pipeline.
//!
//! Failures fall into two groups. Fatal errors (archive I/O, missing payloads,
//! failed copies, filesystem errors) halt the run. Rewrite errors (install id,
//! dependency query, dependency rewrite) are logged and the run continues,
//! unless strict mode promotes them. See [`Error::is_fatal`].

use std::fmt::Display;
use std::io;
use std::path::{Path, PathBuf};

/// Result type alias for repackaging operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while converting Framework bundles and packing archives.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Extracting or packing a zip archive failed.
    #[error("failed to {operation} archive {}", path.display())]
    Archive {
        /// Archive being read or written
        path: PathBuf,
        /// "extract" or "pack"
        operation: &'static str,
        /// Underlying zip error
        #[source]
        source: zip::result::ZipError,
    },

    /// None of the candidate payload locations inside a bundle is a regular file.
    #[error(
        "no binary payload found in {} (tried {} candidate paths)",
        bundle.display(),
        candidates.len()
    )]
    PayloadNotFound {
        /// Bundle root
        bundle: PathBuf,
        /// Paths that were tried, in order
        candidates: Vec<PathBuf>,
    },

    /// The flat library could not be materialized.
    #[error("failed to copy {} to {}", from.display(), to.display())]
    CopyFailed {
        /// Located payload
        from: PathBuf,
        /// Flat library destination
        to: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Setting the library's own install id failed.
    #[error("failed to set install id of {} to {id}: {reason}", path.display())]
    IdentityRewriteFailed {
        /// Flat library
        path: PathBuf,
        /// Requested install id
        id: String,
        /// Tool output or spawn error
        reason: String,
    },

    /// The dependency list of a library could not be read.
    #[error("failed to read dependencies of {}: {reason}", path.display())]
    DependencyQueryFailed {
        /// Flat library
        path: PathBuf,
        /// Parse or read error
        reason: String,
    },

    /// A single dependency reference could not be rewritten.
    #[error("failed to change dependency {old} -> {new} in {}: {reason}", path.display())]
    DependencyRewriteFailed {
        /// Flat library
        path: PathBuf,
        /// Reference before rewriting
        old: String,
        /// Canonical reference
        new: String,
        /// Tool output or spawn error
        reason: String,
    },

    /// Mach-O parsing failed.
    #[error("failed to parse Mach-O binary: {0}")]
    MachOParse(String),

    /// Filesystem operation failed on a specific path.
    #[error("{context} {}: {error}", path.display())]
    Fs {
        /// What was being done
        context: &'static str,
        /// Path involved
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        error: io::Error,
    },

    /// Plain I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    /// Error wrapped with additional context.
    #[error("{0}")]
    Context(String, #[source] Box<Error>),

    /// Anything else.
    #[error("{0}")]
    GenericError(String),
}

impl Error {
    /// Returns `false` for the rewrite failures the pipeline tolerates by default.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::IdentityRewriteFailed { .. }
            | Self::DependencyQueryFailed { .. }
            | Self::DependencyRewriteFailed { .. } => false,
            Self::Context(_, inner) => inner.is_fatal(),
            _ => true,
        }
    }
}

/// Attaches a context message and the offending path to I/O errors.
pub trait ErrorExt<T> {
    /// Converts an I/O error into [`Error::Fs`].
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, io::Error> {
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.as_ref().to_path_buf(),
            error,
        })
    }
}

/// Adds a human readable context to errors and missing values.
pub trait Context<T> {
    /// Wraps the error (or `None`) with a static context message.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;

    /// Wraps the error (or `None`) with a lazily built context message.
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T> Context<T> for Result<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.map_err(|e| Error::Context(context.to_string(), Box::new(e)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| Error::Context(f().to_string(), Box::new(e)))
    }
}

impl<T> Context<T> for Option<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.ok_or_else(|| Error::GenericError(context.to_string()))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| Error::GenericError(f().to_string()))
    }
}

/// Returns early with a [`Error::GenericError`] built from a format string.
#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::repack::Error::GenericError(format!($msg)))
    };
    ($fmt:literal, $($arg:tt)*) => {
        return Err($crate::repack::Error::GenericError(format!($fmt, $($arg)*)))
    };
}
