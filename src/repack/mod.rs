//! Framework to flat dylib repackaging.
//!
//! Turns a vendor SDK archive full of `*.framework` bundles into a flat
//! directory of `lib<Name>.dylib` files whose install ids and dependency
//! references all use `@rpath/lib<Name>.dylib`, then packs it twice: once as
//! converted and once with the overlay libraries merged in.
//!
//! The entry point is [`Pipeline`], configured with [`SettingsBuilder`]. The
//! per-bundle conversion is available on its own in
//! [`platform::macos::convert_framework`].

pub mod archive;
mod builder;
pub mod error;
pub mod platform;
mod settings;
pub mod utils;

pub use builder::{HAS_INSTALL_NAME_TOOL, Pipeline, PipelineState, calculate_sha256};
pub use error::{Error, Result};
pub use settings::{
    DEFAULT_OVERLAY_DIR, DEFAULT_SDK_DIR_NAME, DEFAULT_VERSION_MARKER, Settings, SettingsBuilder,
};

use std::fmt;
use std::path::PathBuf;

/// Which of the two output archives a [`PackedArchive`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    /// Converted libraries only.
    Standard,
    /// Converted libraries with the overlay merged in.
    Overlay,
}

impl fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::Overlay => write!(f, "overlay"),
        }
    }
}

/// An archive written by the pipeline.
#[derive(Debug, Clone)]
pub struct PackedArchive {
    pub kind: ArchiveKind,
    /// Location in the output directory.
    pub path: PathBuf,
    /// Size in bytes.
    pub size: u64,
    /// Hex-encoded SHA-256.
    pub checksum: String,
}
