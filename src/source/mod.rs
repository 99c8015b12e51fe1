//! Source archive identification.
//!
//! The version tag is derived from the archive filename alone and decides the
//! names of both output archives.

use std::path::{Path, PathBuf};

/// Tag used when the filename carries no version marker.
pub const UNKNOWN_VERSION: &str = "unknown";

const ARCHIVE_EXTENSION: &str = ".zip";

/// The vendor SDK archive consumed by one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceArchive {
    path: PathBuf,
    version_tag: String,
}

impl SourceArchive {
    /// Identifies an archive, deriving its version tag with `marker`.
    pub fn new(path: impl Into<PathBuf>, marker: &str) -> Self {
        let path = path.into();
        let version_tag = path
            .file_name()
            .map(|name| version_tag(&name.to_string_lossy(), marker))
            .unwrap_or_else(|| UNKNOWN_VERSION.to_string());

        Self { path, version_tag }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn version_tag(&self) -> &str {
        &self.version_tag
    }

    /// `agora_sdk_mac_<tag>.zip`
    pub fn standard_archive_name(&self) -> String {
        format!("agora_sdk_mac_{}.zip", self.version_tag)
    }

    /// `agora_sdk_mac_<tag>-aed.zip`
    pub fn overlay_archive_name(&self) -> String {
        format!("agora_sdk_mac_{}-aed.zip", self.version_tag)
    }
}

/// Everything from the first occurrence of `marker` up to a trailing `.zip`.
///
/// Returns [`UNKNOWN_VERSION`] when the marker is absent or empty.
pub fn version_tag(file_name: &str, marker: &str) -> String {
    if marker.is_empty() {
        return UNKNOWN_VERSION.to_string();
    }

    match file_name.find(marker) {
        Some(start) => {
            let tail = &file_name[start..];
            tail.strip_suffix(ARCHIVE_EXTENSION)
                .unwrap_or(tail)
                .to_string()
        }
        None => UNKNOWN_VERSION.to_string(),
    }
}
