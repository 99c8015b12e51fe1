//! Framework bundle discovery and payload location.

use crate::repack::error::{Error, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directory suffix identifying a Framework bundle.
pub const FRAMEWORK_SUFFIX: &str = ".framework";

/// One discovered `<Name>.framework` directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameworkBundle {
    root: PathBuf,
    name: String,
}

impl FrameworkBundle {
    /// Describes the bundle at `root`.
    ///
    /// Returns `None` unless the last path component is `<Name>.framework`
    /// with a non-empty `<Name>`.
    pub fn from_path(root: impl Into<PathBuf>) -> Option<Self> {
        let root = root.into();
        let file_name = root.file_name()?.to_str()?;
        let name = file_name.strip_suffix(FRAMEWORK_SUFFIX)?;
        if name.is_empty() {
            return None;
        }
        let name = name.to_string();
        Some(Self { root, name })
    }

    /// Bundle root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Library base name (bundle directory name without `.framework`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `lib<Name>.dylib`
    pub fn dylib_name(&self) -> String {
        dylib_file_name(&self.name)
    }

    /// Payload locations in priority order.
    ///
    /// `Versions/Current` is the symlinked indirection present in well-formed
    /// bundles. `A` and `B` are the version labels seen in vendor SDKs. The
    /// bundle root comes last.
    pub fn payload_candidates(&self) -> [PathBuf; 4] {
        let versions = self.root.join("Versions");
        [
            versions.join("Current").join(&self.name),
            versions.join("A").join(&self.name),
            versions.join("B").join(&self.name),
            self.root.join(&self.name),
        ]
    }
}

/// Flat library filename for a base name.
pub fn dylib_file_name(base_name: &str) -> String {
    format!("lib{base_name}.dylib")
}

/// Recursively finds every `*.framework` directory below `root`.
///
/// There is no depth limit and nested bundles are reported too. Symlinks are
/// not followed. Unreadable entries are logged and skipped, and an empty
/// result is not an error.
pub async fn scan_frameworks(root: &Path) -> Result<Vec<FrameworkBundle>> {
    let root = root.to_path_buf();

    tokio::task::spawn_blocking(move || {
        let mut bundles = Vec::new();

        for entry in WalkDir::new(&root).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Skipping unreadable entry while scanning {}: {}", root.display(), e);
                    continue;
                }
            };

            // Linked bundles are accepted but not descended into.
            let is_dir = entry.file_type().is_dir()
                || (entry.path_is_symlink() && entry.path().is_dir());
            if !is_dir || entry.depth() == 0 {
                continue;
            }

            if let Some(bundle) = FrameworkBundle::from_path(entry.path()) {
                log::debug!("Found framework: {}", bundle.root().display());
                bundles.push(bundle);
            }
        }

        bundles
    })
    .await
    .map_err(|e| Error::GenericError(format!("framework scan task panicked: {e}")))
}

/// Returns the first candidate payload that is a regular file.
///
/// Symlinked candidates count when their target is a regular file.
///
/// # Errors
///
/// [`Error::PayloadNotFound`] when no candidate resolves.
pub fn locate_payload(bundle: &FrameworkBundle) -> Result<PathBuf> {
    let candidates = bundle.payload_candidates();

    for candidate in &candidates {
        if candidate.is_file() {
            log::debug!("Found payload for {}: {}", bundle.name(), candidate.display());
            return Ok(candidate.clone());
        }
        log::debug!("No payload at {}", candidate.display());
    }

    Err(Error::PayloadNotFound {
        bundle: bundle.root().to_path_buf(),
        candidates: candidates.to_vec(),
    })
}
