//! Load command queries and edits.
//!
//! The conversion algorithm talks to binaries only through [`MetadataEditor`],
//! so the backend can be swapped (native rewriting, a different tool, a test
//! double) without touching the pipeline.

use super::macho;
use crate::repack::error::{Error, Result};
use std::path::Path;
use std::process::Command;

/// Capability to read and rewrite a library's load-time identity.
pub trait MetadataEditor: Send + Sync {
    /// Returns the recorded library references of `path`.
    ///
    /// The first entry always stands for the library itself, whatever its value.
    ///
    /// # Errors
    ///
    /// [`Error::DependencyQueryFailed`]
    fn dependencies(&self, path: &Path) -> Result<Vec<String>>;

    /// Sets the install id (`LC_ID_DYLIB`) of `path`.
    ///
    /// # Errors
    ///
    /// [`Error::IdentityRewriteFailed`]
    fn set_install_id(&self, path: &Path, id: &str) -> Result<()>;

    /// Replaces the dependency reference `old` with `new` in `path`.
    ///
    /// # Errors
    ///
    /// [`Error::DependencyRewriteFailed`]
    fn change_dependency(&self, path: &Path, old: &str, new: &str) -> Result<()>;
}

/// Reads load commands with goblin and edits them with `install_name_tool`.
///
/// Every edit is one blocking process invocation with no retry.
#[derive(Debug, Default, Clone, Copy)]
pub struct InstallNameTool;

impl MetadataEditor for InstallNameTool {
    fn dependencies(&self, path: &Path) -> Result<Vec<String>> {
        let query_failed = |reason: String| Error::DependencyQueryFailed {
            path: path.to_path_buf(),
            reason,
        };

        let data = std::fs::read(path).map_err(|e| query_failed(e.to_string()))?;
        macho::dependency_list(&data).map_err(|e| query_failed(e.to_string()))
    }

    fn set_install_id(&self, path: &Path, id: &str) -> Result<()> {
        log::trace!("Changing install id of {} to {}", path.display(), id);

        install_name_tool(&["-id", id], path).map_err(|reason| Error::IdentityRewriteFailed {
            path: path.to_path_buf(),
            id: id.to_string(),
            reason,
        })
    }

    fn change_dependency(&self, path: &Path, old: &str, new: &str) -> Result<()> {
        log::trace!("Changing dependency in {}: {} -> {}", path.display(), old, new);

        install_name_tool(&["-change", old, new], path).map_err(|reason| {
            Error::DependencyRewriteFailed {
                path: path.to_path_buf(),
                old: old.to_string(),
                new: new.to_string(),
                reason,
            }
        })
    }
}

fn install_name_tool(args: &[&str], path: &Path) -> std::result::Result<(), String> {
    let output = Command::new("install_name_tool")
        .args(args)
        .arg(path)
        .output()
        .map_err(|e| format!("failed to run install_name_tool: {e}"))?;

    if output.status.success() {
        Ok(())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(format!(
            "install_name_tool exited with {}: {}",
            output.status,
            stderr.trim()
        ))
    }
}
