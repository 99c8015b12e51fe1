//! External tool detection.

use std::sync::LazyLock;

/// Whether `install_name_tool` is on `PATH`.
///
/// Probed once per process. Without it every identity and dependency rewrite
/// fails, which the lenient policy tolerates.
pub static HAS_INSTALL_NAME_TOOL: LazyLock<bool> =
    LazyLock::new(|| match which::which("install_name_tool") {
        Ok(path) => {
            log::debug!("Found install_name_tool at: {}", path.display());
            true
        }
        Err(e) => {
            log::debug!("install_name_tool not found in PATH: {}", e);
            false
        }
    });
