//! Framework payload to flat dylib conversion.
//!
//! Converting one bundle means:
//! 1. Copying the located payload to `<output>/lib<Name>.dylib` (mode preserved)
//! 2. Setting its install id to `@rpath/lib<Name>.dylib`
//! 3. Reading its dependency list, skipping the first (self) entry
//! 4. Rewriting every `@rpath/` reference that still points into a bundle
//!    (`@rpath/Dep.framework/Versions/A/Dep`) to `@rpath/libDep.dylib`
//!
//! Locating and copying are fatal on failure. Steps 2-4 are best-effort:
//! failures are logged and counted, and processing continues unless strict
//! mode is on.

use super::editor::MetadataEditor;
use super::framework::{FRAMEWORK_SUFFIX, FrameworkBundle, dylib_file_name, locate_payload};
use crate::repack::error::{Error, Result};
use crate::repack::utils::fs;
use std::path::{Path, PathBuf};

/// Prefix of relocatable install names.
pub const RELOCATION_PREFIX: &str = "@rpath/";

/// Outcome of converting one bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionReport {
    /// Flat library written to the output directory.
    pub library: PathBuf,
    /// Whether the install id was updated.
    pub identity_set: bool,
    /// Dependency references that were rewritten, as `(old, new)`.
    pub rewritten: Vec<(String, String)>,
    /// Number of tolerated rewrite failures.
    pub failures: usize,
}

/// Converts one Framework bundle into a flat library inside `output_dir`.
///
/// `output_dir` must exist.
///
/// # Errors
///
/// - [`Error::PayloadNotFound`] when the bundle has no payload; nothing is written
/// - [`Error::CopyFailed`] when the flat library cannot be written
/// - any rewrite error, only when `strict` is set
pub async fn convert_framework(
    bundle: &FrameworkBundle,
    output_dir: &Path,
    editor: &dyn MetadataEditor,
    strict: bool,
) -> Result<ConversionReport> {
    let payload = locate_payload(bundle)?;
    let library = output_dir.join(bundle.dylib_name());

    log::debug!("Copying {} -> {}", payload.display(), library.display());
    fs::copy_file(&payload, &library)
        .await
        .map_err(|source| Error::CopyFailed {
            from: payload.clone(),
            to: library.clone(),
            source,
        })?;

    rewrite_library(&library, bundle.name(), editor, strict)
}

/// Applies the install id and dependency rewrites to an already copied library.
pub fn rewrite_library(
    library: &Path,
    base_name: &str,
    editor: &dyn MetadataEditor,
    strict: bool,
) -> Result<ConversionReport> {
    let mut report = ConversionReport {
        library: library.to_path_buf(),
        ..Default::default()
    };

    let install_id = format!("{RELOCATION_PREFIX}{}", dylib_file_name(base_name));
    match editor.set_install_id(library, &install_id) {
        Ok(()) => report.identity_set = true,
        Err(e) => tolerate(e, strict, &mut report)?,
    }

    let references = match editor.dependencies(library) {
        Ok(references) => references,
        Err(e) => {
            tolerate(e, strict, &mut report)?;
            return Ok(report);
        }
    };

    // Index 0 is the library itself.
    for reference in references.iter().skip(1) {
        let Some(dependency) = bundle_dependency_name(reference) else {
            continue;
        };

        if dependency == base_name {
            log::debug!("Skipping self reference {} in {}", reference, library.display());
            continue;
        }

        let canonical = format!("{RELOCATION_PREFIX}{}", dylib_file_name(dependency));
        log::debug!("  Rewriting: {} -> {}", reference, canonical);

        match editor.change_dependency(library, reference, &canonical) {
            Ok(()) => report.rewritten.push((reference.clone(), canonical)),
            Err(e) => tolerate(e, strict, &mut report)?,
        }
    }

    Ok(report)
}

/// Base name of a dependency that still uses a bundle-style `@rpath/` path.
///
/// Returns `None` for references that need no rewrite: absolute and system
/// paths, other `@` prefixes, and flat `*.dylib` names.
pub fn bundle_dependency_name(reference: &str) -> Option<&str> {
    let rest = reference.strip_prefix(RELOCATION_PREFIX)?;
    if rest.ends_with(".dylib") {
        return None;
    }

    let last = rest.rsplit('/').next().filter(|s| !s.is_empty())?;
    let name = last.strip_suffix(FRAMEWORK_SUFFIX).unwrap_or(last);
    (!name.is_empty()).then_some(name)
}

fn tolerate(error: Error, strict: bool, report: &mut ConversionReport) -> Result<()> {
    if strict || error.is_fatal() {
        return Err(error);
    }
    log::warn!("{error}");
    report.failures += 1;
    Ok(())
}
