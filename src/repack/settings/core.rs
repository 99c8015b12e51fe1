//! Core Settings struct and implementations.

use std::path::{Path, PathBuf};

/// Settings for one pipeline run.
///
/// Constructed via [`SettingsBuilder`](super::SettingsBuilder).
///
/// # Examples
///
/// ```no_run
/// use framework_dylib::repack::SettingsBuilder;
///
/// # fn example() -> framework_dylib::repack::Result<()> {
/// let settings = SettingsBuilder::new()
///     .archive("SDK/Agora_Native_SDK_for_Mac_v4.4.30.zip")
///     .output_dir("dist")
///     .strict(true)
///     .build()?;
/// assert!(settings.flat_library_dir().ends_with("agora_sdk"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Settings {
    /// Source SDK archive.
    archive: PathBuf,

    /// Directory receiving the packed archives.
    output_dir: PathBuf,

    /// Name of the flat library directory under `output_dir`.
    sdk_dir_name: String,

    /// Side directory holding pre-built overlay dylibs.
    overlay_dir: PathBuf,

    /// Transient extraction directory.
    work_dir: PathBuf,

    /// Substring of the archive filename that starts the version tag.
    version_marker: String,

    /// Promote rewrite failures to fatal errors.
    strict: bool,
}

impl Settings {
    /// Returns the source archive path.
    pub fn archive(&self) -> &Path {
        &self.archive
    }

    /// Returns the absolute directory the packed archives are written to.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Returns the flat library directory (`<output_dir>/<sdk_dir_name>`).
    ///
    /// It is created empty at the start of conversion and removed at cleanup.
    pub fn flat_library_dir(&self) -> PathBuf {
        self.output_dir.join(&self.sdk_dir_name)
    }

    /// Returns the overlay source directory.
    pub fn overlay_dir(&self) -> &Path {
        &self.overlay_dir
    }

    /// Returns the working directory the archive is unpacked into.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Returns the version marker.
    pub fn version_marker(&self) -> &str {
        &self.version_marker
    }

    /// Whether rewrite failures abort the run.
    pub fn strict(&self) -> bool {
        self.strict
    }

    pub(super) fn new(
        archive: PathBuf,
        output_dir: PathBuf,
        sdk_dir_name: String,
        overlay_dir: PathBuf,
        work_dir: PathBuf,
        version_marker: String,
        strict: bool,
    ) -> Self {
        Self {
            archive,
            output_dir,
            sdk_dir_name,
            overlay_dir,
            work_dir,
            version_marker,
            strict,
        }
    }
}
