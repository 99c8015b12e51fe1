//! Builder for constructing Settings.

use super::{DEFAULT_OVERLAY_DIR, DEFAULT_SDK_DIR_NAME, DEFAULT_VERSION_MARKER, Settings};
use std::path::{Path, PathBuf};

/// Builder for constructing [`Settings`].
///
/// Only the archive is required. Everything else has a default:
///
/// | Setting | Default |
/// |---------|---------|
/// | output directory | current directory |
/// | flat library directory name | `agora_sdk` |
/// | overlay directory | `aed` |
/// | working directory | `$TMPDIR/sdk-repack-<uuid>` |
/// | version marker | `v4.4.30` |
/// | strict | `false` |
#[derive(Default)]
pub struct SettingsBuilder {
    archive: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    sdk_dir_name: Option<String>,
    overlay_dir: Option<PathBuf>,
    work_dir: Option<PathBuf>,
    version_marker: Option<String>,
    strict: bool,
}

impl SettingsBuilder {
    /// Creates a new settings builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the source SDK archive.
    ///
    /// # Required
    ///
    /// This field is required for building.
    pub fn archive<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.archive = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the directory the packed archives are written to.
    pub fn output_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the name of the flat library directory.
    pub fn sdk_dir_name(mut self, name: impl Into<String>) -> Self {
        self.sdk_dir_name = Some(name.into());
        self
    }

    /// Sets the overlay source directory.
    pub fn overlay_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.overlay_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets an explicit working directory instead of a fresh temporary one.
    ///
    /// Whatever is at this path is erased when the run starts and removed when it ends.
    pub fn work_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.work_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the version marker searched for in the archive filename.
    pub fn version_marker(mut self, marker: impl Into<String>) -> Self {
        self.version_marker = Some(marker.into());
        self
    }

    /// Enables or disables strict mode.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive was not set, the flat library
    /// directory name is not a single path component, a path cannot be
    /// made absolute, or the working directory or flat library directory
    /// would contain the output directory or one of the inputs.
    pub fn build(self) -> crate::repack::Result<Settings> {
        use crate::repack::error::{Context, ErrorExt};
        use path_absolutize::Absolutize;

        let archive = self.archive.context("archive is required")?;

        let sdk_dir_name = self
            .sdk_dir_name
            .unwrap_or_else(|| DEFAULT_SDK_DIR_NAME.to_string());
        if sdk_dir_name.is_empty()
            || sdk_dir_name == "."
            || sdk_dir_name == ".."
            || sdk_dir_name.contains(['/', '\\'])
        {
            crate::bail!("invalid sdk directory name: {sdk_dir_name:?}");
        }

        let output_dir = self.output_dir.unwrap_or_else(|| PathBuf::from("."));
        let output_dir = output_dir
            .absolutize()
            .fs_context("failed to resolve output directory", &output_dir)?
            .into_owned();

        let work_dir = self.work_dir.unwrap_or_else(|| {
            std::env::temp_dir().join(format!("sdk-repack-{}", uuid::Uuid::new_v4()))
        });
        let work_dir = work_dir
            .absolutize()
            .fs_context("failed to resolve working directory", &work_dir)?
            .into_owned();

        let overlay_dir = self
            .overlay_dir
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OVERLAY_DIR));

        check_layout(
            &archive,
            &output_dir,
            &output_dir.join(&sdk_dir_name),
            &overlay_dir,
            &work_dir,
        )?;

        Ok(Settings::new(
            archive,
            output_dir,
            sdk_dir_name,
            overlay_dir,
            work_dir,
            self.version_marker
                .unwrap_or_else(|| DEFAULT_VERSION_MARKER.to_string()),
            self.strict,
        ))
    }
}

/// Rejects layouts where erasing the working directory or the flat library
/// directory would delete the output directory or an input.
fn check_layout(
    archive: &Path,
    output_dir: &Path,
    flat_dir: &Path,
    overlay_dir: &Path,
    work_dir: &Path,
) -> crate::repack::Result<()> {
    use crate::repack::error::ErrorExt;
    use path_absolutize::Absolutize;

    let archive = archive
        .absolutize()
        .fs_context("failed to resolve archive path", archive)?;
    let overlay_dir = overlay_dir
        .absolutize()
        .fs_context("failed to resolve overlay directory", overlay_dir)?;

    if output_dir.starts_with(work_dir) {
        crate::bail!(
            "working directory {} must not contain the output directory {}",
            work_dir.display(),
            output_dir.display()
        );
    }
    if work_dir.starts_with(flat_dir) || flat_dir.starts_with(work_dir) {
        crate::bail!(
            "working directory {} overlaps the flat library directory {}",
            work_dir.display(),
            flat_dir.display()
        );
    }
    for (what, input) in [("archive", &archive), ("overlay directory", &overlay_dir)] {
        if input.starts_with(work_dir) {
            crate::bail!(
                "working directory {} must not contain the {what} {}",
                work_dir.display(),
                input.display()
            );
        }
        if input.starts_with(flat_dir) {
            crate::bail!(
                "flat library directory {} must not contain the {what} {}",
                flat_dir.display(),
                input.display()
            );
        }
    }

    Ok(())
}
