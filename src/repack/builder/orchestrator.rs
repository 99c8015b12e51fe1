//! Main pipeline orchestration.
//!
//! This module provides the [`Pipeline`] orchestrator that takes one SDK
//! archive through extraction, conversion, packing and cleanup.

use crate::repack::{
    ArchiveKind, PackedArchive, Result, Settings,
    archive::{extract_archive, pack_directory},
    error::ErrorExt,
    platform::macos::{InstallNameTool, MetadataEditor, convert_framework, merge_overlay, scan_frameworks},
    utils::fs,
};
use crate::source::SourceArchive;
use std::collections::HashMap;
use std::path::Path;

use super::{checksum::calculate_sha256, tool_detection::HAS_INSTALL_NAME_TOOL};

/// Progress of one pipeline run.
///
/// `CleanedUp` and `Failed` are terminal. `Failed` is entered from any step,
/// after cleanup has been attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Extracted,
    Converted,
    StandardPacked,
    OverlayApplied,
    OverlayPacked,
    CleanedUp,
    Failed,
}

impl PipelineState {
    /// Short description of what the pipeline has just done.
    pub fn description(self) -> &'static str {
        match self {
            Self::Idle => "Waiting to start",
            Self::Extracted => "Extracted SDK archive",
            Self::Converted => "Converted frameworks to dylibs",
            Self::StandardPacked => "Packed standard archive",
            Self::OverlayApplied => "Merged overlay libraries",
            Self::OverlayPacked => "Packed overlay archive",
            Self::CleanedUp => "Removed temporary directories",
            Self::Failed => "Pipeline failed, temporary directories removed",
        }
    }
}

type TransitionHook = Box<dyn Fn(PipelineState) + Send + Sync>;

/// One repackaging run.
///
/// Owns its working directory and flat library directory for the duration of
/// [`run`](Self::run). A pipeline runs once.
///
/// # Examples
///
/// ```no_run
/// use framework_dylib::repack::{Pipeline, PipelineState, Settings};
///
/// # async fn example(settings: Settings) -> framework_dylib::repack::Result<()> {
/// let mut pipeline = Pipeline::new(settings);
/// let archives = pipeline.run().await?;
/// assert_eq!(pipeline.state(), PipelineState::CleanedUp);
/// assert_eq!(archives.len(), 2);
/// # Ok(())
/// # }
/// ```
pub struct Pipeline {
    settings: Settings,
    source: SourceArchive,
    editor: Box<dyn MetadataEditor>,
    state: PipelineState,
    on_transition: Option<TransitionHook>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("settings", &self.settings)
            .field("source", &self.source)
            .field("editor", &"<dyn MetadataEditor>")
            .field("state", &self.state)
            .field("on_transition", &self.on_transition.is_some())
            .finish()
    }
}

impl Pipeline {
    /// Creates a pipeline that edits libraries with `install_name_tool`.
    pub fn new(settings: Settings) -> Self {
        Self::with_editor(settings, Box::new(InstallNameTool))
    }

    /// Creates a pipeline with a custom metadata editor.
    pub fn with_editor(settings: Settings, editor: Box<dyn MetadataEditor>) -> Self {
        let source = SourceArchive::new(settings.archive(), settings.version_marker());
        Self {
            settings,
            source,
            editor,
            state: PipelineState::Idle,
            on_transition: None,
        }
    }

    /// Calls `hook` with every state the pipeline enters, terminal states included.
    pub fn on_transition(mut self, hook: impl Fn(PipelineState) + Send + Sync + 'static) -> Self {
        self.on_transition = Some(Box::new(hook));
        self
    }

    /// Returns a reference to the pipeline settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns the identified source archive.
    pub fn source(&self) -> &SourceArchive {
        &self.source
    }

    /// Returns the current state.
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Runs the whole pipeline and returns the standard and overlay archives,
    /// in that order.
    ///
    /// The working and flat library directories are removed on every exit
    /// path. Fatal errors stop the run at the step that raised them.
    pub async fn run(&mut self) -> Result<Vec<PackedArchive>> {
        if self.state != PipelineState::Idle {
            crate::bail!("pipeline already ran (state: {:?})", self.state);
        }

        let result = self.execute().await;
        let cleanup = self.cleanup().await;

        match (result, cleanup) {
            (Ok(archives), Ok(())) => {
                self.set_state(PipelineState::CleanedUp);
                log::info!("Pipeline finished, {} archives written", archives.len());
                Ok(archives)
            }
            (Ok(_), Err(e)) => {
                self.set_state(PipelineState::Failed);
                Err(e)
            }
            (Err(e), cleanup) => {
                if let Err(cleanup_error) = cleanup {
                    log::warn!("Cleanup after failure also failed: {}", cleanup_error);
                }
                log::error!("Pipeline failed after {:?}: {}", self.state, e);
                self.set_state(PipelineState::Failed);
                Err(e)
            }
        }
    }

    async fn execute(&mut self) -> Result<Vec<PackedArchive>> {
        if !*HAS_INSTALL_NAME_TOOL {
            log::warn!(
                "install_name_tool not found; install ids and dependency references will not be rewritten"
            );
        }

        let output_dir = self.settings.output_dir().to_path_buf();
        let flat_dir = self.settings.flat_library_dir();
        let work_dir = self.settings.work_dir().to_path_buf();
        fs::create_dir_all(&output_dir, false).await?;

        // Idle -> Extracted
        log::info!(
            "Extracting {} into {}",
            self.source.path().display(),
            work_dir.display()
        );
        fs::create_dir_all(&work_dir, true).await?;
        extract_archive(self.source.path(), &work_dir).await?;
        self.set_state(PipelineState::Extracted);

        // Extracted -> Converted
        fs::create_dir_all(&flat_dir, true).await?;
        let bundles = scan_frameworks(&work_dir).await?;
        log::info!("Found {} framework bundles", bundles.len());

        let mut seen: HashMap<&str, &Path> = HashMap::new();
        for bundle in &bundles {
            if let Some(previous) = seen.insert(bundle.name(), bundle.root()) {
                log::warn!(
                    "Duplicate bundle name {}: {} replaces {}",
                    bundle.name(),
                    bundle.root().display(),
                    previous.display()
                );
            }
        }

        for bundle in &bundles {
            log::info!("Converting {}", bundle.root().display());
            let report = convert_framework(
                bundle,
                &flat_dir,
                self.editor.as_ref(),
                self.settings.strict(),
            )
            .await?;
            log::debug!(
                "{}: {} references rewritten, {} failures tolerated",
                report.library.display(),
                report.rewritten.len(),
                report.failures
            );
        }
        self.set_state(PipelineState::Converted);

        // Converted -> StandardPacked
        let standard = self.pack(&flat_dir, ArchiveKind::Standard).await?;
        self.set_state(PipelineState::StandardPacked);

        // StandardPacked -> OverlayApplied
        let merged = merge_overlay(self.settings.overlay_dir(), &flat_dir).await;
        log::info!("Merged {} overlay libraries", merged.len());
        self.set_state(PipelineState::OverlayApplied);

        // OverlayApplied -> OverlayPacked
        let overlay = self.pack(&flat_dir, ArchiveKind::Overlay).await?;
        self.set_state(PipelineState::OverlayPacked);

        Ok(vec![standard, overlay])
    }

    fn set_state(&mut self, state: PipelineState) {
        log::debug!("Pipeline state: {:?} -> {:?}", self.state, state);
        self.state = state;
        if let Some(hook) = &self.on_transition {
            hook(state);
        }
    }

    async fn pack(&self, flat_dir: &Path, kind: ArchiveKind) -> Result<PackedArchive> {
        let name = match kind {
            ArchiveKind::Standard => self.source.standard_archive_name(),
            ArchiveKind::Overlay => self.source.overlay_archive_name(),
        };
        let path = self.settings.output_dir().join(name);

        log::info!("Packing {}", path.display());
        pack_directory(flat_dir, &path).await?;

        let size = tokio::fs::metadata(&path)
            .await
            .fs_context("reading archive metadata", &path)?
            .len();
        let checksum = calculate_sha256(&path).await?;

        Ok(PackedArchive {
            kind,
            path,
            size,
            checksum,
        })
    }

    /// Removes the working and flat library directories.
    ///
    /// Both removals are attempted. The first failure is returned.
    async fn cleanup(&self) -> Result<()> {
        log::info!("Cleaning up temporary directories");
        let work = fs::remove_dir_all(self.settings.work_dir()).await;
        let flat = fs::remove_dir_all(&self.settings.flat_library_dir()).await;
        work.and(flat)
    }
}
