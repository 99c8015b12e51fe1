//! `process`: full SDK archive pipeline.

use crate::cli::{ProcessArgs, RuntimeConfig};
use crate::error::Result;
use crate::repack::{HAS_INSTALL_NAME_TOOL, Pipeline, SettingsBuilder};

/// Runs the pipeline and reports the two packed archives.
pub async fn execute(args: &ProcessArgs, config: &RuntimeConfig) -> Result<i32> {
    let mut builder = SettingsBuilder::new()
        .archive(&args.archive)
        .sdk_dir_name(&args.sdk_dir)
        .overlay_dir(&args.aed_dir)
        .version_marker(&args.version_marker)
        .strict(args.strict);
    if let Some(dir) = &args.output_dir {
        builder = builder.output_dir(dir);
    }
    if let Some(dir) = &args.work_dir {
        builder = builder.work_dir(dir);
    }

    let output = config.output().clone();
    let mut pipeline = Pipeline::new(builder.build()?).on_transition(move |state| {
        let _ = output.progress(state.description());
    });

    config.section("Repackaging macOS SDK")?;
    config.indent(&format!("Archive: {}", pipeline.source().path().display()))?;
    config.indent(&format!("Version: {}", pipeline.source().version_tag()))?;
    config.indent(&format!(
        "Output:  {}",
        pipeline.settings().output_dir().display()
    ))?;
    config.indent(&format!(
        "Overlay: {}",
        pipeline.settings().overlay_dir().display()
    ))?;
    config.verbose_println(&format!(
        "   Work:    {}",
        pipeline.settings().work_dir().display()
    ))?;

    if !*HAS_INSTALL_NAME_TOOL {
        config.warn("install_name_tool not found; libraries keep their original load commands")?;
    }
    if pipeline.settings().strict() {
        config.verbose_println("   Strict mode: rewrite failures abort the run")?;
    }

    config.progress("Extracting SDK archive...")?;
    let archives = pipeline.run().await?;

    for archive in &archives {
        config.success(&format!(
            "Created {} archive: {}",
            archive.kind,
            archive.path.display()
        ))?;
        config.indent(&format!("Size:   {} bytes", archive.size))?;
        config.indent(&format!("SHA256: {}", archive.checksum))?;
    }

    Ok(0)
}
