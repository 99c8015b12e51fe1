//! `convert`: one Framework bundle to one flat dylib.

use crate::cli::{ConvertArgs, RuntimeConfig};
use crate::error::{CliError, Result};
use crate::repack::platform::macos::{FrameworkBundle, InstallNameTool, convert_framework};
use crate::repack::utils::fs;

/// Converts a single bundle into `OUTPUT_DIR`. The output is left in place.
pub async fn execute(args: &ConvertArgs, config: &RuntimeConfig) -> Result<i32> {
    let bundle = FrameworkBundle::from_path(&args.framework).ok_or_else(|| {
        CliError::InvalidArguments {
            reason: format!("Not a Framework bundle: {}", args.framework.display()),
        }
    })?;

    fs::create_dir_all(&args.output_dir, false).await?;

    config.progress(&format!("Converting {}", bundle.root().display()))?;
    let report = convert_framework(&bundle, &args.output_dir, &InstallNameTool, args.strict).await?;

    for (old, new) in &report.rewritten {
        config.verbose_println(&format!("   {old} -> {new}"))?;
    }
    if !report.identity_set {
        config.warn("install id was not updated")?;
    }
    if report.failures > 0 {
        config.warn(&format!(
            "{} rewrite failures tolerated, run with RUST_LOG=warn for details",
            report.failures
        ))?;
    }

    config.success(&format!("Created {}", report.library.display()))?;
    Ok(0)
}
