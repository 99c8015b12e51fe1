//! `inspect`: read-only report of install id, dependencies and architectures.

use crate::cli::{InspectArgs, RuntimeConfig};
use crate::error::{CliError, Result};
use crate::repack::error::ErrorExt;
use crate::repack::platform::macos::{MachOInfo, inspect};
use std::path::{Path, PathBuf};

const DYLIB_EXTENSION: &str = "dylib";

/// Inspects one file, or every dylib in a directory with `--dir`.
///
/// Returns 1 if any file in a directory could not be parsed.
pub async fn execute(args: &InspectArgs, config: &RuntimeConfig) -> Result<i32> {
    if !args.dir {
        if !has_dylib_extension(&args.path) {
            config.warn(&format!("{} is not a .dylib file", args.path.display()))?;
        }
        let info = inspect(&args.path)?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&info)?);
        } else {
            print_info(&info, config)?;
        }
        return Ok(0);
    }

    let files = dylibs_in(&args.path)?;
    if files.is_empty() {
        return Err(CliError::NothingFound {
            what: "dylib files",
            path: args.path.clone(),
        }
        .into());
    }
    config.progress(&format!("Found {} dylib files", files.len()))?;

    let mut infos = Vec::with_capacity(files.len());
    let mut failed = 0;
    for file in &files {
        match inspect(file) {
            Ok(info) => infos.push(info),
            Err(e) => {
                config.error(&format!("{}: {}", file.display(), e))?;
                failed += 1;
            }
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&infos)?);
    } else {
        for info in &infos {
            print_info(info, config)?;
        }
    }

    Ok(if failed == 0 { 0 } else { 1 })
}

fn print_info(info: &MachOInfo, config: &RuntimeConfig) -> std::io::Result<()> {
    config.section(&info.path.display().to_string())?;
    config.indent(&format!(
        "Install ID:    {}",
        info.install_id.as_deref().unwrap_or("(none)")
    ))?;
    config.indent(&format!("File type:     {}", info.kind))?;
    let archs: Vec<&str> = info.archs.iter().map(|a| a.as_str()).collect();
    config.indent(&format!("Architectures: {}", archs.join(" ")))?;

    config.indent(&format!("Dependencies ({}):", info.dependencies.len()))?;
    if let Some(id) = &info.install_id {
        config.indent(&format!("   0: {id} (self)"))?;
    }
    for (i, dependency) in info.dependencies.iter().enumerate() {
        config.indent(&format!("  {:>2}: {}", i + 1, dependency))?;
    }

    if !info.rpaths.is_empty() {
        config.indent("Rpaths:")?;
        for rpath in &info.rpaths {
            config.indent(&format!("      {rpath}"))?;
        }
    }
    Ok(())
}

fn has_dylib_extension(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == DYLIB_EXTENSION)
}

/// Regular `*.dylib` files directly inside `dir`, sorted.
fn dylibs_in(dir: &Path) -> crate::repack::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).fs_context("failed to read directory", dir)? {
        let path = entry.fs_context("failed to read directory entry", dir)?.path();
        if path.is_file() && has_dylib_extension(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
