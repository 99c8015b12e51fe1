//! Overlay library merging.

use crate::repack::utils::fs;
use std::path::{Path, PathBuf};

/// Copies every `*.dylib` directly inside `overlay_dir` into `flat_dir`.
///
/// Existing files with the same name are replaced, so overlay libraries take
/// precedence over converted ones. A missing or empty overlay directory is a
/// no-op and individual copy failures are logged and skipped. Returns the
/// names of the libraries that were copied.
pub async fn merge_overlay(overlay_dir: &Path, flat_dir: &Path) -> Vec<String> {
    if !overlay_dir.is_dir() {
        log::info!(
            "Overlay directory {} not found, skipping merge",
            overlay_dir.display()
        );
        return Vec::new();
    }

    let candidates = overlay_libraries(overlay_dir);
    if candidates.is_empty() {
        log::info!("No overlay libraries in {}", overlay_dir.display());
        return Vec::new();
    }

    let mut merged = Vec::new();
    for source in candidates {
        let Some(name) = source.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        let target = flat_dir.join(&name);

        if target.exists() {
            log::debug!("Overlay replaces {}", target.display());
        }

        match fs::copy_file(&source, &target).await {
            Ok(()) => {
                log::debug!("Merged overlay library {}", name);
                merged.push(name);
            }
            Err(e) => log::warn!(
                "Failed to copy overlay library {} to {}: {}",
                source.display(),
                target.display(),
                e
            ),
        }
    }

    merged
}

fn overlay_libraries(overlay_dir: &Path) -> Vec<PathBuf> {
    let escaped = glob::Pattern::escape(&overlay_dir.to_string_lossy());
    let pattern = format!("{escaped}/*.dylib");

    let paths = match glob::glob(&pattern) {
        Ok(paths) => paths,
        Err(e) => {
            log::warn!("Invalid overlay pattern {}: {}", pattern, e);
            return Vec::new();
        }
    };

    let mut libraries: Vec<PathBuf> = paths
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                log::warn!("Skipping unreadable overlay entry: {}", e);
                None
            }
        })
        .filter(|path| path.is_file())
        .collect();
    libraries.sort();
    libraries
}
