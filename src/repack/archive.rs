//! Zip extraction and packing.
//!
//! Both directions run on the blocking thread pool. Extraction restores unix
//! modes and symbolic links, which Framework bundles depend on
//! (`Versions/Current -> A`). Packing stores paths relative to the packed
//! directory in sorted order.

use crate::repack::error::{Error, Result};
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Unpacks `archive` into `target`, creating `target` if needed.
pub async fn extract_archive(archive: &Path, target: &Path) -> Result<()> {
    let archive = archive.to_path_buf();
    let target = target.to_path_buf();

    tokio::task::spawn_blocking(move || {
        unzip(&archive, &target).map_err(|source| Error::Archive {
            path: archive,
            operation: "extract",
            source,
        })
    })
    .await
    .map_err(|e| Error::GenericError(format!("archive extraction task panicked: {e}")))?
}

/// Packs every regular file below `source_dir` into a new zip at `archive`.
///
/// An existing file at `archive` is replaced. A partially written archive is
/// removed on failure.
pub async fn pack_directory(source_dir: &Path, archive: &Path) -> Result<()> {
    let source_dir = source_dir.to_path_buf();
    let archive = archive.to_path_buf();

    tokio::task::spawn_blocking(move || match zip_dir(&source_dir, &archive) {
        Ok(()) => Ok(()),
        Err(source) => {
            let _ = fs::remove_file(&archive);
            Err(Error::Archive {
                path: archive,
                operation: "pack",
                source,
            })
        }
    })
    .await
    .map_err(|e| Error::GenericError(format!("archive packing task panicked: {e}")))?
}

fn unzip(archive: &Path, target: &Path) -> std::result::Result<(), ZipError> {
    let file = File::open(archive)?;
    let mut zip = ZipArchive::new(BufReader::new(file))?;
    fs::create_dir_all(target)?;
    let root = target.canonicalize()?;

    // Links are created after every other entry, so no write goes through one.
    let mut links = Vec::new();

    for index in 0..zip.len() {
        let mut entry = zip.by_index(index)?;

        let Some(relative) = entry.enclosed_name() else {
            log::warn!("Skipping unsafe archive entry: {}", entry.name());
            continue;
        };

        if entry.is_dir() {
            fs::create_dir_all(root.join(&relative))?;
            continue;
        }

        if entry.is_symlink() {
            let mut link = String::new();
            io::Read::read_to_string(&mut entry, &mut link)?;
            links.push((relative, link));
            continue;
        }

        let Some(path) = contained_path(&root, &relative)? else {
            log::warn!("Skipping archive entry outside the target: {}", entry.name());
            continue;
        };
        let mut outfile = File::create(&path)?;
        io::copy(&mut entry, &mut outfile)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            if let Some(mode) = entry.unix_mode() {
                fs::set_permissions(&path, fs::Permissions::from_mode(mode & 0o7777))?;
            }
        }
    }

    #[cfg(unix)]
    for (relative, link) in links {
        restore_symlink(&root, &relative, &link)?;
    }
    #[cfg(not(unix))]
    if !links.is_empty() {
        log::warn!("Skipping {} symbolic links on this platform", links.len());
    }

    Ok(())
}

/// Creates the parent of `root/relative` and returns the entry path under the
/// canonical parent, or `None` when that parent resolves outside `root`.
fn contained_path(root: &Path, relative: &Path) -> io::Result<Option<PathBuf>> {
    let path = root.join(relative);
    let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
        return Ok(None);
    };

    fs::create_dir_all(parent)?;
    let parent = parent.canonicalize()?;
    Ok(parent.starts_with(root).then(|| parent.join(name)))
}

#[cfg(unix)]
fn restore_symlink(root: &Path, relative: &Path, link: &str) -> io::Result<()> {
    let Some(path) = contained_path(root, relative)? else {
        log::warn!("Skipping symlink outside the target: {}", relative.display());
        return Ok(());
    };

    let depth = path
        .parent()
        .and_then(|parent| parent.strip_prefix(root).ok())
        .map(|inside| inside.components().count())
        .unwrap_or(0);
    if !link_target_inside(depth, Path::new(link)) {
        log::warn!(
            "Skipping symlink escaping the archive: {} -> {}",
            relative.display(),
            link
        );
        return Ok(());
    }

    if fs::symlink_metadata(&path).is_ok() {
        log::warn!(
            "Skipping symlink over an existing entry: {}",
            relative.display()
        );
        return Ok(());
    }

    std::os::unix::fs::symlink(link, &path)
}

/// Checks that a link target, placed `depth` directories below the root,
/// resolves inside the root.
///
/// Only leading `..` components are accepted. A `..` after a named component
/// could climb back out through another link.
#[cfg_attr(not(unix), allow(dead_code))]
fn link_target_inside(depth: usize, link: &Path) -> bool {
    if link.as_os_str().is_empty() {
        return false;
    }

    let mut depth = depth;
    let mut descended = false;
    for component in link.components() {
        match component {
            Component::ParentDir => {
                if descended || depth == 0 {
                    return false;
                }
                depth -= 1;
            }
            Component::Normal(_) => descended = true,
            Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) => return false,
        }
    }

    true
}

fn zip_dir(source_dir: &Path, archive: &Path) -> std::result::Result<(), ZipError> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(source_dir) {
        let entry = entry.map_err(io::Error::from)?;
        if entry.file_type().is_file() {
            entries.push(entry.into_path());
        }
    }

    // Sort for reproducibility.
    entries.sort();

    let file = File::create(archive)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in entries {
        let relative = relative_name(source_dir, &path)?;

        #[cfg(unix)]
        let options = {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&path)?.permissions().mode();
            options.unix_permissions(mode)
        };

        zip.start_file(relative, options)?;
        let mut f = File::open(&path)?;
        io::copy(&mut f, &mut zip)?;
    }

    zip.finish()?;
    Ok(())
}

fn relative_name(source_dir: &Path, path: &Path) -> io::Result<String> {
    let relative = path.strip_prefix(source_dir).map_err(|_| {
        io::Error::other(format!(
            "{} is not inside {}",
            path.display(),
            source_dir.display()
        ))
    })?;
    Ok(relative.to_string_lossy().replace('\\', "/"))
}
