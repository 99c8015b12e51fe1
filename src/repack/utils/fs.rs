//! File system utilities for repackaging.
//!
//! Directory helpers here are idempotent: erasing a missing directory or
//! creating an existing one is not an error.

use crate::repack::error::{ErrorExt, Result};
use filetime::FileTime;
use std::{io, path::Path};
use tokio::fs;

/// Creates all of the directories of the specified path, erasing it first if specified.
pub async fn create_dir_all(path: &Path, erase: bool) -> Result<()> {
    if erase {
        remove_dir_all(path).await?;
    }

    fs::create_dir_all(path)
        .await
        .fs_context("failed to create directory", path)
}

/// Removes the directory and its contents if it exists.
pub async fn remove_dir_all(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).fs_context("failed to remove directory", path),
    }
}

/// Copies a regular file, replacing the destination.
///
/// Permission bits and access and modification times travel with the contents. The destination's parent must
/// already exist. The raw I/O error is returned so callers can map it onto
/// their own failure kind.
pub async fn copy_file(from: &Path, to: &Path) -> io::Result<()> {
    if !from.is_file() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{from:?} is not a file"),
        ));
    }
    // Overlay copies may land on a read-only library produced earlier.
    match fs::remove_file(to).await {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    fs::copy(from, to).await?;

    let meta = fs::metadata(from).await?;
    filetime::set_file_times(
        to,
        FileTime::from_last_access_time(&meta),
        FileTime::from_last_modification_time(&meta),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_dir_all_erases_previous_contents() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("flat");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("stale.dylib"), b"old").unwrap();

        create_dir_all(&dir, true).await.unwrap();

        assert!(dir.is_dir());
        assert!(!dir.join("stale.dylib").exists());
    }

    #[tokio::test]
    async fn remove_dir_all_is_idempotent() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("missing");
        remove_dir_all(&dir).await.unwrap();
        remove_dir_all(&dir).await.unwrap();
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn copy_file_preserves_mode_and_overwrites() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::tempdir().unwrap();
        let src = temp.path().join("src");
        let dst = temp.path().join("dst");
        std::fs::write(&src, b"new").unwrap();
        std::fs::set_permissions(&src, std::fs::Permissions::from_mode(0o755)).unwrap();
        std::fs::write(&dst, b"old").unwrap();
        std::fs::set_permissions(&dst, std::fs::Permissions::from_mode(0o444)).unwrap();

        copy_file(&src, &dst).await.unwrap();

        assert_eq!(std::fs::read(&dst).unwrap(), b"new");
        let mode = std::fs::metadata(&dst).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[tokio::test]
    async fn copy_file_preserves_modification_time() {
        let temp = tempfile::tempdir().unwrap();
        let src = temp.path().join("libA.dylib");
        let dst = temp.path().join("copy.dylib");
        std::fs::write(&src, b"lib").unwrap();
        let stamp = FileTime::from_unix_time(1_600_000_000, 0);
        filetime::set_file_mtime(&src, stamp).unwrap();

        copy_file(&src, &dst).await.unwrap();

        let meta = std::fs::metadata(&dst).unwrap();
        assert_eq!(FileTime::from_last_modification_time(&meta), stamp);
    }

    #[tokio::test]
    async fn copy_file_rejects_directories() {
        let temp = tempfile::tempdir().unwrap();
        let err = copy_file(temp.path(), &temp.path().join("x")).await;
        assert!(err.is_err());
    }
}
