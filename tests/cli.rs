#![allow(deprecated)] // cargo_bin is deprecated but still supported by assert_cmd
//! End-to-end tests of the `framework_dylib` binary.
//!
//! Payloads are not real Mach-O files, so every rewrite fails. The default
//! lenient policy must still produce both archives.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::tempdir;

const ENV_VARS: [&str; 4] = [
    "SDK_REPACK_OUTPUT_DIR",
    "SDK_REPACK_AED_DIR",
    "SDK_REPACK_VERSION_MARKER",
    "SDK_REPACK_STRICT",
];

fn bin(cwd: &Path) -> Command {
    let mut cmd = Command::cargo_bin("framework_dylib").expect("framework_dylib binary");
    cmd.current_dir(cwd);
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd
}

fn write_zip(path: &Path, files: &[(&str, &[u8])]) {
    let file = fs::File::create(path).expect("create zip");
    let mut zip = zip::ZipWriter::new(file);
    for (name, data) in files {
        zip.start_file(*name, zip::write::SimpleFileOptions::default())
            .expect("start entry");
        zip.write_all(data).expect("write entry");
    }
    zip.finish().expect("finish zip");
}

/// Entry names and contents, sorted by name.
fn read_zip(path: &Path) -> Vec<(String, Vec<u8>)> {
    let file = fs::File::open(path).expect("open zip");
    let mut zip = zip::ZipArchive::new(file).expect("read zip");
    let mut entries = Vec::new();
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).expect("entry");
        if entry.is_dir() {
            continue;
        }
        let mut data = Vec::new();
        entry.read_to_end(&mut data).expect("entry data");
        entries.push((entry.name().to_string(), data));
    }
    entries.sort();
    entries
}

fn process(cwd: &Path, archive: &Path) -> Command {
    let mut cmd = bin(cwd);
    cmd.arg("process")
        .arg(archive)
        .arg("--output-dir")
        .arg(cwd.join("dist"))
        .arg("--work-dir")
        .arg(cwd.join("work"));
    cmd
}

#[test]
fn scenario_a_single_bundle() {
    let tmp = tempdir().expect("tempdir");
    let archive = tmp.path().join("Agora_Native_SDK_for_Mac_v4.4.30.zip");
    write_zip(
        &archive,
        &[(
            "Agora_Native_SDK_for_Mac/libs/AgoraRtcKit.framework/Versions/Current/AgoraRtcKit",
            b"rtc payload",
        )],
    );
    fs::create_dir_all(tmp.path().join("aed")).expect("aed dir");

    process(tmp.path(), &archive)
        .assert()
        .success()
        .stdout(predicate::str::contains("agora_sdk_mac_v4.4.30.zip"))
        .stdout(predicate::str::contains("agora_sdk_mac_v4.4.30-aed.zip"))
        .stdout(predicate::str::contains("SHA256:"))
        .stdout(predicate::str::contains("Extracted SDK archive"))
        .stdout(predicate::str::contains("Converted frameworks to dylibs"))
        .stdout(predicate::str::contains("Merged overlay libraries"))
        .stdout(predicate::str::contains("Removed temporary directories"));

    let standard = read_zip(&tmp.path().join("dist/agora_sdk_mac_v4.4.30.zip"));
    let overlay = read_zip(&tmp.path().join("dist/agora_sdk_mac_v4.4.30-aed.zip"));
    assert_eq!(
        standard,
        vec![("libAgoraRtcKit.dylib".to_string(), b"rtc payload".to_vec())]
    );
    assert_eq!(standard, overlay);
}

#[test]
fn scenario_b_unknown_version() {
    let tmp = tempdir().expect("tempdir");
    let archive = tmp.path().join("macos_sdk.zip");
    write_zip(&archive, &[("Foo.framework/Foo", b"foo")]);

    process(tmp.path(), &archive).assert().success();

    assert!(tmp.path().join("dist/agora_sdk_mac_unknown.zip").is_file());
    assert!(tmp.path().join("dist/agora_sdk_mac_unknown-aed.zip").is_file());
}

#[test]
fn scenario_c_missing_payload_fails_cleanly() {
    let tmp = tempdir().expect("tempdir");
    let archive = tmp.path().join("Agora_Native_SDK_for_Mac_v4.4.30.zip");
    write_zip(
        &archive,
        &[
            ("libs/Good.framework/Versions/A/Good", b"good"),
            ("libs/Broken.framework/Resources/Info.plist", b"plist"),
        ],
    );

    process(tmp.path(), &archive)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("no binary payload found"));

    assert!(!tmp.path().join("dist/agora_sdk_mac_v4.4.30.zip").exists());
    assert!(!tmp.path().join("dist/agora_sdk_mac_v4.4.30-aed.zip").exists());
    assert!(!tmp.path().join("dist/agora_sdk").exists());
    assert!(!tmp.path().join("work").exists());
}

#[test]
fn overlay_bytes_win_in_aed_archive() {
    let tmp = tempdir().expect("tempdir");
    let archive = tmp.path().join("Mac_v4.4.30.zip");
    write_zip(
        &archive,
        &[
            ("AgoraRtcKit.framework/AgoraRtcKit", b"converted"),
            ("Agoraffmpeg.framework/Versions/B/Agoraffmpeg", b"ffmpeg"),
        ],
    );
    let aed = tmp.path().join("aed");
    fs::create_dir_all(&aed).expect("aed dir");
    fs::write(aed.join("libAgoraRtcKit.dylib"), b"overlay").expect("overlay lib");
    fs::write(aed.join("libAgoraAed.dylib"), b"aed").expect("extra lib");
    fs::write(aed.join("readme.txt"), b"skip").expect("non-dylib");

    process(tmp.path(), &archive).assert().success();

    let standard = read_zip(&tmp.path().join("dist/agora_sdk_mac_v4.4.30.zip"));
    assert_eq!(
        standard,
        vec![
            ("libAgoraRtcKit.dylib".to_string(), b"converted".to_vec()),
            ("libAgoraffmpeg.dylib".to_string(), b"ffmpeg".to_vec()),
        ]
    );

    let overlay = read_zip(&tmp.path().join("dist/agora_sdk_mac_v4.4.30-aed.zip"));
    assert_eq!(
        overlay,
        vec![
            ("libAgoraAed.dylib".to_string(), b"aed".to_vec()),
            ("libAgoraRtcKit.dylib".to_string(), b"overlay".to_vec()),
            ("libAgoraffmpeg.dylib".to_string(), b"ffmpeg".to_vec()),
        ]
    );
}

#[test]
fn missing_overlay_dir_still_packs_both() {
    let tmp = tempdir().expect("tempdir");
    let archive = tmp.path().join("Mac_v4.4.30.zip");
    write_zip(&archive, &[("Foo.framework/Foo", b"foo")]);

    bin(tmp.path())
        .arg("process")
        .arg(&archive)
        .arg("--aed-dir")
        .arg(tmp.path().join("no-such-dir"))
        .assert()
        .success();

    // Default output directory is the current directory.
    let standard = read_zip(&tmp.path().join("agora_sdk_mac_v4.4.30.zip"));
    let overlay = read_zip(&tmp.path().join("agora_sdk_mac_v4.4.30-aed.zip"));
    assert_eq!(standard, overlay);
    assert!(!tmp.path().join("agora_sdk").exists());
}

#[test]
fn temporary_directories_are_removed_after_success() {
    let tmp = tempdir().expect("tempdir");
    let archive = tmp.path().join("Mac_v4.4.30.zip");
    write_zip(&archive, &[("Foo.framework/Versions/A/Foo", b"foo")]);

    process(tmp.path(), &archive).assert().success();

    assert!(!tmp.path().join("work").exists());
    assert!(!tmp.path().join("dist/agora_sdk").exists());
}

#[test]
fn rerun_replaces_archives_with_same_names() {
    let tmp = tempdir().expect("tempdir");
    let archive = tmp.path().join("Mac_v4.4.30.zip");
    write_zip(&archive, &[("Foo.framework/Foo", b"foo")]);

    process(tmp.path(), &archive).assert().success();
    process(tmp.path(), &archive).assert().success();

    let mut names: Vec<_> = fs::read_dir(tmp.path().join("dist"))
        .expect("dist")
        .map(|e| e.expect("entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec!["agora_sdk_mac_v4.4.30-aed.zip", "agora_sdk_mac_v4.4.30.zip"]
    );
}

#[test]
fn custom_version_marker_from_env() {
    let tmp = tempdir().expect("tempdir");
    let archive = tmp.path().join("Agora_Native_SDK_for_Mac_v4.5.0_FULL.zip");
    write_zip(&archive, &[("Foo.framework/Foo", b"foo")]);

    process(tmp.path(), &archive)
        .env("SDK_REPACK_VERSION_MARKER", "v4.5.0")
        .assert()
        .success();

    assert!(tmp.path().join("dist/agora_sdk_mac_v4.5.0_FULL.zip").is_file());
}

#[test]
fn strict_mode_fails_on_rewrite_errors() {
    let tmp = tempdir().expect("tempdir");
    let archive = tmp.path().join("Mac_v4.4.30.zip");
    write_zip(&archive, &[("Foo.framework/Foo", b"not mach-o")]);

    process(tmp.path(), &archive)
        .arg("--strict")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("failed to set install id"));

    assert!(!tmp.path().join("dist/agora_sdk_mac_v4.4.30.zip").exists());
    assert!(!tmp.path().join("work").exists());
    assert!(!tmp.path().join("dist/agora_sdk").exists());
}

#[test]
fn missing_archive_creates_nothing() {
    let tmp = tempdir().expect("tempdir");

    process(tmp.path(), &tmp.path().join("missing.zip"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("SDK archive not found"));

    assert!(!tmp.path().join("dist").exists());
    assert!(!tmp.path().join("work").exists());
}

#[test]
fn work_dir_over_output_dir_is_rejected() {
    let tmp = tempdir().expect("tempdir");
    let archive = tmp.path().join("Mac_v4.4.30.zip");
    write_zip(&archive, &[("Foo.framework/Foo", b"foo")]);
    fs::create_dir_all(tmp.path().join("dist")).expect("dist");
    fs::write(tmp.path().join("dist/keep.txt"), b"keep").expect("write");

    for work in [tmp.path().join("dist"), tmp.path().to_path_buf()] {
        bin(tmp.path())
            .arg("process")
            .arg(&archive)
            .arg("--output-dir")
            .arg(tmp.path().join("dist"))
            .arg("--work-dir")
            .arg(work)
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("must not contain the output directory"));
    }

    assert_eq!(fs::read(tmp.path().join("dist/keep.txt")).expect("kept"), b"keep");
    assert!(archive.is_file());
}

#[test]
fn corrupt_archive_fails() {
    let tmp = tempdir().expect("tempdir");
    let archive = tmp.path().join("Mac_v4.4.30.zip");
    fs::write(&archive, b"PK but not really").expect("write");

    process(tmp.path(), &archive)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to extract archive"));
    assert!(!tmp.path().join("work").exists());
}

#[test]
fn convert_single_bundle() {
    let tmp = tempdir().expect("tempdir");
    let bundle = tmp.path().join("AgoraRtcKit.framework");
    fs::create_dir_all(bundle.join("Versions/A")).expect("bundle");
    fs::write(bundle.join("Versions/A/AgoraRtcKit"), b"payload").expect("payload");

    bin(tmp.path())
        .arg("convert")
        .arg(&bundle)
        .arg(tmp.path().join("out/nested"))
        .assert()
        .success()
        .stdout(predicate::str::contains("libAgoraRtcKit.dylib"));

    let library = tmp.path().join("out/nested/libAgoraRtcKit.dylib");
    assert_eq!(fs::read(library).expect("library"), b"payload");
}

#[test]
fn convert_rejects_non_bundle() {
    let tmp = tempdir().expect("tempdir");
    fs::create_dir_all(tmp.path().join("AgoraRtcKit")).expect("dir");

    bin(tmp.path())
        .args(["convert", "AgoraRtcKit", "out"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not a Framework bundle"));

    bin(tmp.path())
        .args(["convert", "Missing.framework", "out"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Framework path not found"));

    assert!(!tmp.path().join("out").exists());
}

#[test]
fn convert_without_payload_fails() {
    let tmp = tempdir().expect("tempdir");
    fs::create_dir_all(tmp.path().join("Empty.framework/Resources")).expect("bundle");

    bin(tmp.path())
        .args(["convert", "Empty.framework", "out"])
        .assert()
        .failure()
        .code(1);

    assert!(!tmp.path().join("out/libEmpty.dylib").exists());
}

#[test]
fn inspect_missing_path_fails() {
    let tmp = tempdir().expect("tempdir");

    bin(tmp.path())
        .args(["inspect", "libNope.dylib"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Path not found"));
}

#[test]
fn inspect_empty_directory_fails() {
    let tmp = tempdir().expect("tempdir");
    fs::create_dir_all(tmp.path().join("agora_sdk")).expect("dir");
    fs::write(tmp.path().join("agora_sdk/readme.txt"), b"x").expect("file");

    bin(tmp.path())
        .args(["inspect", "--dir", "agora_sdk"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("No dylib files found"));
}

#[test]
fn inspect_non_macho_fails_with_warning() {
    let tmp = tempdir().expect("tempdir");
    fs::write(tmp.path().join("notes.txt"), b"plain text").expect("file");

    bin(tmp.path())
        .args(["inspect", "notes.txt", "--json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a .dylib file"))
        .stderr(predicate::str::contains("failed to parse Mach-O"));
}

#[test]
fn inspect_directory_reports_unparseable_files() {
    let tmp = tempdir().expect("tempdir");
    let dir = tmp.path().join("agora_sdk");
    fs::create_dir_all(&dir).expect("dir");
    fs::write(dir.join("libFake.dylib"), b"fake").expect("file");

    bin(tmp.path())
        .args(["inspect", "--dir", "agora_sdk", "--json"])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("[]"))
        .stderr(predicate::str::contains("libFake.dylib"));
}
