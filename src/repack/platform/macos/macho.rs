//! Read-only Mach-O inspection.
//!
//! Parsing is done natively with goblin. Nothing in this module modifies a
//! file.

use crate::repack::error::{Error, ErrorExt, Result};
use goblin::mach::{Mach, MachO};
use serde::{Serialize, Serializer};
use std::path::{Path, PathBuf};

/// CPU architecture of a Mach-O slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    X86_64,
    Arm64,
    I386,
    Arm64_32,
    PowerPC,
    PowerPC64,
    Unknown(u32),
}

impl Arch {
    fn from_cputype(cputype: u32) -> Self {
        use goblin::mach::cputype::{
            CPU_TYPE_ARM64, CPU_TYPE_ARM64_32, CPU_TYPE_I386, CPU_TYPE_POWERPC, CPU_TYPE_POWERPC64,
            CPU_TYPE_X86_64,
        };
        match cputype {
            CPU_TYPE_X86_64 => Self::X86_64,
            CPU_TYPE_ARM64 => Self::Arm64,
            CPU_TYPE_I386 => Self::I386,
            CPU_TYPE_ARM64_32 => Self::Arm64_32,
            CPU_TYPE_POWERPC => Self::PowerPC,
            CPU_TYPE_POWERPC64 => Self::PowerPC64,
            other => Self::Unknown(other),
        }
    }

    /// Architecture name as printed by `lipo -info`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::X86_64 => "x86_64",
            Self::Arm64 => "arm64",
            Self::I386 => "i386",
            Self::Arm64_32 => "arm64_32",
            Self::PowerPC => "ppc",
            Self::PowerPC64 => "ppc64",
            Self::Unknown(_) => "unknown",
        }
    }
}

impl std::fmt::Display for Arch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Arch {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Diagnostic summary of one Mach-O file.
#[derive(Debug, Clone, Serialize)]
pub struct MachOInfo {
    /// Inspected file.
    pub path: PathBuf,
    /// File-type classification, e.g. `Mach-O universal binary with 2 architectures (DYLIB)`.
    pub kind: String,
    /// Architectures in slice order.
    pub archs: Vec<Arch>,
    /// Install id (`LC_ID_DYLIB`), if any.
    pub install_id: Option<String>,
    /// Referenced libraries, self entry excluded.
    pub dependencies: Vec<String>,
    /// Runtime search paths (`LC_RPATH`).
    pub rpaths: Vec<String>,
}

/// Reads and summarizes the Mach-O file at `path`.
pub fn inspect(path: &Path) -> Result<MachOInfo> {
    let data = std::fs::read(path).fs_context("failed to read binary", path)?;
    inspect_bytes(path, &data)
}

fn inspect_bytes(path: &Path, data: &[u8]) -> Result<MachOInfo> {
    match parse(data)? {
        Mach::Binary(macho) => {
            let bits = if macho.is_64 { "64-bit" } else { "32-bit" };
            Ok(MachOInfo {
                path: path.to_path_buf(),
                kind: format!("Mach-O {bits} {}", file_type(&macho)),
                archs: vec![Arch::from_cputype(macho.header.cputype())],
                install_id: macho.name.map(str::to_string),
                dependencies: libs(&macho).into_iter().skip(1).collect(),
                rpaths: macho.rpaths.iter().map(|s| (*s).to_string()).collect(),
            })
        }
        Mach::Fat(fat) => {
            let mut archs = Vec::new();
            let mut first: Option<MachOInfo> = None;

            for arch in fat.iter_arches() {
                let arch = arch.map_err(|e| Error::MachOParse(e.to_string()))?;
                let macho = MachO::parse(fat_slice(data, arch.offset as usize, arch.size as usize)?, 0)
                    .map_err(|e| Error::MachOParse(e.to_string()))?;
                archs.push(Arch::from_cputype(macho.header.cputype()));

                // All slices of a vendor dylib share their load commands.
                if first.is_none() {
                    first = Some(MachOInfo {
                        path: path.to_path_buf(),
                        kind: file_type(&macho).to_string(),
                        archs: Vec::new(),
                        install_id: macho.name.map(str::to_string),
                        dependencies: libs(&macho).into_iter().skip(1).collect(),
                        rpaths: macho.rpaths.iter().map(|s| (*s).to_string()).collect(),
                    });
                }
            }

            let mut info = first.ok_or_else(|| {
                Error::MachOParse("universal binary contains no architectures".into())
            })?;
            info.kind = format!(
                "Mach-O universal binary with {} architectures ({})",
                archs.len(),
                info.kind
            );
            info.archs = archs;
            Ok(info)
        }
    }
}

/// Recorded library references, the self entry first.
///
/// For universal binaries the first slice is read.
pub fn dependency_list(data: &[u8]) -> Result<Vec<String>> {
    match parse(data)? {
        Mach::Binary(macho) => Ok(libs(&macho)),
        Mach::Fat(fat) => {
            let arch = fat
                .iter_arches()
                .next()
                .ok_or_else(|| Error::MachOParse("universal binary contains no architectures".into()))?
                .map_err(|e| Error::MachOParse(e.to_string()))?;
            let macho = MachO::parse(fat_slice(data, arch.offset as usize, arch.size as usize)?, 0)
                .map_err(|e| Error::MachOParse(e.to_string()))?;
            Ok(libs(&macho))
        }
    }
}

fn parse(data: &[u8]) -> Result<Mach<'_>> {
    Mach::parse(data).map_err(|e| Error::MachOParse(e.to_string()))
}

fn libs(macho: &MachO<'_>) -> Vec<String> {
    macho.libs.iter().map(|s| (*s).to_string()).collect()
}

fn file_type(macho: &MachO<'_>) -> &'static str {
    goblin::mach::header::filetype_to_str(macho.header.filetype)
}

fn fat_slice(data: &[u8], offset: usize, size: usize) -> Result<&[u8]> {
    offset
        .checked_add(size)
        .and_then(|end| data.get(offset..end))
        .ok_or_else(|| Error::MachOParse(format!("slice at {offset}+{size} is out of bounds")))
}


#[cfg(test)]
mod tests {
    use super::fixtures::{thin_dylib, universal};
    use super::*;
    use goblin::mach::cputype::{CPU_TYPE_ARM64, CPU_TYPE_X86_64};

    const RTC_ID: &str = "@rpath/AgoraRtcKit.framework/Versions/A/AgoraRtcKit";
    const FFMPEG: &str = "@rpath/Agoraffmpeg.framework/Versions/A/Agoraffmpeg";
    const SYSTEM: &str = "/usr/lib/libSystem.B.dylib";

    #[test]
    fn thin_dylib_lists_self_first() {
        let data = thin_dylib(CPU_TYPE_ARM64, RTC_ID, &[FFMPEG, SYSTEM], &[]);
        assert_eq!(dependency_list(&data).unwrap(), vec!["self", FFMPEG, SYSTEM]);
    }

    #[test]
    fn inspect_thin_dylib() {
        let data = thin_dylib(
            CPU_TYPE_ARM64,
            RTC_ID,
            &[FFMPEG],
            &["@loader_path/../Frameworks"],
        );
        let info = inspect_bytes(Path::new("libAgoraRtcKit.dylib"), &data).unwrap();

        assert_eq!(info.kind, "Mach-O 64-bit DYLIB");
        assert_eq!(info.archs, vec![Arch::Arm64]);
        assert_eq!(info.install_id.as_deref(), Some(RTC_ID));
        assert_eq!(info.dependencies, vec![FFMPEG]);
        assert_eq!(info.rpaths, vec!["@loader_path/../Frameworks"]);
    }

    #[test]
    fn inspect_universal_dylib() {
        let data = universal(&[
            (CPU_TYPE_X86_64, thin_dylib(CPU_TYPE_X86_64, RTC_ID, &[FFMPEG], &[])),
            (CPU_TYPE_ARM64, thin_dylib(CPU_TYPE_ARM64, RTC_ID, &[FFMPEG], &[])),
        ]);
        let info = inspect_bytes(Path::new("libAgoraRtcKit.dylib"), &data).unwrap();

        assert_eq!(
            info.kind,
            "Mach-O universal binary with 2 architectures (DYLIB)"
        );
        assert_eq!(info.archs, vec![Arch::X86_64, Arch::Arm64]);
        assert_eq!(info.install_id.as_deref(), Some(RTC_ID));
        assert_eq!(info.dependencies, vec![FFMPEG]);
        assert_eq!(dependency_list(&data).unwrap(), vec!["self", FFMPEG]);
    }

    #[test]
    fn inspect_reads_file_from_disk() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("libAgoraRtcKit.dylib");
        std::fs::write(&path, thin_dylib(CPU_TYPE_X86_64, RTC_ID, &[], &[])).unwrap();

        let info = inspect(&path).unwrap();
        assert_eq!(info.path, path);
        assert_eq!(info.archs, vec![Arch::X86_64]);
        assert!(info.dependencies.is_empty());
    }

    #[test]
    fn arch_names() {
        assert_eq!(Arch::from_cputype(goblin::mach::cputype::CPU_TYPE_ARM64), Arch::Arm64);
        assert_eq!(Arch::X86_64.to_string(), "x86_64");
        assert_eq!(Arch::Unknown(42).as_str(), "unknown");
    }

    #[test]
    fn arch_serializes_as_name() {
        let json = serde_json::to_string(&vec![Arch::X86_64, Arch::Arm64]).unwrap();
        assert_eq!(json, r#"["x86_64","arm64"]"#);
    }

    #[test]
    fn non_macho_is_rejected() {
        assert!(matches!(
            dependency_list(b"this is not a binary at all"),
            Err(Error::MachOParse(_))
        ));
        assert!(inspect_bytes(Path::new("x"), b"\0\0\0\0garbage").is_err());
    }

    #[test]
    fn out_of_bounds_slice_is_rejected() {
        assert!(fat_slice(&[0u8; 8], 4, 8).is_err());
        assert_eq!(fat_slice(&[1u8, 2, 3, 4], 1, 2).unwrap(), &[2, 3]);
    }

    #[test]
    fn inspect_reports_missing_file() {
        let temp = tempfile::tempdir().unwrap();
        assert!(matches!(
            inspect(&temp.path().join("libNope.dylib")),
            Err(Error::Fs { .. })
        ));
    }
}
