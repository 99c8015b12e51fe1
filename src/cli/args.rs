//! Command line argument parsing and validation.
//!
//! This module provides CLI argument parsing using clap, with validation of
//! input paths before any work starts.

use crate::repack::platform::macos::FRAMEWORK_SUFFIX;
use crate::repack::{DEFAULT_OVERLAY_DIR, DEFAULT_SDK_DIR_NAME, DEFAULT_VERSION_MARKER};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Repackage macOS Framework bundles as flat dylibs
#[derive(Parser, Debug)]
#[command(
    name = "framework_dylib",
    version,
    about = "Repackage macOS Framework bundles as flat dylibs",
    long_about = "Converts every *.framework bundle in a vendor SDK archive into lib<Name>.dylib,
rewrites install ids and dependency references to @rpath/lib<Name>.dylib, and packs
the result twice: once as converted and once with the overlay dylibs merged in.

Usage:
  framework_dylib process SDK/Agora_Native_SDK_for_Mac_v4.4.30.zip --output-dir dist
  framework_dylib convert AgoraRtcKit.framework ./out
  framework_dylib inspect --dir ./agora_sdk

Exit code 0 = both archives exist in the output directory."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Print per-library detail
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print only errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the full pipeline on an SDK archive
    Process(ProcessArgs),
    /// Convert a single Framework bundle
    Convert(ConvertArgs),
    /// Show install id, dependencies and architectures of dylibs
    Inspect(InspectArgs),
}

#[derive(clap::Args, Debug)]
pub struct ProcessArgs {
    /// Vendor SDK zip archive
    #[arg(value_name = "SDK_ZIP")]
    pub archive: PathBuf,

    /// Directory receiving the output archives
    #[arg(short = 'o', long, env = "SDK_REPACK_OUTPUT_DIR", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Name of the transient flat library directory
    #[arg(long, value_name = "NAME", default_value = DEFAULT_SDK_DIR_NAME)]
    pub sdk_dir: String,

    /// Directory of pre-built dylibs merged into the -aed archive
    #[arg(long, env = "SDK_REPACK_AED_DIR", value_name = "DIR", default_value = DEFAULT_OVERLAY_DIR)]
    pub aed_dir: PathBuf,

    /// Extraction directory (erased, then removed when done)
    #[arg(long, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// Filename substring where the version tag starts
    #[arg(long, env = "SDK_REPACK_VERSION_MARKER", value_name = "STR", default_value = DEFAULT_VERSION_MARKER)]
    pub version_marker: String,

    /// Fail the run when an install id or dependency rewrite fails
    #[arg(long, env = "SDK_REPACK_STRICT")]
    pub strict: bool,
}

#[derive(clap::Args, Debug)]
pub struct ConvertArgs {
    /// Framework bundle to convert
    #[arg(value_name = "FRAMEWORK")]
    pub framework: PathBuf,

    /// Directory receiving lib<Name>.dylib (created if missing)
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Fail when an install id or dependency rewrite fails
    #[arg(long, env = "SDK_REPACK_STRICT")]
    pub strict: bool,
}

#[derive(clap::Args, Debug)]
pub struct InspectArgs {
    /// Dylib to inspect, or a directory with --dir
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Inspect every *.dylib directly inside PATH
    #[arg(short, long)]
    pub dir: bool,

    /// Emit JSON instead of text
    #[arg(long)]
    pub json: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        match &self.command {
            Command::Process(args) => {
                if !args.archive.is_file() {
                    return Err(format!("SDK archive not found: {}", args.archive.display()));
                }
            }
            Command::Convert(args) => {
                let is_bundle = args
                    .framework
                    .file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| {
                        name.len() > FRAMEWORK_SUFFIX.len() && name.ends_with(FRAMEWORK_SUFFIX)
                    });
                if !is_bundle {
                    return Err(format!(
                        "Not a Framework bundle: {}",
                        args.framework.display()
                    ));
                }
                if !args.framework.is_dir() {
                    return Err(format!(
                        "Framework path not found: {}",
                        args.framework.display()
                    ));
                }
            }
            Command::Inspect(args) => {
                if !args.path.exists() {
                    return Err(format!("Path not found: {}", args.path.display()));
                }
                if args.dir && !args.path.is_dir() {
                    return Err(format!("Not a directory: {}", args.path.display()));
                }
                if !args.dir && args.path.is_dir() {
                    return Err(format!(
                        "{} is a directory, pass --dir to inspect its dylibs",
                        args.path.display()
                    ));
                }
            }
        }

        Ok(())
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        let output = super::OutputManager::new(args.verbose, args.quiet);
        Self { output }
    }
}

impl RuntimeConfig {
    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }

    /// Print verbose message if in verbose mode
    pub fn verbose_println(&self, message: &str) -> std::io::Result<()> {
        self.output.verbose(message)
    }

    /// Print success message if not in quiet mode
    pub fn success(&self, message: &str) -> std::io::Result<()> {
        self.output.success(message)
    }

    /// Print warning message if not in quiet mode
    pub fn warn(&self, message: &str) -> std::io::Result<()> {
        self.output.warn(message)
    }

    /// Print error message
    pub fn error(&self, message: &str) -> std::io::Result<()> {
        self.output.error(message)
    }

    /// Print progress message
    pub fn progress(&self, message: &str) -> std::io::Result<()> {
        self.output.progress(message)
    }

    /// Print section header
    pub fn section(&self, title: &str) -> std::io::Result<()> {
        self.output.section(title)
    }

    /// Print indented text
    pub fn indent(&self, message: &str) -> std::io::Result<()> {
        self.output.indent(message)
    }
}
