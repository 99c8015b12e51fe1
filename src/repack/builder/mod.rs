//! Pipeline orchestration.
//!
//! This module provides the [`Pipeline`] orchestrator that drives one
//! repackaging run from the vendor SDK archive to the two flat-layout
//! archives.
//!
//! # Overview
//!
//! The pipeline:
//! 1. Unpacks the source archive into a private working directory
//! 2. Converts every `*.framework` bundle into `lib<Name>.dylib`
//! 3. Packs the flat library directory into the standard archive
//! 4. Merges the overlay libraries and packs the augmented archive
//! 5. Removes the working and flat library directories, whatever happened
//!
//! # Example
//!
//! ```no_run
//! use framework_dylib::repack::{Pipeline, SettingsBuilder};
//!
//! # async fn example() -> framework_dylib::repack::Result<()> {
//! let settings = SettingsBuilder::new()
//!     .archive("SDK/Agora_Native_SDK_for_Mac_v4.4.30.zip")
//!     .output_dir("dist")
//!     .build()?;
//!
//! let mut pipeline = Pipeline::new(settings);
//! for archive in pipeline.run().await? {
//!     println!("Created: {} ({} bytes)", archive.path.display(), archive.size);
//!     println!("SHA256: {}", archive.checksum);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`checksum`] - SHA256 checksum of packed archives
//! - [`orchestrator`] - [`Pipeline`] and its [`PipelineState`] machine
//! - [`tool_detection`] - External tool availability checking

mod checksum;
mod orchestrator;
mod tool_detection;

pub use checksum::calculate_sha256;
pub use orchestrator::{Pipeline, PipelineState};
pub use tool_detection::HAS_INSTALL_NAME_TOOL;
