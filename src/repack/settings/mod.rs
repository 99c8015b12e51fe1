//! Configuration for a repackaging run.
//!
//! A [`Settings`] value is assembled once per invocation with
//! [`SettingsBuilder`] and handed to the pipeline, which owns every path it
//! names for the duration of the run.

mod builder;
mod core;

pub use builder::SettingsBuilder;
pub use core::Settings;

/// Default name of the flat library directory created under the output directory.
pub const DEFAULT_SDK_DIR_NAME: &str = "agora_sdk";

/// Default overlay directory, relative to the current directory.
pub const DEFAULT_OVERLAY_DIR: &str = "aed";

/// Default marker that starts the version tag in the archive filename.
pub const DEFAULT_VERSION_MARKER: &str = "v4.4.30";
