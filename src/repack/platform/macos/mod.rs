//! macOS Framework to flat dylib conversion.
//!
//! - `framework` - Bundle discovery and payload location
//! - `editor` - Load command queries and edits behind [`MetadataEditor`]
//! - `dylib` - Copying a payload out and rewriting its identity and dependencies
//! - `macho` - Read-only inspection of Mach-O files
//! - `overlay` - Merging pre-built dylibs into the flat library directory

pub mod dylib;
pub mod editor;
pub mod framework;
pub mod macho;
pub mod overlay;

pub use dylib::{ConversionReport, RELOCATION_PREFIX, convert_framework};
pub use editor::{InstallNameTool, MetadataEditor};
pub use framework::{FRAMEWORK_SUFFIX, FrameworkBundle, locate_payload, scan_frameworks};
pub use macho::{Arch, MachOInfo, inspect};
pub use overlay::merge_overlay;
