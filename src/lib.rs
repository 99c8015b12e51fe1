//! Framework to flat dylib repackaging for the Agora macOS SDK.
//!
//! This library converts the `*.framework` bundles of a vendor SDK archive
//! into flat `lib<Name>.dylib` files that reference each other through
//! `@rpath/lib<Name>.dylib`, and packs them into distributable archives:
//! - `agora_sdk_mac_<tag>.zip` with the converted libraries
//! - `agora_sdk_mac_<tag>-aed.zip` with the overlay libraries merged in
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod cli;
pub mod error;
pub mod repack;
pub mod source;

// Re-export commonly used types
pub use error::{CliError, RepackError, Result};
