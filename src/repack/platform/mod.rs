//! Platform-specific binary handling.
//!
//! Only Mach-O Framework bundles are handled today.

pub mod macos;
