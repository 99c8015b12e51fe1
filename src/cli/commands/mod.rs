//! Subcommand implementations.
//!
//! Each command returns the process exit code on completion; fatal errors
//! propagate to `main`.

mod convert;
mod inspect;
mod process;

pub use convert::execute as convert;
pub use inspect::execute as inspect;
pub use process::execute as process;
