//! Shared helpers for the pipeline.

pub mod fs;
