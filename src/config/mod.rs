//! Configuration for the export pipeline
//!
//! Defaults reproduce the fixed export contract (label, 1020x768 surface,
//! image region at y-offset 15). A JSON file can override any subset.

pub mod export;

pub use export::{Anchor, ConfigError, ExportConfig};
