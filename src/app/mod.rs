//! Application orchestration layer
//!
//! Derives the displayed view from caller props, guards the matrix renderer
//! behind a mutable copy, and routes export clicks into the export pipeline.

pub mod boundary;
pub mod controller;
pub mod state;
