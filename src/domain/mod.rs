//! Domain types shared by the view and export layers
//!
//! Nothing here performs I/O or rendering; these are plain values the
//! caller supplies and the core passes around.

pub mod core;
pub mod transition;
