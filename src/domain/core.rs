//! Core geometry types
//!
//! Regions are expressed in document units (millimetres) and surface sizes in
//! device pixels. Neither type knows anything about PDF or SVG.

use serde::{Deserialize, Serialize};

/// Rectangle in document coordinates, origin at the top-left of the page
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Region {
    /// Creates a new region
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Returns the right edge coordinate
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    /// Returns the bottom edge coordinate
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Returns true if the region has a positive, finite extent
    pub fn is_drawable(&self) -> bool {
        self.w.is_finite() && self.h.is_finite() && self.w > 0.0 && self.h > 0.0
    }
}

/// Size of an off-screen raster surface in device pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of pixels on the surface
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}
