use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::core::{Region, SurfaceSize};
use crate::ui::renderer::TREEMAP_GRAPHIC_ID;

/// Point in document coordinates, origin at the top-left of the page
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub x: f32,
    pub y: f32,
}

/// Settings for the treemap export pipeline
///
/// Every field has a default; a config file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Identifier of the mounted graphic to export
    pub graphic_id: String,
    /// File name without extension
    pub base_name: String,
    pub label: String,
    pub label_anchor: Anchor,
    /// Label size in points
    pub label_font_size: f32,
    /// Off-screen raster surface, in device pixels
    pub surface: SurfaceSize,
    /// Where the image goes on the page, in millimetres
    pub image_region: Region,
    /// Directory the document is written to; the user's download directory when unset
    pub output_dir: Option<PathBuf>,
    /// Load system fonts so SVG text is rasterized
    pub load_system_fonts: bool,
}

impl ExportConfig {
    pub const DEFAULT_BASE_NAME: &'static str = "treemap";
    pub const DEFAULT_LABEL: &'static str = "Tree Map";
    pub const DEFAULT_LABEL_FONT_SIZE: f32 = 16.0;
    pub const SURFACE_WIDTH: u32 = 1020;
    pub const SURFACE_HEIGHT: u32 = 768;
    pub const IMAGE_OFFSET_Y: f32 = 15.0;
    /// Largest surface edge accepted, in pixels
    pub const MAX_SURFACE_EDGE: u32 = 16_384;

    /// Reads a JSON config file and validates it
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded export config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.graphic_id.trim().is_empty() {
            return Err(ConfigError::Invalid("graphic_id must not be empty".into()));
        }
        if self.base_name.trim().is_empty() || self.base_name.contains(['/', '\\']) {
            return Err(ConfigError::Invalid(format!(
                "base_name {:?} must be a plain file name",
                self.base_name
            )));
        }
        if self.surface.area() == 0
            || self.surface.width > Self::MAX_SURFACE_EDGE
            || self.surface.height > Self::MAX_SURFACE_EDGE
        {
            return Err(ConfigError::Invalid(format!(
                "surface {}x{} is outside 1..={} pixels per edge",
                self.surface.width,
                self.surface.height,
                Self::MAX_SURFACE_EDGE
            )));
        }
        if !self.image_region.is_drawable() || self.image_region.x < 0.0 || self.image_region.y < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "image region {:?} must have a positive size and a non-negative origin",
                self.image_region
            )));
        }
        if !(self.label_font_size.is_finite() && self.label_font_size > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "label_font_size {} must be positive",
                self.label_font_size
            )));
        }
        Ok(())
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            graphic_id: TREEMAP_GRAPHIC_ID.to_string(),
            base_name: Self::DEFAULT_BASE_NAME.to_string(),
            label: Self::DEFAULT_LABEL.to_string(),
            label_anchor: Anchor { x: 10.0, y: 10.0 },
            label_font_size: Self::DEFAULT_LABEL_FONT_SIZE,
            surface: SurfaceSize::new(Self::SURFACE_WIDTH, Self::SURFACE_HEIGHT),
            image_region: Region::new(
                0.0,
                Self::IMAGE_OFFSET_Y,
                Self::SURFACE_WIDTH as f32,
                Self::SURFACE_HEIGHT as f32,
            ),
            output_dir: None,
            load_system_fonts: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("Failed to parse config {path}: {source}")]
    Parse { path: PathBuf, source: serde_json::Error },
    #[error("Invalid export config: {0}")]
    Invalid(String),
}
