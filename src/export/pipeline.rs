//! Export sequencing

use resvg::usvg;

use crate::config::{ConfigError, ExportConfig};
use crate::export::document::{compose_document, PageLabel};
use crate::export::graphic::{locate_graphic, serialize};
use crate::export::raster::{parse_options, rasterize, RasterImage};
use crate::export::sink::DocumentSink;
use crate::export::{ExportError, ExportReport};
use crate::ui::scene::Scene;

/// Runs the export stages against a scene
///
/// Holds no state between runs apart from the validated config and the
/// parser options (font database), so every run is independent.
pub struct ExportPipeline {
    config: ExportConfig,
    options: usvg::Options<'static>,
}

impl ExportPipeline {
    pub fn new(config: ExportConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let options = parse_options(config.load_system_fonts);
        Ok(Self { config, options })
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Exports the mounted graphic and hands the document to `sink`
    ///
    /// The raster surface is attached to `scene` only while it is drawn on and
    /// is detached before this returns, whatever the outcome.
    ///
    /// # Arguments
    /// * `scene` - Scene the graphic is mounted in
    /// * `sink` - Destination for the composed document
    ///
    /// # Returns
    /// Where the document went and its size, or the first stage error
    pub fn run(&self, scene: &Scene, sink: &dyn DocumentSink) -> Result<ExportReport, ExportError> {
        let config = &self.config;

        let handle = locate_graphic(scene, &config.graphic_id)?;
        let svg = serialize(handle)?;
        tracing::debug!(id = handle.id(), bytes = svg.len(), "serialized graphic");

        let image = {
            let mut surface = scene
                .attach_surface(config.surface)
                .ok_or(ExportError::SurfaceAllocation {
                    width: config.surface.width,
                    height: config.surface.height,
                })?;
            rasterize(&svg, &mut surface, &self.options)?;
            RasterImage::from_pixmap(&surface)
        };

        let bytes = compose_document(image, &PageLabel::from_config(config), config.image_region)?;
        let path = sink.persist(&bytes, &config.base_name)?;

        tracing::info!(path = %path.display(), "exported treemap");
        Ok(ExportReport {
            path,
            bytes: bytes.len(),
        })
    }
}
