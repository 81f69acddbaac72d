//! SVG rasterization onto an off-screen surface
//!
//! Rendering is synchronous: when [`rasterize`] returns `Ok`, the surface
//! holds the finished frame and can be embedded.

use std::sync::Arc;

use resvg::usvg;
use tiny_skia::{Pixmap, Transform};

use crate::domain::core::SurfaceSize;
use crate::export::ExportError;

/// Parser options for export rendering
///
/// System fonts are loaded only when `load_system_fonts` is set.
pub fn parse_options(load_system_fonts: bool) -> usvg::Options<'static> {
    let mut options = usvg::Options::default();
    if load_system_fonts {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        tracing::debug!(faces = db.len(), "loaded system fonts");
        options.fontdb = Arc::new(db);
    }
    options
}

/// Renders `svg` scaled to fill the whole surface
pub fn rasterize(svg: &str, surface: &mut Pixmap, options: &usvg::Options<'_>) -> Result<(), ExportError> {
    let tree = usvg::Tree::from_str(svg, options).map_err(ExportError::Raster)?;

    let size = tree.size();
    let sx = surface.width() as f32 / size.width();
    let sy = surface.height() as f32 / size.height();
    tracing::debug!(
        src_w = size.width(),
        src_h = size.height(),
        dst_w = surface.width(),
        dst_h = surface.height(),
        "rasterizing graphic"
    );

    resvg::render(&tree, Transform::from_scale(sx, sy), &mut surface.as_mut());
    Ok(())
}

/// Opaque 8-bit RGB copy of a finished surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub size: SurfaceSize,
    /// Row-major RGB triplets
    pub rgb: Vec<u8>,
}

impl RasterImage {
    /// Flattens the surface onto white, dropping the alpha channel
    pub fn from_pixmap(pixmap: &Pixmap) -> Self {
        let mut rgb = Vec::with_capacity(pixmap.pixels().len() * 3);
        for pixel in pixmap.pixels() {
            // Premultiplied channels over white: c + (255 - a)
            let backdrop = 255 - pixel.alpha();
            rgb.push(pixel.red().saturating_add(backdrop));
            rgb.push(pixel.green().saturating_add(backdrop));
            rgb.push(pixel.blue().saturating_add(backdrop));
        }

        Self {
            size: SurfaceSize::new(pixmap.width(), pixmap.height()),
            rgb,
        }
    }
}
