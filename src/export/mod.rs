//! Treemap export pipeline
//!
//! Turns the mounted treemap graphic into a saved PDF:
//! locate -> serialize -> rasterize -> compose -> persist.
//! Each stage is a standalone function returning a typed error, and the
//! pipeline short-circuits on the first failure.

pub mod document;
pub mod graphic;
pub mod pipeline;
pub mod raster;
pub mod sink;

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

pub use document::compose_document;
pub use graphic::{locate_graphic, serialize, GraphicHandle};
pub use pipeline::ExportPipeline;
pub use raster::{rasterize, RasterImage};
pub use sink::{DirectorySink, DocumentSink};

/// Pipeline stage an error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStage {
    Locate,
    Serialize,
    Surface,
    Rasterize,
    Compose,
    Persist,
}

impl fmt::Display for ExportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportStage::Locate => "locate",
            ExportStage::Serialize => "serialize",
            ExportStage::Surface => "surface allocation",
            ExportStage::Rasterize => "rasterize",
            ExportStage::Compose => "compose",
            ExportStage::Persist => "persist",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Export is unavailable: select a loaded treemap first")]
    Unavailable,

    #[error("Graphic '{id}' is not mounted")]
    GraphicNotFound { id: String },

    #[error("Graphic '{id}' could not be serialized: {reason}")]
    Serialization { id: String, reason: String },

    #[error("Failed to allocate a {width}x{height} raster surface")]
    SurfaceAllocation { width: u32, height: u32 },

    #[error("Failed to rasterize graphic: {0}")]
    Raster(#[source] resvg::usvg::Error),

    #[error("Failed to compose document: {0}")]
    Compose(#[source] printpdf::Error),

    #[error("Failed to compress document: {0}")]
    Compress(#[source] lopdf::Error),

    #[error("Failed to write {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ExportError {
    /// Stage the error was raised in
    pub fn stage(&self) -> ExportStage {
        match self {
            ExportError::Unavailable | ExportError::GraphicNotFound { .. } => ExportStage::Locate,
            ExportError::Serialization { .. } => ExportStage::Serialize,
            ExportError::SurfaceAllocation { .. } => ExportStage::Surface,
            ExportError::Raster(_) => ExportStage::Rasterize,
            ExportError::Compose(_) | ExportError::Compress(_) => ExportStage::Compose,
            ExportError::Persist { .. } => ExportStage::Persist,
        }
    }
}

/// Outcome of a successful export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    /// Where the document was written
    pub path: PathBuf,
    /// Size of the written document in bytes
    pub bytes: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_report_their_stage() {
        let missing = ExportError::GraphicNotFound {
            id: "treemap-svg".into(),
        };
        assert_eq!(missing.stage(), ExportStage::Locate);
        assert_eq!(missing.to_string(), "Graphic 'treemap-svg' is not mounted");

        let persist = ExportError::Persist {
            path: PathBuf::from("/tmp/treemap.pdf"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(persist.stage(), ExportStage::Persist);
        assert_eq!(persist.stage().to_string(), "persist");
    }
}
