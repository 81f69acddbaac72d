pub mod renderer;
pub mod scene;

pub use renderer::{
    ErrorDisplay, MatrixRenderer, PlainErrorDisplay, SvgTreemapRenderer, TableRenderer, TreemapRenderer,
    TREEMAP_GRAPHIC_ID,
};
pub use scene::{Scene, SurfaceGuard, VectorGraphic};
