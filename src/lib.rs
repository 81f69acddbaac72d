//! transview: transition results view coordination and treemap export
//!
//! Layers follow the same split as the rest of the crate:
//! `domain` holds pure value types, `app` owns view state and the
//! cloning boundary, `ui` hosts the scene and the renderer seams,
//! and `export` turns a mounted treemap into a saved PDF.

pub mod app;
pub mod config;
pub mod domain;
pub mod export;
pub mod ui;

pub use app::controller::{Notice, NoticeLevel, ResultsController, ResultsProps};
pub use app::state::{DisplayMode, ViewDirective};
pub use config::ExportConfig;
pub use domain::transition::{Occupation, State, Transition, TransitionBatch};
pub use export::{ExportError, ExportReport};
