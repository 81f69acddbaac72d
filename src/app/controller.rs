//! Results view controller
//!
//! Owns everything that outlives a single render pass: the selected display
//! mode, the mutable copy handed to the matrix renderer, the scene the treemap
//! is mounted in, and the queue of user-visible notices. It lives on the UI
//! thread and is driven by discrete callbacks (prop updates, toggle clicks,
//! export clicks).

use std::collections::VecDeque;
use std::sync::Arc;

use crate::app::boundary::MutableCopy;
use crate::app::state::{select_view, Controls, DisplayMode, ModeEvent, ModeMachine, ViewDirective, ViewInputs};
use crate::config::{ConfigError, ExportConfig};
use crate::domain::transition::{Occupation, State, Transition, TransitionBatch};
use crate::export::sink::DocumentSink;
use crate::export::{ExportError, ExportPipeline, ExportReport};
use crate::ui::renderer::{
    ErrorDisplay, MatrixRenderer, PlainErrorDisplay, SvgTreemapRenderer, TableRenderer, TreemapRenderer,
};
use crate::ui::scene::Scene;

/// Notices kept when the host does not drain the queue
pub const MAX_QUEUED_NOTICES: usize = 16;

/// Inputs supplied by the caller on every update
#[derive(Debug, Clone)]
pub struct ResultsProps<T = Transition> {
    pub selected_state: Option<State>,
    pub selected_occupation: Option<Occupation>,
    pub loading: bool,
    pub transitions: TransitionBatch<T>,
    pub error: Option<String>,
}

impl<T> Default for ResultsProps<T> {
    fn default() -> Self {
        Self {
            selected_state: None,
            selected_occupation: None,
            loading: false,
            transitions: Arc::from(Vec::new()),
            error: None,
        }
    }
}

/// What a render pass put on screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedView {
    Spinner,
    Error(String),
    Matrix(String),
    Treemap { graphic_id: String },
    Nothing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Transient notification for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

pub struct ResultsController<T = Transition> {
    props: ResultsProps<T>,
    mode: DisplayMode,
    copy: MutableCopy<T>,
    scene: Scene,
    notices: VecDeque<Notice>,
    /// Id the treemap graphic is currently mounted under
    mounted: Option<String>,
    pipeline: ExportPipeline,
    matrix: Box<dyn MatrixRenderer<T>>,
    treemap: Box<dyn TreemapRenderer<T>>,
    error_display: Box<dyn ErrorDisplay>,
}

impl ResultsController<Transition> {
    /// Controller wired to the built-in renderers
    pub fn with_defaults(config: ExportConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(
            ExportPipeline::new(config)?,
            Box::new(TableRenderer),
            Box::new(SvgTreemapRenderer::default()),
            Box::new(PlainErrorDisplay),
        ))
    }
}

impl<T: Clone> ResultsController<T> {
    pub fn new(
        pipeline: ExportPipeline,
        matrix: Box<dyn MatrixRenderer<T>>,
        treemap: Box<dyn TreemapRenderer<T>>,
        error_display: Box<dyn ErrorDisplay>,
    ) -> Self {
        Self {
            props: ResultsProps::default(),
            mode: DisplayMode::default(),
            copy: MutableCopy::new(),
            scene: Scene::new(),
            notices: VecDeque::new(),
            mounted: None,
            pipeline,
            matrix,
            treemap,
            error_display,
        }
    }

    /// Replaces the caller-supplied inputs
    ///
    /// A copy derived from a previous batch is released here; the copy for the
    /// new batch is made lazily by the next matrix render.
    pub fn set_props(&mut self, props: ResultsProps<T>) {
        self.copy.release_unless(&props.transitions);
        self.props = props;
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Number of batch copies made for the matrix renderer so far
    pub fn copies_made(&self) -> u64 {
        self.copy.copies_made()
    }

    pub fn controls(&self) -> Controls {
        Controls::derive(self.props.transitions.len(), self.props.loading, self.mode)
    }

    /// Current directive, derived from props and mode
    pub fn directive(&self) -> ViewDirective<'_, T> {
        select_view(&view_inputs(&self.props, self.mode))
    }

    /// Handles a click on one of the mode toggles
    pub fn handle_event(&mut self, event: ModeEvent) -> DisplayMode {
        self.mode = ModeMachine::process_event(self.mode, event, &self.controls());
        self.mode
    }

    /// Runs one render pass
    ///
    /// The treemap graphic stays mounted only while the treemap is the
    /// displayed view. It is unmounted under the id it was mounted with, even
    /// when a custom renderer tagged it with an id export does not look for.
    pub fn render(&mut self) -> RenderedView {
        let view = match select_view(&view_inputs(&self.props, self.mode)) {
            ViewDirective::ShowTreemap { batch } => {
                let graphic = self.treemap.render(batch);
                let expected = &self.pipeline.config().graphic_id;
                if graphic.id != *expected {
                    tracing::warn!(expected = %expected, actual = %graphic.id, "treemap graphic mounted under an unexpected id");
                }
                let mounted = graphic.id.clone();
                if let Some(previous) = self.mounted.replace(mounted.clone()).filter(|id| *id != mounted) {
                    self.scene.unmount(&previous);
                }
                self.scene.mount(graphic);
                return RenderedView::Treemap { graphic_id: mounted };
            }
            ViewDirective::ShowSpinner => RenderedView::Spinner,
            ViewDirective::ShowError(error) => RenderedView::Error(self.error_display.render(error)),
            ViewDirective::ShowMatrix { occupation, state, .. } => {
                let rows = self.copy.get(&self.props.transitions);
                RenderedView::Matrix(self.matrix.render(occupation, state, rows))
            }
            ViewDirective::ShowNothing => RenderedView::Nothing,
        };

        if let Some(id) = self.mounted.take() {
            self.scene.unmount(&id);
        }
        view
    }

    /// Handles a click on the export control
    ///
    /// Failures never escape as panics; they are returned and also queued as
    /// an error notice naming the stage that failed.
    pub fn export(&mut self, sink: &dyn DocumentSink) -> Result<ExportReport, ExportError> {
        let result = if self.controls().export_enabled() {
            self.pipeline.run(&self.scene, sink)
        } else {
            Err(ExportError::Unavailable)
        };

        match &result {
            Ok(report) => {
                self.push_notice(Notice::info(format!("Saved {}", report.path.display())));
            }
            Err(err) => {
                tracing::warn!(stage = %err.stage(), error = %err, "treemap export failed");
                self.push_notice(Notice::error(format!("Export failed ({}): {err}", err.stage())));
            }
        }
        result
    }

    /// Drains queued notices, oldest first
    ///
    /// Hosts are expected to drain after every export. Only the newest
    /// [`MAX_QUEUED_NOTICES`] are kept in between.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    fn push_notice(&mut self, notice: Notice) {
        if self.notices.len() == MAX_QUEUED_NOTICES {
            self.notices.pop_front();
        }
        self.notices.push_back(notice);
    }
}

fn view_inputs<T>(props: &ResultsProps<T>, mode: DisplayMode) -> ViewInputs<'_, T> {
    ViewInputs {
        loading: props.loading,
        error: props.error.as_deref(),
        batch: &props.transitions,
        mode,
        occupation: props.selected_occupation.as_ref(),
        state: props.selected_state.as_ref(),
    }
}
