//! View state selection
//!
//! The displayed view is never stored. It is derived from the current props and
//! the selected display mode by [`select_view`], a pure function with a strict
//! precedence order: loading, then error, then the mode-specific data views.

use crate::domain::transition::{Occupation, State};

/// Representation the user picked for the transition data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    #[default]
    Matrix,
    Treemap,
}

/// Everything the selector looks at, borrowed from the caller
#[derive(Debug, Clone, Copy)]
pub struct ViewInputs<'a, T> {
    pub loading: bool,
    pub error: Option<&'a str>,
    pub batch: &'a [T],
    pub mode: DisplayMode,
    pub occupation: Option<&'a Occupation>,
    pub state: Option<&'a State>,
}

/// Exactly one rendering directive per render pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewDirective<'a, T> {
    ShowSpinner,
    ShowError(&'a str),
    ShowMatrix {
        batch: &'a [T],
        occupation: &'a Occupation,
        state: Option<&'a State>,
    },
    ShowTreemap {
        batch: &'a [T],
    },
    ShowNothing,
}

/// Picks the directive for the given inputs
///
/// Loading masks everything, an error masks data, and the matrix additionally
/// needs a selected occupation. An empty error message counts as no error.
///
/// # Arguments
/// * `inputs` - Props and mode for this render pass
///
/// # Returns
/// The single directive to render
pub fn select_view<'a, T>(inputs: &ViewInputs<'a, T>) -> ViewDirective<'a, T> {
    if inputs.loading {
        return ViewDirective::ShowSpinner;
    }

    if let Some(error) = inputs.error.filter(|error| !error.is_empty()) {
        return ViewDirective::ShowError(error);
    }

    let has_data = !inputs.batch.is_empty();
    match (inputs.mode, has_data, inputs.occupation) {
        (DisplayMode::Matrix, true, Some(occupation)) => ViewDirective::ShowMatrix {
            batch: inputs.batch,
            occupation,
            state: inputs.state,
        },
        (DisplayMode::Treemap, true, _) => ViewDirective::ShowTreemap {
            batch: inputs.batch,
        },
        _ => ViewDirective::ShowNothing,
    }
}

/// Enablement and highlight state of the mode toggles and the export control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub has_data: bool,
    /// Shared by both toggles and the export control
    pub disabled: bool,
    pub matrix_selected: bool,
    pub treemap_selected: bool,
}

impl Controls {
    pub fn derive(batch_len: usize, loading: bool, mode: DisplayMode) -> Self {
        let has_data = batch_len > 0;
        Self {
            has_data,
            disabled: !has_data || loading,
            matrix_selected: mode == DisplayMode::Matrix && has_data,
            treemap_selected: mode == DisplayMode::Treemap && has_data,
        }
    }

    /// Export is offered only for an enabled, selected treemap
    pub fn export_enabled(&self) -> bool {
        !self.disabled && self.treemap_selected
    }
}

/// Toggle events coming from the mode controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeEvent {
    MatrixRequested,
    TreemapRequested,
}

/// State machine for display mode transitions
pub struct ModeMachine;

impl ModeMachine {
    /// Processes a toggle event and returns the new mode
    ///
    /// Requests arriving while the controls are disabled are ignored. A pending
    /// error does not block switching; it keeps precedence in [`select_view`].
    ///
    /// # Arguments
    /// * `current` - Mode before the event
    /// * `event` - Toggle that was clicked
    /// * `controls` - Control state derived from the current props
    ///
    /// # Returns
    /// The mode after processing
    pub fn process_event(current: DisplayMode, event: ModeEvent, controls: &Controls) -> DisplayMode {
        if controls.disabled {
            tracing::debug!(?event, "mode toggle ignored while controls are disabled");
            return current;
        }

        let next = match event {
            ModeEvent::MatrixRequested => DisplayMode::Matrix,
            ModeEvent::TreemapRequested => DisplayMode::Treemap,
        };

        if next != current {
            tracing::debug!(from = ?current, to = ?next, "display mode changed");
        }
        next
    }
}
