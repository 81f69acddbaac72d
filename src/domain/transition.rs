//! Transition records and their selection context
//!
//! A transition is one origin -> destination occupational move with a
//! magnitude. The view core never looks inside a record; only the default
//! renderers read its fields.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Shared, immutable batch of records supplied by the caller.
///
/// Identity of a batch is the identity of its allocation, so two batches with
/// equal content but different allocations are distinct.
pub type TransitionBatch<T = Transition> = Arc<[T]>;

/// A single occupational transition edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// Occupation code the workers move from
    pub source_occupation: String,
    /// Occupation code the workers move to
    pub target_occupation: String,
    /// Human readable title of the target occupation
    pub target_title: String,
    /// Number of observed moves behind this edge
    #[serde(default)]
    pub total_obs: u64,
    /// Share of leavers from the source that end up in the target
    pub probability: f64,
}

impl Transition {
    pub fn new(
        source_occupation: impl Into<String>,
        target_occupation: impl Into<String>,
        target_title: impl Into<String>,
        probability: f64,
    ) -> Self {
        Self {
            source_occupation: source_occupation.into(),
            target_occupation: target_occupation.into(),
            target_title: target_title.into(),
            total_obs: 0,
            probability,
        }
    }

    /// Major group of the target occupation (the first two code digits)
    pub fn target_group(&self) -> &str {
        let end = self
            .target_occupation
            .char_indices()
            .nth(2)
            .map(|(idx, _)| idx)
            .unwrap_or(self.target_occupation.len());
        &self.target_occupation[..end]
    }
}

/// Occupation the user picked as the origin of the transitions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupation {
    pub code: String,
    pub title: String,
}

impl Occupation {
    pub fn new(code: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            title: title.into(),
        }
    }
}

/// Geographic state the transitions were computed for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub abbreviation: String,
    pub name: String,
}

impl State {
    pub fn new(abbreviation: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            abbreviation: abbreviation.into(),
            name: name.into(),
        }
    }
}

/// Loads a batch of transitions from a JSON array
pub fn batch_from_json(json: &str) -> Result<TransitionBatch, serde_json::Error> {
    let records: Vec<Transition> = serde_json::from_str(json)?;
    Ok(records.into())
}
