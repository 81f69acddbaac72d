//! Renderer seams and the default renderers
//!
//! The view core only talks to the traits in this module. The default
//! implementations are a text table for the matrix and a
//! two-level slice-and-dice treemap emitted as SVG. Layout is computed
//! separately from output so it can be tested without parsing markup.

use std::fmt::Write as _;

use crate::domain::core::Region;
use crate::domain::transition::{Occupation, State, Transition};
use crate::ui::scene::VectorGraphic;

/// Identifier every treemap graphic is tagged with
pub const TREEMAP_GRAPHIC_ID: &str = "treemap-svg";

/// Tabular renderer; allowed to reorder and edit `rows` in place
pub trait MatrixRenderer<T> {
    fn render(&mut self, occupation: &Occupation, state: Option<&State>, rows: &mut [T]) -> String;
}

/// Treemap renderer; output must carry [`TREEMAP_GRAPHIC_ID`]
pub trait TreemapRenderer<T> {
    fn render(&self, data: &[T]) -> VectorGraphic;
}

/// Renders an upstream error message
pub trait ErrorDisplay {
    fn render(&self, error: &str) -> String;
}

/// Shows the message verbatim
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainErrorDisplay;

impl ErrorDisplay for PlainErrorDisplay {
    fn render(&self, error: &str) -> String {
        error.to_string()
    }
}

/// Text table sorted by descending probability
#[derive(Debug, Default, Clone)]
pub struct TableRenderer;

impl MatrixRenderer<Transition> for TableRenderer {
    fn render(&mut self, occupation: &Occupation, state: Option<&State>, rows: &mut [Transition]) -> String {
        rows.sort_by(|a, b| b.probability.total_cmp(&a.probability));

        let title_width = rows
            .iter()
            .map(|row| row.target_title.chars().count())
            .max()
            .unwrap_or(0)
            .max("Target".len());

        let mut out = String::new();
        let _ = write!(out, "Transitions from {} ({})", occupation.title, occupation.code);
        if let Some(state) = state {
            let _ = write!(out, " in {}", state.name);
        }
        out.push('\n');
        let _ = writeln!(out, "{:<10}  {:<title_width$}  {:>8}  {:>9}", "Code", "Target", "Obs", "Share");
        for row in rows.iter() {
            let _ = writeln!(
                out,
                "{:<10}  {:<title_width$}  {:>8}  {:>8.2}%",
                row.target_occupation,
                row.target_title,
                row.total_obs,
                row.probability * 100.0
            );
        }
        out
    }
}

/// One rectangle of the treemap
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub label: String,
    pub group: String,
    pub rect: Region,
    pub color: &'static str,
}

/// Pre-calculated treemap layout
#[derive(Debug, Clone, PartialEq)]
pub struct TreemapLayout {
    pub tiles: Vec<Tile>,
    pub canvas_width: f32,
    pub canvas_height: f32,
}

const PALETTE: [&str; 8] = [
    "#4e79a7", "#f28e2b", "#e15759", "#76b7b2", "#59a14f", "#edc948", "#b07aa1", "#ff9da7",
];

impl TreemapLayout {
    /// Lays transitions out in two levels: target major groups split the width,
    /// occupations inside a group split the group's height.
    ///
    /// Records with a non-positive or non-finite probability get no area.
    pub fn from_transitions(data: &[Transition], canvas_width: f32, canvas_height: f32) -> Self {
        let mut groups: Vec<(&str, Vec<&Transition>)> = Vec::new();
        for transition in data.iter().filter(|t| weight(t) > 0.0) {
            let group = transition.target_group();
            match groups.iter_mut().find(|(name, _)| *name == group) {
                Some((_, members)) => members.push(transition),
                None => groups.push((group, vec![transition])),
            }
        }

        let total: f64 = groups.iter().flat_map(|(_, m)| m.iter()).map(|t| weight(t)).sum();
        let mut tiles = Vec::new();
        if total <= 0.0 {
            return Self {
                tiles,
                canvas_width,
                canvas_height,
            };
        }

        let mut x = 0.0f32;
        for (index, (group, members)) in groups.iter().enumerate() {
            let group_total: f64 = members.iter().map(|t| weight(t)).sum();
            let group_width = (group_total / total) as f32 * canvas_width;
            let color = PALETTE[index % PALETTE.len()];

            let mut y = 0.0f32;
            for member in members {
                let height = (weight(member) / group_total) as f32 * canvas_height;
                tiles.push(Tile {
                    label: member.target_title.clone(),
                    group: (*group).to_string(),
                    rect: Region::new(x, y, group_width, height),
                    color,
                });
                y += height;
            }
            x += group_width;
        }

        Self {
            tiles,
            canvas_width,
            canvas_height,
        }
    }

    /// Emits the layout as a standalone SVG document tagged with `id`
    pub fn to_svg(&self, id: &str) -> String {
        let mut svg = String::new();
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" id="{id}" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            id = escape_xml(id),
            w = self.canvas_width,
            h = self.canvas_height
        );
        for tile in &self.tiles {
            let r = tile.rect;
            let _ = write!(
                svg,
                r##"<g><rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}" stroke="#ffffff"/>"##,
                r.x, r.y, r.w, r.h, tile.color
            );
            if r.w >= 60.0 && r.h >= 16.0 {
                let _ = write!(
                    svg,
                    r##"<text x="{:.2}" y="{:.2}" font-family="sans-serif" font-size="11" fill="#ffffff">{}</text>"##,
                    r.x + 4.0,
                    r.y + 13.0,
                    escape_xml(&tile.label)
                );
            }
            svg.push_str("</g>");
        }
        svg.push_str("</svg>");
        svg
    }
}

fn weight(transition: &Transition) -> f64 {
    if transition.probability.is_finite() && transition.probability > 0.0 {
        transition.probability
    } else {
        0.0
    }
}

/// Escapes text for use in SVG content and attribute values
pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Slice-and-dice treemap drawn on a fixed canvas
#[derive(Debug, Clone)]
pub struct SvgTreemapRenderer {
    pub canvas_width: f32,
    pub canvas_height: f32,
}

impl SvgTreemapRenderer {
    pub const DEFAULT_WIDTH: f32 = 1020.0;
    pub const DEFAULT_HEIGHT: f32 = 768.0;
}

impl Default for SvgTreemapRenderer {
    fn default() -> Self {
        Self {
            canvas_width: Self::DEFAULT_WIDTH,
            canvas_height: Self::DEFAULT_HEIGHT,
        }
    }
}

impl TreemapRenderer<Transition> for SvgTreemapRenderer {
    fn render(&self, data: &[Transition]) -> VectorGraphic {
        let layout = TreemapLayout::from_transitions(data, self.canvas_width, self.canvas_height);
        tracing::debug!(tiles = layout.tiles.len(), "laid out treemap");
        VectorGraphic::new(TREEMAP_GRAPHIC_ID, layout.to_svg(TREEMAP_GRAPHIC_ID))
    }
}
