//! Locating and serializing the mounted graphic

use crate::export::ExportError;
use crate::ui::scene::{Scene, VectorGraphic};

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// Borrowed handle to a graphic found in the scene
#[derive(Debug, Clone, Copy)]
pub struct GraphicHandle<'a> {
    graphic: &'a VectorGraphic,
}

impl<'a> GraphicHandle<'a> {
    pub fn id(&self) -> &'a str {
        &self.graphic.id
    }

    pub fn markup(&self) -> &'a str {
        &self.graphic.markup
    }
}

/// Finds the graphic mounted under `id`
pub fn locate_graphic<'a>(scene: &'a Scene, id: &str) -> Result<GraphicHandle<'a>, ExportError> {
    scene
        .find(id)
        .map(|graphic| GraphicHandle { graphic })
        .ok_or_else(|| ExportError::GraphicNotFound { id: id.to_string() })
}

/// Produces the standalone SVG text of a graphic
///
/// The markup must be well-formed XML whose root is an `<svg>` element carrying
/// the handle's id. A root without a namespace gets the SVG namespace declared,
/// since standalone SVG parsers require it.
pub fn serialize(handle: GraphicHandle<'_>) -> Result<String, ExportError> {
    let fail = |reason: String| ExportError::Serialization {
        id: handle.id().to_string(),
        reason,
    };

    let markup = handle.markup();
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };
    let document = roxmltree::Document::parse_with_options(markup, options)
        .map_err(|err| fail(format!("markup is not well-formed: {err}")))?;
    let root = document.root_element();

    let tag = root.tag_name();
    let namespace = tag.namespace();
    if tag.name() != "svg" || namespace.is_some_and(|ns| ns != SVG_NAMESPACE) {
        return Err(fail("root element is not <svg>".to_string()));
    }

    match root.attribute("id") {
        Some(id) if id == handle.id() => {}
        Some(id) => return Err(fail(format!("root element id is '{id}'"))),
        None => return Err(fail("root element has no id".to_string())),
    }

    if namespace.is_some() {
        return Ok(markup.to_string());
    }

    // Unprefixed root without a namespace, so the start tag begins with `<svg`
    let insert_at = root.range().start + "<svg".len();
    let mut text = String::with_capacity(markup.len() + SVG_NAMESPACE.len() + 9);
    text.push_str(&markup[..insert_at]);
    text.push_str(" xmlns=\"");
    text.push_str(SVG_NAMESPACE);
    text.push('"');
    text.push_str(&markup[insert_at..]);
    Ok(text)
}
