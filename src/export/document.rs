//! PDF composition
//!
//! Document coordinates are millimetres with the origin at the top-left, the
//! way the label anchor and image region are configured. PDF itself measures
//! from the bottom-left, so y values are flipped against the page height.

use printpdf::{
    BuiltinFont, ColorBits, ColorSpace, Image, ImageTransform, ImageXObject, Mm, PdfDocument, Px,
};

use crate::config::{Anchor, ExportConfig};
use crate::domain::core::Region;
use crate::export::raster::RasterImage;
use crate::export::ExportError;

const MM_PER_INCH: f32 = 25.4;

/// Text written above the image
#[derive(Debug, Clone, PartialEq)]
pub struct PageLabel<'a> {
    pub text: &'a str,
    pub anchor: Anchor,
    /// Size in points
    pub font_size: f32,
}

impl<'a> PageLabel<'a> {
    pub fn from_config(config: &'a ExportConfig) -> Self {
        Self {
            text: &config.label,
            anchor: config.label_anchor,
            font_size: config.label_font_size,
        }
    }
}

/// Builds a single-page PDF with `label` and `image` stretched over `region`
///
/// The page is sized to contain the region and the label anchor. Streams are
/// Flate-compressed before the bytes are returned.
///
/// # Arguments
/// * `image` - Finished raster, embedded as an 8-bit RGB XObject
/// * `label` - Text drawn at its anchor in the builtin Helvetica face
/// * `region` - Placement of the image in millimetres, top-left origin
///
/// # Returns
/// The serialized document
pub fn compose_document(image: RasterImage, label: &PageLabel<'_>, region: Region) -> Result<Vec<u8>, ExportError> {
    let page_width = region.right().max(label.anchor.x);
    let page_height = region.bottom().max(label.anchor.y);

    let (doc, page, layer) = PdfDocument::new(label.text, Mm(page_width), Mm(page_height), "Layer 1");
    let layer = doc.get_page(page).get_layer(layer);

    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(ExportError::Compose)?;
    layer.use_text(
        label.text,
        label.font_size,
        Mm(label.anchor.x),
        Mm(page_height - label.anchor.y),
        &font,
    );

    let width_px = image.size.width as f32;
    let height_px = image.size.height as f32;
    // dpi maps the surface width onto the region width; scale_y fixes up the height
    let dpi = width_px * MM_PER_INCH / region.w;
    let natural_height = height_px * MM_PER_INCH / dpi;
    let transform = ImageTransform {
        translate_x: Some(Mm(region.x)),
        translate_y: Some(Mm(page_height - region.bottom())),
        dpi: Some(dpi),
        scale_y: Some(region.h / natural_height),
        ..Default::default()
    };

    let xobject = ImageXObject {
        width: Px(image.size.width as usize),
        height: Px(image.size.height as usize),
        color_space: ColorSpace::Rgb,
        bits_per_component: ColorBits::Bit8,
        interpolate: true,
        image_data: image.rgb,
        image_filter: None,
        smask: None,
        clipping_bbox: None,
    };
    Image::from(xobject).add_to_layer(layer.clone(), transform);

    let raw = doc.save_to_bytes().map_err(ExportError::Compose)?;
    let bytes = compress(&raw)?;
    tracing::debug!(raw = raw.len(), bytes = bytes.len(), page_width, page_height, "composed document");
    Ok(bytes)
}

/// Re-encodes every uncompressed stream with Flate
fn compress(raw: &[u8]) -> Result<Vec<u8>, ExportError> {
    let mut doc = lopdf::Document::load_mem(raw).map_err(ExportError::Compress)?;
    doc.compress();

    let mut bytes = Vec::with_capacity(raw.len() / 4);
    doc.save_to(&mut bytes)
        .map_err(|err| ExportError::Compress(err.into()))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::core::SurfaceSize;

    fn blank_image(width: u32, height: u32) -> RasterImage {
        RasterImage {
            size: SurfaceSize::new(width, height),
            rgb: vec![255; (width * height * 3) as usize],
        }
    }

    #[test]
    fn composes_a_pdf() {
        let config = ExportConfig::default();
        let bytes = compose_document(
            blank_image(config.surface.width, config.surface.height),
            &PageLabel::from_config(&config),
            config.image_region,
        )
        .unwrap();

        assert!(bytes.starts_with(b"%PDF-"));
    }

    /// `[a b c d e f]` product of `m` applied after `ctm`
    fn concat(m: [f32; 6], ctm: [f32; 6]) -> [f32; 6] {
        [
            m[0] * ctm[0] + m[1] * ctm[2],
            m[0] * ctm[1] + m[1] * ctm[3],
            m[2] * ctm[0] + m[3] * ctm[2],
            m[2] * ctm[1] + m[3] * ctm[3],
            m[4] * ctm[0] + m[5] * ctm[2] + ctm[4],
            m[4] * ctm[1] + m[5] * ctm[3] + ctm[5],
        ]
    }

    fn number(object: &lopdf::Object) -> f32 {
        match object {
            lopdf::Object::Integer(value) => *value as f32,
            lopdf::Object::Real(value) => *value as f32,
            other => panic!("expected a number, got {other:?}"),
        }
    }

    fn pt(mm: f32) -> f32 {
        mm * 72.0 / MM_PER_INCH
    }

    fn assert_close(actual: f32, expected: f32, what: &str) {
        assert!((actual - expected).abs() < 0.5, "{what}: {actual} != {expected}");
    }

    /// Page layout read back from the serialized document
    struct Layout {
        media_box: Vec<f32>,
        texts: Vec<Vec<u8>>,
        /// Final operand pair of every text positioning operator
        text_positions: Vec<(f32, f32)>,
        /// Transformation in effect at each XObject draw
        draws: Vec<[f32; 6]>,
        images: Vec<lopdf::Stream>,
    }

    fn read_layout(bytes: &[u8]) -> Layout {
        let doc = lopdf::Document::load_mem(bytes).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 1);
        let page_id = *pages.values().next().unwrap();

        let media_box = doc
            .get_object(page_id)
            .and_then(lopdf::Object::as_dict)
            .and_then(|page| page.get(b"MediaBox"))
            .and_then(lopdf::Object::as_array)
            .unwrap()
            .iter()
            .map(number)
            .collect();

        let content = lopdf::content::Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
        let mut texts = Vec::new();
        let mut text_positions = Vec::new();
        let mut draws = Vec::new();
        let mut stack = Vec::new();
        let mut ctm = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];
        for op in &content.operations {
            match op.operator.as_str() {
                "q" => stack.push(ctm),
                "Q" => ctm = stack.pop().unwrap(),
                "cm" => {
                    let m: Vec<f32> = op.operands.iter().map(number).collect();
                    ctm = concat([m[0], m[1], m[2], m[3], m[4], m[5]], ctm);
                }
                "Do" => draws.push(ctm),
                "Td" | "Tm" => {
                    let n = op.operands.len();
                    text_positions.push((number(&op.operands[n - 2]), number(&op.operands[n - 1])));
                }
                "Tj" => {
                    if let lopdf::Object::String(text, _) = &op.operands[0] {
                        texts.push(text.clone());
                    }
                }
                "TJ" => {
                    let parts = op.operands[0].as_array().unwrap();
                    let text: Vec<u8> = parts
                        .iter()
                        .filter_map(|part| match part {
                            lopdf::Object::String(text, _) => Some(text.as_slice()),
                            _ => None,
                        })
                        .flatten()
                        .copied()
                        .collect();
                    texts.push(text);
                }
                _ => {}
            }
        }

        let images = doc
            .objects
            .values()
            .filter_map(|object| match object {
                lopdf::Object::Stream(stream)
                    if stream.dict.get(b"Subtype").and_then(lopdf::Object::as_name).ok() == Some(b"Image".as_slice()) =>
                {
                    Some(stream.clone())
                }
                _ => None,
            })
            .collect();

        Layout {
            media_box,
            texts,
            text_positions,
            draws,
            images,
        }
    }

    fn compose_default() -> (ExportConfig, Vec<u8>) {
        let config = ExportConfig::default();
        let bytes = compose_document(
            blank_image(config.surface.width, config.surface.height),
            &PageLabel::from_config(&config),
            config.image_region,
        )
        .unwrap();
        (config, bytes)
    }

    #[test]
    fn page_carries_the_tree_map_label() {
        let (_, bytes) = compose_default();
        let layout = read_layout(&bytes);

        assert!(layout.texts.iter().any(|text| text == b"Tree Map"), "{:?}", layout.texts);
        // Anchor (10, 10) mm from the top of a 783 mm page
        assert!(
            layout
                .text_positions
                .iter()
                .any(|&(x, y)| (x - pt(10.0)).abs() < 0.5 && (y - pt(773.0)).abs() < 0.5),
            "{:?}",
            layout.text_positions
        );
    }

    #[test]
    fn page_is_sized_to_the_image_region() {
        let (_, bytes) = compose_default();
        let layout = read_layout(&bytes);

        assert_eq!(layout.media_box.len(), 4);
        assert_close(layout.media_box[2] - layout.media_box[0], pt(1020.0), "page width");
        assert_close(layout.media_box[3] - layout.media_box[1], pt(783.0), "page height");
    }

    #[test]
    fn image_fills_the_configured_region() {
        let (config, bytes) = compose_default();
        let layout = read_layout(&bytes);

        assert_eq!(layout.images.len(), 1);
        let image = &layout.images[0];
        assert_eq!(image.dict.get(b"Width").and_then(lopdf::Object::as_i64).unwrap(), 1020);
        assert_eq!(image.dict.get(b"Height").and_then(lopdf::Object::as_i64).unwrap(), 768);

        assert_eq!(layout.draws.len(), 1);
        let [a, _, _, d, e, f] = layout.draws[0];
        let region = config.image_region;
        assert_close(a, pt(region.w), "image width");
        assert_close(d, pt(region.h), "image height");
        assert_close(e, pt(region.x), "image x");
        // Region bottom sits on the page bottom, 15 mm label band above it
        assert_close(f, pt(783.0 - region.bottom()), "image y");
        assert_close(f + d, pt(783.0 - ExportConfig::IMAGE_OFFSET_Y), "image top");
    }

    #[test]
    fn image_placement_follows_a_custom_region() {
        let config = ExportConfig::default();
        let region = Region::new(20.0, 30.0, 400.0, 300.0);
        let bytes = compose_document(blank_image(200, 150), &PageLabel::from_config(&config), region).unwrap();
        let layout = read_layout(&bytes);

        assert_close(layout.media_box[2], pt(420.0), "page width");
        let [a, _, _, d, e, f] = layout.draws[0];
        assert_close(a, pt(400.0), "image width");
        assert_close(d, pt(300.0), "image height");
        assert_close(e, pt(20.0), "image x");
        assert_close(f, 0.0, "image y");
    }

    #[test]
    fn image_stream_is_compressed() {
        let (config, bytes) = compose_default();
        let raw_len = (config.surface.width * config.surface.height * 3) as usize;
        assert!(bytes.len() < raw_len / 10, "{} bytes", bytes.len());

        let layout = read_layout(&bytes);
        let image = &layout.images[0];
        assert_eq!(
            image.dict.get(b"Filter").and_then(lopdf::Object::as_name).unwrap(),
            b"FlateDecode"
        );
        assert_eq!(image.decompressed_content().unwrap().len(), raw_len);
    }

    #[test]
    fn label_comes_from_config() {
        let mut config = ExportConfig::default();
        config.label = "Custom".into();
        config.label_font_size = 12.0;
        let label = PageLabel::from_config(&config);
        assert_eq!(label.text, "Custom");
        assert_eq!(label.font_size, 12.0);
        assert_eq!(label.anchor, Anchor { x: 10.0, y: 10.0 });
    }
}
