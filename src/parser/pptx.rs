//! Slide-deck adapter reading the PresentationML package directly.

use std::collections::HashMap;

use quick_xml::events::Event;
use quick_xml::Reader;

use super::ooxml::{attr_value, resolve_target, Package, SLIDE_REL_SUFFIX};
use super::{FormatAdapter, ParseOptions};
use crate::detect::ensure_ooxml;
use crate::error::Result;
use crate::model::{DocumentContent, FormatKind, ImageAsset, PositionHint, Section};

const PRESENTATION_PART: &str = "ppt/presentation.xml";

/// Adapter for `.pptx` (and `.ppt` names holding OOXML) files.
#[derive(Debug, Default, Clone, Copy)]
pub struct PptxAdapter;

impl PptxAdapter {
    /// Create a new slide-deck adapter.
    pub fn new() -> Self {
        Self
    }
}

impl FormatAdapter for PptxAdapter {
    fn kind(&self) -> FormatKind {
        FormatKind::SlideDeck
    }

    fn name(&self) -> &str {
        "pptx"
    }

    fn parse_bytes(
        &self,
        data: &[u8],
        title: &str,
        source_path: &str,
        options: &ParseOptions,
    ) -> Result<DocumentContent> {
        ensure_ooxml(data, "ppt")?;

        let mut package = Package::open(data)?;
        let mut content = DocumentContent::new(title, source_path, self.kind());

        for (index, part) in slide_parts(&mut package)?.iter().enumerate() {
            let slide_num = index as u32 + 1;
            let shapes = parse_slide(&package.read_string(part)?)?;

            let mut section = Section::with_text(format!("幻灯片 {}", slide_num), shapes.text);
            if options.extract_images && !shapes.picture_rels.is_empty() {
                for image in slide_images(&mut package, part, &shapes.picture_rels, slide_num) {
                    section.add_image(image.clone());
                    content.add_image(image);
                }
            }

            if !content.push_section(section) {
                log::debug!("{}: slide {} has no text", title, slide_num);
            }
        }

        Ok(content)
    }
}

/// Slide part names in presentation order.
fn slide_parts(package: &mut Package<'_>) -> Result<Vec<String>> {
    let xml = package.read_string(PRESENTATION_PART)?;
    let targets: HashMap<String, String> = package
        .relationships(PRESENTATION_PART)?
        .into_iter()
        .filter(|r| r.is_type(SLIDE_REL_SUFFIX))
        .map(|r| (r.id, r.target))
        .collect();

    Ok(slide_ids(&xml)?
        .iter()
        .filter_map(|id| targets.get(id))
        .map(|target| resolve_target(PRESENTATION_PART, target))
        .collect())
}

/// `r:id` of every `p:sldId`, in document order.
fn slide_ids(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut ids = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) | Event::Empty(ref e) if e.local_name().as_ref() == b"sldId" => {
                if let Some(id) = attr_value(e, b"r:id") {
                    ids.push(id);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(ids)
}

/// Text and picture references of one slide's top-level shapes.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct SlideShapes {
    /// Each text shape's text followed by a newline
    pub text: String,
    /// `r:embed` ids of top-level pictures
    pub picture_rels: Vec<String>,
}

/// Read the top-level shapes of a slide. Group contents are not visited.
pub(crate) fn parse_slide(xml: &str) -> Result<SlideShapes> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut shapes = SlideShapes::default();

    let mut group_depth = 0usize;
    let mut in_shape = false;
    let mut in_picture = false;
    let mut in_text = false;
    let mut has_text_body = false;
    let mut paragraphs: Vec<String> = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"grpSp" => group_depth += 1,
                b"sp" if group_depth == 0 => {
                    in_shape = true;
                    has_text_body = false;
                    paragraphs.clear();
                }
                b"pic" if group_depth == 0 => in_picture = true,
                b"txBody" if in_shape => has_text_body = true,
                b"p" if in_shape => paragraphs.push(String::new()),
                b"t" if in_shape => in_text = true,
                b"br" if in_shape => push_to_last(&mut paragraphs, "\n"),
                b"blip" if in_picture => {
                    if let Some(id) = attr_value(e, b"r:embed") {
                        shapes.picture_rels.push(id);
                    }
                }
                _ => {}
            },
            Event::Empty(ref e) => match e.local_name().as_ref() {
                b"p" if in_shape => paragraphs.push(String::new()),
                b"br" if in_shape => push_to_last(&mut paragraphs, "\n"),
                b"blip" if in_picture => {
                    if let Some(id) = attr_value(e, b"r:embed") {
                        shapes.picture_rels.push(id);
                    }
                }
                _ => {}
            },
            Event::Text(ref e) if in_text => {
                let text = e.unescape()?;
                push_to_last(&mut paragraphs, &text);
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"grpSp" => group_depth = group_depth.saturating_sub(1),
                b"t" => in_text = false,
                b"sp" if in_shape => {
                    if has_text_body {
                        shapes.text.push_str(&paragraphs.join("\n"));
                        shapes.text.push('\n');
                    }
                    in_shape = false;
                }
                b"pic" if in_picture => in_picture = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(shapes)
}

fn push_to_last(paragraphs: &mut Vec<String>, text: &str) {
    match paragraphs.last_mut() {
        Some(last) => last.push_str(text),
        None => paragraphs.push(text.to_string()),
    }
}

/// Resolve picture relationships of a slide to image assets.
fn slide_images(
    package: &mut Package<'_>,
    slide_part: &str,
    picture_rels: &[String],
    slide_num: u32,
) -> Vec<ImageAsset> {
    let rels = match package.relationships(slide_part) {
        Ok(rels) => rels,
        Err(e) => {
            log::warn!("Slide {}: cannot read relationships: {}", slide_num, e);
            return Vec::new();
        }
    };

    let mut images = Vec::new();
    for id in picture_rels {
        let Some(rel) = rels.iter().find(|r| &r.id == id && !r.external) else {
            log::warn!("Slide {}: picture {} has no target", slide_num, id);
            continue;
        };
        let part = resolve_target(slide_part, &rel.target);
        match package.read_bytes(&part) {
            Ok(bytes) => images.push(ImageAsset::sniffed(
                bytes,
                &rel.target_extension(),
                PositionHint::SlideNumber(slide_num),
            )),
            Err(e) => log::warn!("Slide {}: dropping picture {}: {}", slide_num, id, e),
        }
    }
    images
}
