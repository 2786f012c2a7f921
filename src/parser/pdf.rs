//! Paginated-document adapter built on lopdf.

use std::collections::HashSet;
use std::io::Cursor;

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId, Stream};

use super::{ErrorMode, FormatAdapter, ParseOptions};
use crate::error::{Error, Result};
use crate::model::{DocumentContent, FormatKind, ImageAsset, PositionHint, Section};

/// Adapter for `.pdf` files. One section per page.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfAdapter;

impl PdfAdapter {
    /// Create a new PDF adapter.
    pub fn new() -> Self {
        Self
    }
}

impl FormatAdapter for PdfAdapter {
    fn kind(&self) -> FormatKind {
        FormatKind::PaginatedDocument
    }

    fn name(&self) -> &str {
        "pdf"
    }

    fn parse_bytes(
        &self,
        data: &[u8],
        title: &str,
        source_path: &str,
        options: &ParseOptions,
    ) -> Result<DocumentContent> {
        let doc = LopdfDocument::load_mem(data)?;
        let mut content = DocumentContent::new(title, source_path, self.kind());

        for (page_num, page_id) in doc.get_pages() {
            match doc.extract_text(&[page_num]) {
                Ok(text) => {
                    content.push_section(Section::with_text(format!("第{}页", page_num), text));
                }
                Err(e) => match options.error_mode {
                    ErrorMode::Strict => {
                        return Err(Error::TextExtract(format!("Page {}: {}", page_num, e)));
                    }
                    ErrorMode::Lenient => {
                        log::warn!("{}: skipping text of page {}: {}", title, page_num, e);
                    }
                },
            }

            if options.extract_images {
                for image in page_images(&doc, page_id, page_num) {
                    content.add_image(image);
                }
            }
        }

        log::debug!(
            "{}: {} pages kept, {} images",
            title,
            content.sections.len(),
            content.images.len()
        );
        Ok(content)
    }
}

/// Decodable image XObjects of one page, re-encoded as PNG.
fn page_images(doc: &LopdfDocument, page_id: ObjectId, page_num: u32) -> Vec<ImageAsset> {
    let mut images = Vec::new();

    for (name, obj_ref) in page_xobjects(doc, page_id) {
        let Ok(stream) = doc.get_object(obj_ref).and_then(Object::as_stream) else {
            continue;
        };
        if !is_image(&stream.dict) {
            continue;
        }

        match decode_image(doc, stream) {
            Ok(png) => images.push(ImageAsset::png(png, PositionHint::PageNumber(page_num))),
            Err(e) => log::warn!(
                "Page {}: dropping image {}: {}",
                page_num,
                String::from_utf8_lossy(&name),
                e
            ),
        }
    }

    images
}

/// XObject references visible to a page, walking `/Parent` so that resources
/// inherited from `/Pages` nodes are included. The nearest name wins.
fn page_xobjects(doc: &LopdfDocument, page_id: ObjectId) -> Vec<(Vec<u8>, ObjectId)> {
    let mut found: Vec<(Vec<u8>, ObjectId)> = Vec::new();
    let mut visited = HashSet::new();
    let mut node_id = Some(page_id);

    while let Some(id) = node_id {
        if !visited.insert(id) {
            log::warn!("Page tree cycle at object {:?}", id);
            break;
        }
        let Ok(node) = doc.get_dictionary(id) else {
            break;
        };
        let xobjects = node
            .get(b"Resources")
            .ok()
            .and_then(|r| resolve_dict(doc, r))
            .and_then(|res| res.get(b"XObject").ok())
            .and_then(|x| resolve_dict(doc, x));
        if let Some(xobjects) = xobjects {
            for (name, obj) in xobjects.iter() {
                let Ok(obj_ref) = obj.as_reference() else {
                    continue;
                };
                if found.iter().any(|(n, r)| n == name || *r == obj_ref) {
                    continue;
                }
                found.push((name.clone(), obj_ref));
            }
        }
        node_id = node.get(b"Parent").and_then(Object::as_reference).ok();
    }

    found
}

fn resolve_dict<'a>(doc: &'a LopdfDocument, obj: &'a Object) -> Option<&'a Dictionary> {
    match obj {
        Object::Reference(r) => doc.get_dictionary(*r).ok(),
        Object::Dictionary(d) => Some(d),
        _ => None,
    }
}

fn is_image(dict: &Dictionary) -> bool {
    matches!(
        dict.get(b"Subtype").and_then(Object::as_name_str),
        Ok("Image")
    )
}

/// Stream filters in application order.
fn filter_names(dict: &Dictionary) -> Vec<String> {
    match dict.get(b"Filter") {
        Ok(Object::Name(n)) => vec![String::from_utf8_lossy(n).into_owned()],
        Ok(Object::Array(arr)) => arr
            .iter()
            .filter_map(|o| o.as_name_str().ok())
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    }
}

/// Color components of the image's color space, if it is one we can decode.
fn color_components(doc: &LopdfDocument, dict: &Dictionary) -> Option<u8> {
    let cs = dict.get(b"ColorSpace").ok()?;
    let cs = match cs {
        Object::Reference(r) => doc.get_object(*r).ok()?,
        other => other,
    };

    match cs {
        Object::Name(n) => components_for_name(&String::from_utf8_lossy(n)),
        Object::Array(arr) => {
            let family = arr.first()?.as_name_str().ok()?;
            match family {
                "ICCBased" => {
                    let profile = doc.get_object(arr.get(1)?.as_reference().ok()?).ok()?;
                    let n = profile.as_stream().ok()?.dict.get(b"N").ok()?.as_i64().ok()?;
                    match n {
                        1 => Some(1),
                        3 => Some(3),
                        _ => None,
                    }
                }
                other => components_for_name(other),
            }
        }
        _ => None,
    }
}

fn components_for_name(name: &str) -> Option<u8> {
    match name {
        "DeviceGray" | "CalGray" => Some(1),
        "DeviceRGB" | "CalRGB" => Some(3),
        _ => None,
    }
}

fn decode_image(doc: &LopdfDocument, stream: &Stream) -> Result<Vec<u8>> {
    let dict = &stream.dict;

    if matches!(dict.get(b"ImageMask").and_then(Object::as_bool), Ok(true)) {
        return Err(Error::ImageExtract("stencil masks are not supported".to_string()));
    }

    let filters = filter_names(dict);
    let components = color_components(doc, dict);

    match filters.as_slice() {
        [f] if f == "DCTDecode" => {
            if components.is_none() {
                return Err(Error::ImageExtract(
                    "unsupported JPEG color space".to_string(),
                ));
            }
            reencode_jpeg(&stream.content)
        }
        [] | [_] if filters.iter().all(|f| f == "FlateDecode") => {
            let components = components
                .ok_or_else(|| Error::ImageExtract("unsupported color space".to_string()))?;
            let bits = dict.get(b"BitsPerComponent").and_then(Object::as_i64).unwrap_or(8);
            if bits != 8 {
                return Err(Error::ImageExtract(format!(
                    "{} bits per component is not supported",
                    bits
                )));
            }
            let width = dimension(dict, b"Width")?;
            let height = dimension(dict, b"Height")?;
            let pixels = if filters.is_empty() {
                stream.content.clone()
            } else {
                stream.decompressed_content()?
            };
            encode_raw_pixels(width, height, components, pixels)
        }
        _ => Err(Error::ImageExtract(format!(
            "unsupported filter {:?}",
            filters
        ))),
    }
}

fn dimension(dict: &Dictionary, key: &[u8]) -> Result<u32> {
    dict.get(key)
        .and_then(Object::as_i64)
        .ok()
        .and_then(|v| u32::try_from(v).ok())
        .filter(|v| *v > 0)
        .ok_or_else(|| {
            Error::ImageExtract(format!("missing {}", String::from_utf8_lossy(key)))
        })
}

/// Decode a JPEG payload and re-encode it as PNG.
pub(crate) fn reencode_jpeg(data: &[u8]) -> Result<Vec<u8>> {
    let img = image::load_from_memory_with_format(data, ImageFormat::Jpeg)?;
    to_png(&img)
}

/// Wrap raw 8-bit gray or RGB samples into a PNG.
pub(crate) fn encode_raw_pixels(
    width: u32,
    height: u32,
    components: u8,
    mut pixels: Vec<u8>,
) -> Result<Vec<u8>> {
    let expected = width as usize * height as usize * components as usize;
    if pixels.len() < expected {
        return Err(Error::ImageExtract(format!(
            "expected {} bytes of samples, found {}",
            expected,
            pixels.len()
        )));
    }
    pixels.truncate(expected);

    let img = match components {
        1 => GrayImage::from_raw(width, height, pixels).map(DynamicImage::ImageLuma8),
        3 => RgbImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgb8),
        _ => None,
    }
    .ok_or_else(|| Error::ImageExtract("invalid sample buffer".to_string()))?;

    to_png(&img)
}

fn to_png(img: &DynamicImage) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}
