//! OOXML package helpers: zip parts and relationship files.

use std::io::{Cursor, Read};

use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use zip::ZipArchive;

use crate::error::{Error, Result};

/// Relationship type suffix for images.
pub const IMAGE_REL_SUFFIX: &str = "/image";

/// Relationship type suffix for slides.
pub const SLIDE_REL_SUFFIX: &str = "/slide";

/// An open OOXML package backed by an in-memory buffer.
pub struct Package<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
}

impl<'a> Package<'a> {
    /// Open a package from bytes.
    pub fn open(data: &'a [u8]) -> Result<Self> {
        let archive = ZipArchive::new(Cursor::new(data))?;
        Ok(Self { archive })
    }

    /// Check whether a part exists.
    pub fn has_part(&mut self, name: &str) -> bool {
        self.archive.by_name(name).is_ok()
    }

    /// Read a part as bytes.
    pub fn read_bytes(&mut self, name: &str) -> Result<Vec<u8>> {
        let mut file = self
            .archive
            .by_name(name)
            .map_err(|_| Error::MissingPart(name.to_string()))?;
        let mut data = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Read a part as UTF-8 text.
    pub fn read_string(&mut self, name: &str) -> Result<String> {
        let bytes = self.read_bytes(name)?;
        String::from_utf8(bytes).map_err(|e| Error::Xml(format!("{}: {}", name, e)))
    }

    /// Read the relationships of `part`, or an empty list when it has none.
    pub fn relationships(&mut self, part: &str) -> Result<Vec<Relationship>> {
        let rels = rels_path_for(part);
        if !self.has_part(&rels) {
            return Ok(Vec::new());
        }
        let xml = self.read_string(&rels)?;
        parse_relationships(&xml)
    }
}

/// One `<Relationship>` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship id, e.g. "rId3"
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target as written in the file
    pub target: String,
    /// `TargetMode="External"`
    pub external: bool,
}

impl Relationship {
    /// Whether the relationship type URI ends with `suffix`.
    pub fn is_type(&self, suffix: &str) -> bool {
        self.rel_type.ends_with(suffix)
    }

    /// Lowercase extension of the target, e.g. "png".
    pub fn target_extension(&self) -> String {
        self.target
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default()
    }
}

/// Parse a `.rels` part, keeping file order.
pub fn parse_relationships(xml: &str) -> Result<Vec<Relationship>> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut rels = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) | Event::Empty(ref e) if e.name().as_ref() == b"Relationship" => {
                let id = attr_value(e, b"Id").unwrap_or_default();
                let target = attr_value(e, b"Target").unwrap_or_default();
                if !id.is_empty() && !target.is_empty() {
                    rels.push(Relationship {
                        id,
                        rel_type: attr_value(e, b"Type").unwrap_or_default(),
                        target,
                        external: attr_value(e, b"TargetMode").as_deref() == Some("External"),
                    });
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(rels)
}

/// Value of the attribute with the exact qualified name `key`.
///
/// OOXML parts are UTF-8, so the raw value is unescaped directly.
pub fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    let attr = e
        .attributes()
        .filter_map(|a| a.ok())
        .find(|a| a.key.as_ref() == key)?;
    let raw = std::str::from_utf8(&attr.value).ok()?;
    unescape(raw).ok().map(|v| v.into_owned())
}

/// `ppt/slides/slide1.xml` → `ppt/slides/_rels/slide1.xml.rels`.
pub fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target against the directory of its source part.
///
/// `resolve_target("ppt/slides/slide1.xml", "../media/image1.png")` gives
/// `ppt/media/image1.png`. Absolute targets drop the leading slash.
pub fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = match source_part.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.join("/")
}

/// Write `parts` into an in-memory zip package.
#[cfg(test)]
pub(crate) fn build_package(parts: &[(&str, &[u8])]) -> Vec<u8> {
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in parts {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_reads_parts() {
        let data = build_package(&[("word/document.xml", b"<w:document/>")]);
        let mut package = Package::open(&data).unwrap();
        assert!(package.has_part("word/document.xml"));
        assert!(!package.has_part("word/styles.xml"));
        assert_eq!(package.read_string("word/document.xml").unwrap(), "<w:document/>");
        assert!(matches!(
            package.read_bytes("word/missing.xml"),
            Err(Error::MissingPart(_))
        ));
        assert!(package.relationships("word/document.xml").unwrap().is_empty());
    }

    const RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
  <Relationship Id="rId5" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/image1.PNG"/>
  <Relationship Id="rId6" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="http://example.com/a.png" TargetMode="External"/>
</Relationships>"#;

    #[test]
    fn test_parse_relationships() {
        let rels = parse_relationships(RELS).unwrap();
        assert_eq!(rels.len(), 3);
        assert_eq!(rels[1].id, "rId5");
        assert!(rels[1].is_type(IMAGE_REL_SUFFIX));
        assert!(!rels[0].is_type(IMAGE_REL_SUFFIX));
        assert_eq!(rels[1].target_extension(), "png");
        assert!(rels[2].external);
        assert!(!rels[1].external);
    }

    #[test]
    fn test_attr_value_unescapes() {
        let xml = r#"<Relationship Id="rId9" Target="media/a&amp;b.png"/>"#;
        let mut reader = Reader::from_str(xml);
        let Event::Empty(e) = reader.read_event().unwrap() else {
            panic!("expected an empty element");
        };
        assert_eq!(attr_value(&e, b"Id").as_deref(), Some("rId9"));
        assert_eq!(attr_value(&e, b"Target").as_deref(), Some("media/a&b.png"));
        assert_eq!(attr_value(&e, b"Type"), None);
    }

    #[test]
    fn test_rels_path_for() {
        assert_eq!(
            rels_path_for("ppt/slides/slide1.xml"),
            "ppt/slides/_rels/slide1.xml.rels"
        );
        assert_eq!(rels_path_for("word/document.xml"), "word/_rels/document.xml.rels");
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(
            resolve_target("ppt/slides/slide1.xml", "../media/image1.png"),
            "ppt/media/image1.png"
        );
        assert_eq!(
            resolve_target("word/document.xml", "media/image2.jpeg"),
            "word/media/image2.jpeg"
        );
        assert_eq!(
            resolve_target("ppt/presentation.xml", "/ppt/slides/slide3.xml"),
            "ppt/slides/slide3.xml"
        );
    }

    #[test]
    fn test_open_rejects_garbage() {
        assert!(Package::open(b"definitely not a zip").is_err());
    }
}
