//! Format detection from file extensions and magic bytes.

use crate::error::{Error, Result};
use crate::model::FormatKind;
use std::path::Path;

/// Static lookup table from lowercase extension to format kind.
const EXTENSION_TABLE: &[(&str, FormatKind)] = &[
    ("docx", FormatKind::TextDocument),
    ("doc", FormatKind::TextDocument),
    ("pdf", FormatKind::PaginatedDocument),
    ("xlsx", FormatKind::TabularWorkbook),
    ("xls", FormatKind::TabularWorkbook),
    ("pptx", FormatKind::SlideDeck),
    ("ppt", FormatKind::SlideDeck),
];

/// Container signature found at the start of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signature {
    /// ZIP package (OOXML: docx, xlsx, pptx)
    Zip,
    /// PDF header `%PDF-`
    Pdf,
    /// OLE compound file (legacy doc, xls, ppt)
    Ole,
    /// Anything else
    Unknown,
}

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const ZIP_EMPTY_MAGIC: &[u8] = b"PK\x05\x06";
const PDF_MAGIC: &[u8] = b"%PDF-";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Look up the format kind for an extension (with or without leading dot).
pub fn format_from_extension(ext: &str) -> Option<FormatKind> {
    let ext = ext.trim_start_matches('.').to_lowercase();
    EXTENSION_TABLE
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, kind)| *kind)
}

/// Look up the format kind for a path by its extension.
///
/// # Returns
/// * `Ok(FormatKind)` if the extension is supported
/// * `Err(Error::UnsupportedFormat)` otherwise
pub fn format_from_path<P: AsRef<Path>>(path: P) -> Result<FormatKind> {
    let ext = path
        .as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();

    format_from_extension(ext).ok_or_else(|| Error::UnsupportedFormat(ext.to_lowercase()))
}

/// All extensions with an adapter, lowercase without dot.
pub fn supported_extensions() -> impl Iterator<Item = &'static str> {
    EXTENSION_TABLE.iter().map(|(ext, _)| *ext)
}

/// Sniff the container signature from the first bytes of a file.
pub fn detect_signature(data: &[u8]) -> Signature {
    if data.starts_with(ZIP_MAGIC) || data.starts_with(ZIP_EMPTY_MAGIC) {
        Signature::Zip
    } else if data.starts_with(PDF_MAGIC) {
        Signature::Pdf
    } else if data.starts_with(OLE_MAGIC) {
        Signature::Ole
    } else {
        Signature::Unknown
    }
}

/// Fail early when an OOXML adapter is handed a legacy OLE file.
pub(crate) fn ensure_ooxml(data: &[u8], label: &str) -> Result<()> {
    match detect_signature(data) {
        Signature::Zip => Ok(()),
        Signature::Ole => Err(Error::LegacyFormat(label.to_string())),
        _ => Err(Error::Package(format!("{} is not a zip package", label))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_lookup() {
        assert_eq!(format_from_extension("docx"), Some(FormatKind::TextDocument));
        assert_eq!(format_from_extension(".PDF"), Some(FormatKind::PaginatedDocument));
        assert_eq!(format_from_extension("xls"), Some(FormatKind::TabularWorkbook));
        assert_eq!(format_from_extension("ppt"), Some(FormatKind::SlideDeck));
        assert_eq!(format_from_extension("txt"), None);
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            format_from_path("a/b/report.XLSX").unwrap(),
            FormatKind::TabularWorkbook
        );
        let err = format_from_path("notes.md").unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(ref e) if e == "md"));
        assert!(format_from_path("no_extension").is_err());
    }

    #[test]
    fn test_detect_signature() {
        assert_eq!(detect_signature(b"PK\x03\x04rest"), Signature::Zip);
        assert_eq!(detect_signature(b"%PDF-1.7\n"), Signature::Pdf);
        assert_eq!(detect_signature(OLE_MAGIC), Signature::Ole);
        assert_eq!(detect_signature(b""), Signature::Unknown);
    }

    #[test]
    fn test_ensure_ooxml() {
        assert!(ensure_ooxml(b"PK\x03\x04", "docx").is_ok());
        assert!(matches!(
            ensure_ooxml(OLE_MAGIC, "doc"),
            Err(Error::LegacyFormat(_))
        ));
        assert!(matches!(
            ensure_ooxml(b"garbage", "docx"),
            Err(Error::Package(_))
        ));
    }

    #[test]
    fn test_supported_extensions() {
        let exts: Vec<_> = supported_extensions().collect();
        assert_eq!(exts.len(), 7);
        assert!(exts.contains(&"pptx"));
    }
}
