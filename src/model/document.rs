//! Document-level types.

use super::{ImageAsset, Section};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which adapter family produced a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormatKind {
    /// Word-processor document (docx, doc)
    TextDocument,
    /// Paginated document (pdf)
    PaginatedDocument,
    /// Spreadsheet workbook (xlsx, xls)
    TabularWorkbook,
    /// Presentation (pptx, ppt)
    SlideDeck,
}

impl std::fmt::Display for FormatKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatKind::TextDocument => write!(f, "text-document"),
            FormatKind::PaginatedDocument => write!(f, "paginated-document"),
            FormatKind::TabularWorkbook => write!(f, "tabular-workbook"),
            FormatKind::SlideDeck => write!(f, "slide-deck"),
        }
    }
}

/// The normalized content of one source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentContent {
    /// Display name, derived from the file stem
    pub title: String,

    /// Original file identifier
    pub source_path: String,

    /// Adapter family
    pub kind: FormatKind,

    /// Sections in document/page/slide/sheet order
    pub sections: Vec<Section>,

    /// Images not bound to a retained section
    pub images: Vec<ImageAsset>,
}

impl DocumentContent {
    /// Create an empty document.
    pub fn new(title: impl Into<String>, source_path: impl Into<String>, kind: FormatKind) -> Self {
        Self {
            title: title.into(),
            source_path: source_path.into(),
            kind,
            sections: Vec::new(),
            images: Vec::new(),
        }
    }

    /// Create an empty document whose title is the file stem of `path`.
    pub fn for_path(path: &Path, kind: FormatKind) -> Self {
        let title = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::new(title, path.to_string_lossy(), kind)
    }

    /// Append a section when it has content, per the retention rule.
    ///
    /// Returns whether the section was kept.
    pub fn push_section(&mut self, section: Section) -> bool {
        if section.has_content() {
            self.sections.push(section);
            true
        } else {
            false
        }
    }

    /// Append a section unconditionally (workbook sheets).
    pub fn push_section_unchecked(&mut self, section: Section) {
        self.sections.push(section);
    }

    /// Append a document-level image.
    pub fn add_image(&mut self, image: ImageAsset) {
        self.images.push(image);
    }

    /// Provenance string shared by every Q&A pair derived from this document.
    pub fn source_label(&self) -> String {
        format!("文档来源：{}", self.title)
    }

    /// Number of tables across all sections.
    pub fn table_count(&self) -> usize {
        self.sections.iter().map(|s| s.tables.len()).sum()
    }

    /// Check if nothing was extracted.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty() && self.images.is_empty()
    }

    /// Plain text of every section, headings included.
    pub fn plain_text(&self) -> String {
        self.sections
            .iter()
            .map(|s| s.plain_text())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_path_uses_stem() {
        let doc = DocumentContent::for_path(Path::new("in/报告 2024.docx"), FormatKind::TextDocument);
        assert_eq!(doc.title, "报告 2024");
        assert_eq!(doc.source_path, "in/报告 2024.docx");
        assert_eq!(doc.source_label(), "文档来源：报告 2024");
        assert!(doc.is_empty());
    }

    #[test]
    fn test_push_section_retention() {
        let mut doc = DocumentContent::new("t", "t.docx", FormatKind::TextDocument);
        assert!(!doc.push_section(Section::new("空")));

        let mut with_text = Section::new("有内容");
        with_text.push_line("正文");
        assert!(doc.push_section(with_text));

        doc.push_section_unchecked(Section::new("工作表: Sheet1"));
        assert_eq!(doc.sections.len(), 2);
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&FormatKind::SlideDeck).unwrap();
        assert_eq!(json, "\"slide-deck\"");
        assert_eq!(FormatKind::TabularWorkbook.to_string(), "tabular-workbook");
    }
}
