//! Text-document adapter built on docx-rs.

use docx_rs::{
    DocumentChild, ParagraphChild, RunChild, Styles, TableCellContent, TableChild, TableRowChild,
};

use super::ooxml::{resolve_target, Package, IMAGE_REL_SUFFIX};
use super::{classifier, FormatAdapter, ParseOptions};
use crate::detect::ensure_ooxml;
use crate::error::{Error, Result};
use crate::model::{DocumentContent, FormatKind, ImageAsset, PositionHint, Section, TableBlock};

const MAIN_PART: &str = "word/document.xml";

/// Adapter for `.docx` (and `.doc` names holding OOXML) files.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocxAdapter;

impl DocxAdapter {
    /// Create a new DOCX adapter.
    pub fn new() -> Self {
        Self
    }
}

impl FormatAdapter for DocxAdapter {
    fn kind(&self) -> FormatKind {
        FormatKind::TextDocument
    }

    fn name(&self) -> &str {
        "docx"
    }

    fn parse_bytes(
        &self,
        data: &[u8],
        title: &str,
        source_path: &str,
        options: &ParseOptions,
    ) -> Result<DocumentContent> {
        ensure_ooxml(data, "doc")?;

        let docx = docx_rs::read_docx(data)
            .map_err(|e| Error::Docx(format!("Failed to parse DOCX: {}", e)))?;

        let mut content = DocumentContent::new(title, source_path, self.kind());
        let mut walker = SectionWalker::new();

        for child in &docx.document.children {
            match child {
                DocumentChild::Paragraph(p) => {
                    let text = paragraph_text(p);
                    let text = text.trim();
                    if text.is_empty() {
                        continue;
                    }
                    if has_heading_style(p, &docx.styles) || classifier::is_heading(text) {
                        walker.heading(text, &mut content);
                    } else {
                        walker.paragraph(text);
                    }
                }
                DocumentChild::Table(t) => walker.table(table_block(t)),
                _ => {}
            }
        }
        walker.finish(&mut content);

        if options.extract_images {
            for image in document_images(data) {
                content.add_image(image);
            }
        }

        Ok(content)
    }
}

/// Where the walker is in the heading structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WalkState {
    /// No heading seen yet; content goes to the untitled lead section.
    AwaitingHeading,
    /// Inside a section opened by a heading.
    InSection,
}

/// Accumulates body blocks into heading-delimited sections.
struct SectionWalker {
    state: WalkState,
    current: Section,
}

impl SectionWalker {
    fn new() -> Self {
        Self {
            state: WalkState::AwaitingHeading,
            current: Section::default(),
        }
    }

    fn heading(&mut self, text: &str, content: &mut DocumentContent) {
        self.flush(content);
        self.current = Section::new(text);
        self.state = WalkState::InSection;
    }

    fn paragraph(&mut self, text: &str) {
        self.current.push_line(text);
    }

    fn table(&mut self, table: TableBlock) {
        self.current.add_table(table);
    }

    /// Hand the in-progress section to `content` if it has content.
    fn flush(&mut self, content: &mut DocumentContent) {
        let section = std::mem::take(&mut self.current);
        if !content.push_section(section) && self.state == WalkState::InSection {
            log::debug!("Dropping empty section");
        }
    }

    fn finish(mut self, content: &mut DocumentContent) {
        self.flush(content);
    }
}

/// Heading styles are matched by name; localized Word writes numeric style ids.
fn has_heading_style(p: &docx_rs::Paragraph, styles: &Styles) -> bool {
    let Some(style) = p.property.style.as_ref() else {
        return false;
    };
    match styles.find_style_by_id(&style.val) {
        Some(def) => def.name.is_heading(),
        None => style.val.to_lowercase().starts_with("heading"),
    }
}

fn paragraph_text(p: &docx_rs::Paragraph) -> String {
    let mut text = String::new();
    for child in &p.children {
        match child {
            ParagraphChild::Run(r) => push_run_text(r, &mut text),
            ParagraphChild::Hyperlink(h) => {
                for child in &h.children {
                    if let ParagraphChild::Run(r) = child {
                        push_run_text(r, &mut text);
                    }
                }
            }
            _ => {}
        }
    }
    text
}

fn push_run_text(run: &docx_rs::Run, out: &mut String) {
    for child in &run.children {
        match child {
            RunChild::Text(t) => out.push_str(&t.text),
            RunChild::Tab(_) => out.push('\t'),
            RunChild::Break(_) => out.push('\n'),
            _ => {}
        }
    }
}

fn table_block(t: &docx_rs::Table) -> TableBlock {
    let rows = t
        .rows
        .iter()
        .map(|row| {
            let TableChild::TableRow(r) = row;
            r.cells
                .iter()
                .map(|cell| {
                    let TableRowChild::TableCell(c) = cell;
                    c.children
                        .iter()
                        .filter_map(|child| match child {
                            TableCellContent::Paragraph(p) => Some(paragraph_text(p)),
                            _ => None,
                        })
                        .collect::<Vec<_>>()
                        .join("\n")
                        .trim()
                        .to_string()
                })
                .collect()
        })
        .collect();
    TableBlock::from_source_rows(rows)
}

/// Image parts referenced from the main document part, in relationship order.
///
/// Failures are logged and yield fewer images, never an error.
fn document_images(data: &[u8]) -> Vec<ImageAsset> {
    let mut package = match Package::open(data) {
        Ok(p) => p,
        Err(e) => {
            log::warn!("Cannot reopen package for images: {}", e);
            return Vec::new();
        }
    };
    collect_images(&mut package)
}

fn collect_images(package: &mut Package<'_>) -> Vec<ImageAsset> {
    let rels = match package.relationships(MAIN_PART) {
        Ok(rels) => rels,
        Err(e) => {
            log::warn!("Cannot read document relationships: {}", e);
            return Vec::new();
        }
    };

    let mut images = Vec::new();
    for rel in rels
        .iter()
        .filter(|r| r.is_type(IMAGE_REL_SUFFIX) && !r.external)
    {
        let part = resolve_target(MAIN_PART, &rel.target);
        match package.read_bytes(&part) {
            Ok(bytes) => images.push(ImageAsset::sniffed(
                bytes,
                &rel.target_extension(),
                PositionHint::RelationId(rel.id.clone()),
            )),
            Err(e) => log::warn!("Dropping image {}: {}", rel.id, e),
        }
    }
    images
}
