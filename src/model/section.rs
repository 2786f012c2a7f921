//! Section and table types.

use super::ImageAsset;
use serde::{Deserialize, Serialize};

/// One heading-, page-, slide- or sheet-delimited unit of content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    /// Heading text, possibly empty
    pub heading: String,

    /// Paragraph text in source order, newline separated
    pub text_content: String,

    /// Tables in source order
    pub tables: Vec<TableBlock>,

    /// Images scoped to this section
    pub images: Vec<ImageAsset>,
}

impl Section {
    /// Create an empty section with a heading.
    pub fn new(heading: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            ..Self::default()
        }
    }

    /// Create a section holding a single block of text.
    pub fn with_text(heading: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            text_content: text.into(),
            ..Self::default()
        }
    }

    /// Append a line of text followed by a newline.
    pub fn push_line(&mut self, line: &str) {
        self.text_content.push_str(line);
        self.text_content.push('\n');
    }

    /// Append a table.
    pub fn add_table(&mut self, table: TableBlock) {
        self.tables.push(table);
    }

    /// Append an image.
    pub fn add_image(&mut self, image: ImageAsset) {
        self.images.push(image);
    }

    /// Retention rule: non-blank text or at least one table.
    pub fn has_content(&self) -> bool {
        !self.text_content.trim().is_empty() || !self.tables.is_empty()
    }

    /// Plain text with the heading on the first line.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        if !self.heading.is_empty() {
            out.push_str(&self.heading);
            out.push('\n');
        }
        out.push_str(self.text_content.trim_end());
        for table in &self.tables {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&table.plain_text());
        }
        out
    }
}

/// A table: first source row as headers, the rest as rows.
///
/// Row lengths are not forced to match the header length.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableBlock {
    /// Header cells
    pub headers: Vec<String>,

    /// Body rows
    pub rows: Vec<Vec<String>>,
}

impl TableBlock {
    /// Create a table from headers and rows.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Split source rows: row 0 becomes the header.
    pub fn from_source_rows(mut source: Vec<Vec<String>>) -> Self {
        if source.is_empty() {
            return Self::default();
        }
        let headers = source.remove(0);
        Self::new(headers, source)
    }

    /// A header-less table holding every row in `rows`.
    pub fn headerless(rows: Vec<Vec<String>>) -> Self {
        Self::new(Vec::new(), rows)
    }

    /// Number of columns (widest of header and rows).
    pub fn column_count(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0)
    }

    /// Check if the table has neither headers nor rows.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.rows.is_empty()
    }

    /// Tab-separated plain text.
    pub fn plain_text(&self) -> String {
        std::iter::once(&self.headers)
            .filter(|h| !h.is_empty())
            .chain(self.rows.iter())
            .map(|row| row.join("\t"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
