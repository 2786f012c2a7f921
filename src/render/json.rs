//! JSON rendering of synthesized Q&A records.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{DocumentContent, QaPair};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// The per-file JSON payload: source path, pairs and the normalized content.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QaRecord<'a> {
    /// Source file path
    pub original_file: &'a str,
    /// Synthesized pairs in order
    pub qa_pairs: &'a [QaPair],
    /// Normalized content the pairs were derived from
    pub raw_content: &'a DocumentContent,
}

impl<'a> QaRecord<'a> {
    /// Bundle the pairs of `content`.
    pub fn new(content: &'a DocumentContent, qa_pairs: &'a [QaPair]) -> Self {
        Self {
            original_file: &content.source_path,
            qa_pairs,
            raw_content: content,
        }
    }
}

/// Serialize a record. Non-ASCII text is written unescaped.
pub fn to_json(record: &QaRecord<'_>, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(record),
        JsonFormat::Compact => serde_json::to_string(record),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}
