//! Synthesized question/answer records.

use serde::{Deserialize, Serialize};

/// Which content path produced a Q&A pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QaKind {
    /// Derived from section text
    Text,
    /// Derived from a table
    Table,
    /// Derived from an image
    Image,
}

impl std::fmt::Display for QaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QaKind::Text => write!(f, "text"),
            QaKind::Table => write!(f, "table"),
            QaKind::Image => write!(f, "image"),
        }
    }
}

/// A single synthesized knowledge unit. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QaPair {
    /// Generalized question
    pub question: String,

    /// Enhanced answer
    pub answer: String,

    /// Deduplicated keywords
    pub keywords: Vec<String>,

    /// Provenance, `文档来源：<title>`
    pub source: String,

    /// Content path
    pub kind: QaKind,

    /// Image payload, only for image pairs
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "crate::model::base64_opt"
    )]
    pub image_data: Option<Vec<u8>>,

    /// Image format, only for image pairs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_format: Option<String>,
}

impl QaPair {
    /// Create a text or table pair. Keywords are deduplicated in order.
    pub fn new(
        kind: QaKind,
        question: impl Into<String>,
        answer: impl Into<String>,
        keywords: Vec<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            keywords: dedup_preserving_order(keywords),
            source: source.into(),
            kind,
            image_data: None,
            image_format: None,
        }
    }

    /// Attach an image payload and mark the pair as an image pair.
    pub fn with_image(mut self, data: Vec<u8>, format: impl Into<String>) -> Self {
        self.kind = QaKind::Image;
        self.image_data = Some(data);
        self.image_format = Some(format.into());
        self
    }

    /// Whether this pair carries an image payload.
    pub fn has_image(&self) -> bool {
        self.kind == QaKind::Image && self.image_data.is_some()
    }
}

fn dedup_preserving_order(values: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    values
        .into_iter()
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_deduplicated() {
        let qa = QaPair::new(
            QaKind::Table,
            "q",
            "a",
            vec!["A".into(), "B".into(), "A".into()],
            "文档来源：t",
        );
        assert_eq!(qa.keywords, vec!["A".to_string(), "B".to_string()]);
        assert!(!qa.has_image());
    }

    #[test]
    fn test_image_fields_serialization() {
        let text = QaPair::new(QaKind::Text, "q", "a", Vec::new(), "s");
        let json = serde_json::to_string(&text).unwrap();
        assert!(!json.contains("imageData"));
        assert!(json.contains("\"kind\":\"text\""));

        let image = QaPair::new(QaKind::Text, "q", "a", Vec::new(), "s").with_image(vec![0xFF], "png");
        assert!(image.has_image());
        let json = serde_json::to_string(&image).unwrap();
        assert!(json.contains("\"imageData\":\"/w==\""));
        assert!(json.contains("\"imageFormat\":\"png\""));

        let back: QaPair = serde_json::from_str(&json).unwrap();
        assert_eq!(back, image);
    }
}
