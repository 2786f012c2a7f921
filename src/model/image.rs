//! Embedded image assets.

use serde::{Deserialize, Serialize};

/// An image carried as an opaque binary blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAsset {
    /// Raw binary payload (base64 when serialized)
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,

    /// Lowercase extension, e.g. "png", "jpeg"
    pub format: String,

    /// Where in the source the image occurred
    pub position_hint: PositionHint,
}

impl ImageAsset {
    /// Create a new image asset. The format is lowercased.
    pub fn new(data: Vec<u8>, format: impl Into<String>, position_hint: PositionHint) -> Self {
        Self {
            data,
            format: format.into().to_lowercase(),
            position_hint,
        }
    }

    /// Create a PNG asset.
    pub fn png(data: Vec<u8>, position_hint: PositionHint) -> Self {
        Self::new(data, "png", position_hint)
    }

    /// Create an asset whose format is sniffed from the payload, falling back
    /// to `fallback` (typically the part's extension).
    pub fn sniffed(data: Vec<u8>, fallback: &str, position_hint: PositionHint) -> Self {
        let format = Self::sniff_format(&data)
            .map(str::to_string)
            .unwrap_or_else(|| fallback.to_string());
        Self::new(data, format, position_hint)
    }

    /// Size of the payload in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Format derived from the payload's magic bytes, if recognizable.
    pub fn sniff_format(data: &[u8]) -> Option<&'static str> {
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some("jpeg");
        }
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some("png");
        }
        if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            return Some("gif");
        }
        if data.starts_with(&[0x49, 0x49, 0x2A, 0x00]) || data.starts_with(&[0x4D, 0x4D, 0x00, 0x2A])
        {
            return Some("tiff");
        }
        if data.starts_with(b"BM") {
            return Some("bmp");
        }
        if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some("webp");
        }
        None
    }
}

/// Positional metadata for an image. Used for captions only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PositionHint {
    /// 1-based page number
    PageNumber(u32),
    /// 1-based slide number
    SlideNumber(u32),
    /// Package relationship id, e.g. "rId5"
    RelationId(String),
    /// No location known
    #[default]
    None,
}

impl PositionHint {
    /// Caption sentence for the location, if the hint carries one.
    pub fn location_sentence(&self) -> Option<String> {
        match self {
            PositionHint::PageNumber(n) => Some(format!("位于第{}页。", n)),
            PositionHint::SlideNumber(n) => Some(format!("位于第{}张幻灯片。", n)),
            PositionHint::RelationId(_) | PositionHint::None => None,
        }
    }
}

/// Serde adapter: `Vec<u8>` as standard base64 text.
pub(crate) mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD.decode(text).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter: `Option<Vec<u8>>` as optional base64 text.
pub(crate) mod base64_opt {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
        match data {
            Some(bytes) => serializer.serialize_some(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<u8>>, D::Error> {
        let text = Option::<String>::deserialize(deserializer)?;
        text.map(|t| STANDARD.decode(t).map_err(serde::de::Error::custom))
            .transpose()
    }
}
