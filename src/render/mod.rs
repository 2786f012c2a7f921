//! Rendering of synthesized Q&A pairs to Word and JSON.

mod json;
mod word;

pub use json::{to_json, JsonFormat, QaRecord};
pub use word::{WordRenderer, DEFAULT_IMAGE_WIDTH_INCHES, EMU_PER_INCH};
