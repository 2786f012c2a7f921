//! Normalized content model shared by every format adapter.
//!
//! Adapters turn a source file into a [`DocumentContent`]; the synthesizer
//! turns that into [`QaPair`] records. The model is format-agnostic: a page,
//! a slide, a worksheet and a heading-delimited run of paragraphs all become
//! a [`Section`].

mod document;
mod image;
mod qa;
mod section;

pub use document::{DocumentContent, FormatKind};
pub use image::{ImageAsset, PositionHint};
pub use qa::{QaKind, QaPair};
pub use section::{Section, TableBlock};

pub(crate) use image::base64_opt;
