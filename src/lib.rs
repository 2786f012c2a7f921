//! # docqa
//!
//! Office document normalization and heuristic Q&A synthesis for
//! knowledge-base ingestion.
//!
//! Word, PDF, Excel and PowerPoint files are normalized into a single
//! [`DocumentContent`] model, then turned into question/answer pairs by a
//! rule-based [`QaSynthesizer`]. Results can be rendered to Word and JSON.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docqa::{process_file, render};
//!
//! fn main() -> docqa::Result<()> {
//!     let (content, pairs) = process_file("manual.docx")?;
//!     let record = render::QaRecord::new(&content, &pairs);
//!     println!("{}", render::to_json(&record, docqa::JsonFormat::Pretty)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Batch processing
//!
//! ```no_run
//! use docqa::{Pipeline, PipelineOptions};
//!
//! let report = Pipeline::new(PipelineOptions::new("待处理知识库", "已处理知识库")).run()?;
//! println!("{} files processed", report.processed());
//! # Ok::<(), docqa::Error>(())
//! ```
//!
//! ## Features
//!
//! - **Four format families**: docx, pdf, xlsx/xls, pptx
//! - **Heading detection**: Chinese document conventions and `Heading N` styles
//! - **Q&A synthesis**: text, table and image pairs with keyword extraction
//! - **Outputs**: Word document and JSON record per source file
//! - **Parallel batches**: optional Rayon-backed normalization

pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod render;
pub mod synth;

// Re-export commonly used types
pub use detect::{detect_signature, format_from_extension, format_from_path, Signature};
pub use error::{Error, Result};
pub use model::{
    DocumentContent, FormatKind, ImageAsset, PositionHint, QaKind, QaPair, Section, TableBlock,
};
pub use parser::{AdapterRegistry, ErrorMode, FormatAdapter, ParseOptions};
pub use pipeline::{BatchReport, FileOutcome, Pipeline, PipelineOptions};
pub use render::{JsonFormat, QaRecord, WordRenderer};
pub use synth::{AnswerEnhancer, KeywordExtractor, QaSynthesizer, QuestionGeneralizer};

use std::path::Path;

/// Normalize a file with the adapter for its extension.
///
/// # Example
///
/// ```no_run
/// let content = docqa::parse_file("report.pdf").unwrap();
/// println!("Sections: {}", content.sections.len());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<DocumentContent> {
    parse_file_with_options(path, ParseOptions::default())
}

/// Normalize a file with custom options.
///
/// # Example
///
/// ```no_run
/// use docqa::{parse_file_with_options, ParseOptions};
///
/// let options = ParseOptions::new().lenient().text_only();
/// let content = parse_file_with_options("slides.pptx", options).unwrap();
/// ```
pub fn parse_file_with_options<P: AsRef<Path>>(
    path: P,
    options: ParseOptions,
) -> Result<DocumentContent> {
    AdapterRegistry::with_defaults().parse_file(path.as_ref(), &options)
}

/// Normalize a document held in memory.
///
/// `title` becomes the document title and the source label.
pub fn parse_bytes(
    kind: FormatKind,
    data: &[u8],
    title: &str,
    options: ParseOptions,
) -> Result<DocumentContent> {
    let registry = AdapterRegistry::with_defaults();
    let adapter = registry
        .get(kind)
        .ok_or_else(|| Error::UnsupportedFormat(kind.to_string()))?;
    adapter.parse_bytes(data, title, title, &options)
}

/// Synthesize Q&A pairs with the default rules.
pub fn synthesize(content: &DocumentContent) -> Vec<QaPair> {
    QaSynthesizer::new().synthesize(content)
}

/// Normalize a file and synthesize its Q&A pairs.
///
/// # Example
///
/// ```no_run
/// let (content, pairs) = docqa::process_file("faq.docx").unwrap();
/// for pair in &pairs {
///     println!("{} -> {}", pair.question, content.title);
/// }
/// ```
pub fn process_file<P: AsRef<Path>>(path: P) -> Result<(DocumentContent, Vec<QaPair>)> {
    let content = parse_file(path)?;
    let pairs = synthesize(&content);
    Ok((content, pairs))
}

/// Render a file's Q&A record as JSON.
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let (content, pairs) = process_file(path)?;
    render::to_json(&QaRecord::new(&content, &pairs), format)
}

/// Render a file's Q&A pairs as Word document bytes.
pub fn to_word<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let (content, pairs) = process_file(path)?;
    WordRenderer::new().render(&content.title, &pairs)
}
