//! Format adapters that normalize office documents into [`DocumentContent`].
//!
//! [`DocumentContent`]: crate::model::DocumentContent

mod adapter;
pub mod classifier;
mod docx;
mod ooxml;
mod options;
mod pdf;
mod pptx;
mod xlsx;

pub use adapter::{AdapterRegistry, FormatAdapter};
pub use classifier::{is_heading, matching_rule, HeadingRule};
pub use docx::DocxAdapter;
pub use options::{ErrorMode, ParseOptions};
pub use pdf::PdfAdapter;
pub use pptx::PptxAdapter;
pub use xlsx::XlsxAdapter;
