//! Error types for docqa.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for docqa operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while normalizing documents and synthesizing Q&A.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input root directory is missing or is not a directory.
    #[error("Input directory not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// No adapter handles this file extension.
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// The file is a legacy binary Office document (OLE compound file).
    #[error("Legacy binary {0} documents are not supported")]
    LegacyFormat(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// Error reading a word-processor document.
    #[error("DOCX parsing error: {0}")]
    Docx(String),

    /// Error reading a workbook.
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    /// Error reading an OOXML zip package.
    #[error("Package error: {0}")]
    Package(String),

    /// Malformed XML inside an OOXML package.
    #[error("XML error: {0}")]
    Xml(String),

    /// A required package part is missing.
    #[error("Missing package part: {0}")]
    MissingPart(String),

    /// Error extracting or re-encoding an embedded image.
    #[error("Image extraction error: {0}")]
    ImageExtract(String),

    /// Error extracting text content.
    #[error("Text extraction error: {0}")]
    TextExtract(String),

    /// Error during rendering (Word, JSON).
    #[error("Rendering error: {0}")]
    Render(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            zip::result::ZipError::FileNotFound => Error::MissingPart(err.to_string()),
            _ => Error::Package(err.to_string()),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml(err.to_string())
    }
}

impl From<calamine::Error> for Error {
    fn from(err: calamine::Error) -> Self {
        Error::Spreadsheet(err.to_string())
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::ImageExtract(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Render(format!("JSON serialization error: {}", err))
    }
}

impl Error {
    /// Whether this error means "skip the file quietly" rather than a failure.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Error::UnsupportedFormat(_))
    }
}
