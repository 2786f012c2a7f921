//! The format adapter interface and the extension registry.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::detect::format_from_extension;
use crate::error::{Error, Result};
use crate::model::{DocumentContent, FormatKind};

use super::{DocxAdapter, ParseOptions, PdfAdapter, PptxAdapter, XlsxAdapter};

/// Converts one source file into a [`DocumentContent`].
///
/// Implement this trait to add support for a new document format.
pub trait FormatAdapter: Send + Sync {
    /// The format family this adapter produces.
    fn kind(&self) -> FormatKind;

    /// Name used in logs.
    fn name(&self) -> &str;

    /// Normalize a document held in memory.
    ///
    /// `title` and `source_path` are copied into the result for provenance.
    fn parse_bytes(
        &self,
        data: &[u8],
        title: &str,
        source_path: &str,
        options: &ParseOptions,
    ) -> Result<DocumentContent>;

    /// Normalize a file on disk. The title is the file stem.
    fn parse_file(&self, path: &Path, options: &ParseOptions) -> Result<DocumentContent> {
        let data = std::fs::read(path)?;
        let skeleton = DocumentContent::for_path(path, self.kind());
        self.parse_bytes(&data, &skeleton.title, &skeleton.source_path, options)
    }
}

/// Registry mapping each [`FormatKind`] to its adapter.
///
/// Extensions resolve to a kind through the static table in [`crate::detect`].
pub struct AdapterRegistry {
    adapters: HashMap<FormatKind, Arc<dyn FormatAdapter>>,
}

impl AdapterRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            adapters: HashMap::new(),
        }
    }

    /// Create a registry with the four built-in adapters.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(DocxAdapter::new()));
        registry.register(Arc::new(PdfAdapter::new()));
        registry.register(Arc::new(XlsxAdapter::new()));
        registry.register(Arc::new(PptxAdapter::new()));
        registry
    }

    /// Register an adapter, replacing any previous one for its kind.
    pub fn register(&mut self, adapter: Arc<dyn FormatAdapter>) {
        self.adapters.insert(adapter.kind(), adapter);
    }

    /// Get the adapter for a kind.
    pub fn get(&self, kind: FormatKind) -> Option<Arc<dyn FormatAdapter>> {
        self.adapters.get(&kind).cloned()
    }

    /// Get the adapter for a file extension.
    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn FormatAdapter>> {
        format_from_extension(ext).and_then(|kind| self.get(kind))
    }

    /// Check if an extension is supported.
    pub fn supports(&self, ext: &str) -> bool {
        self.get_by_extension(ext).is_some()
    }

    /// Normalize a file using the adapter for its extension.
    pub fn parse_file(&self, path: &Path, options: &ParseOptions) -> Result<DocumentContent> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();

        let adapter = self
            .get_by_extension(ext)
            .ok_or_else(|| Error::UnsupportedFormat(ext.to_lowercase()))?;

        log::debug!("Parsing {} with {} adapter", path.display(), adapter.name());
        adapter.parse_file(path, options)
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
