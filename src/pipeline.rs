//! Batch driver: discover files, normalize, synthesize, write outputs.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::detect::format_from_path;
use crate::error::{Error, Result};
use crate::model::{DocumentContent, QaPair};
use crate::parser::{AdapterRegistry, ParseOptions};
use crate::render::{to_json, JsonFormat, QaRecord, WordRenderer};
use crate::synth::QaSynthesizer;

/// Default input directory.
pub const DEFAULT_INPUT_DIR: &str = "待处理知识库";

/// Default output directory.
pub const DEFAULT_OUTPUT_DIR: &str = "已处理知识库";

/// Options for a batch run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Root directory scanned recursively
    pub input_dir: PathBuf,

    /// Directory receiving the rendered outputs
    pub output_dir: PathBuf,

    /// Options handed to every adapter
    pub parse: ParseOptions,

    /// Write `<n>_<stem>_processed.docx`
    pub write_word: bool,

    /// Write `<n>_<stem>_data.json`
    pub write_json: bool,

    /// JSON layout
    pub json_format: JsonFormat,

    /// Normalize and synthesize files on the rayon pool
    pub parallel: bool,
}

impl PipelineOptions {
    /// Create options for the given directories.
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    /// Set parse options.
    pub fn with_parse_options(mut self, parse: ParseOptions) -> Self {
        self.parse = parse;
        self
    }

    /// Enable or disable the Word output.
    pub fn with_word(mut self, enabled: bool) -> Self {
        self.write_word = enabled;
        self
    }

    /// Enable or disable the JSON output.
    pub fn with_json(mut self, enabled: bool) -> Self {
        self.write_json = enabled;
        self
    }

    /// Set JSON layout.
    pub fn with_json_format(mut self, format: JsonFormat) -> Self {
        self.json_format = format;
        self
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            parse: ParseOptions::default(),
            write_word: true,
            write_json: true,
            json_format: JsonFormat::Pretty,
            parallel: false,
        }
    }
}

/// What happened to one discovered file.
#[derive(Debug)]
pub enum FileOutcome {
    /// Outputs were written
    Processed {
        /// Source file
        source: PathBuf,
        /// Counter used in the output names
        counter: usize,
        /// Number of Q&A pairs
        pairs: usize,
        /// Files written
        outputs: Vec<PathBuf>,
    },
    /// Normalized, but no Q&A pair came out; counted, nothing written
    Empty {
        /// Source file
        source: PathBuf,
    },
    /// Extension has no adapter; not counted
    Unsupported {
        /// Source file
        source: PathBuf,
    },
    /// Normalization or writing failed; not counted
    Failed {
        /// Source file
        source: PathBuf,
        /// Cause
        error: Error,
    },
}

impl FileOutcome {
    /// The source file.
    pub fn source(&self) -> &Path {
        match self {
            FileOutcome::Processed { source, .. }
            | FileOutcome::Empty { source }
            | FileOutcome::Unsupported { source }
            | FileOutcome::Failed { source, .. } => source,
        }
    }

    /// Whether the file counts towards the processed total.
    pub fn is_counted(&self) -> bool {
        matches!(
            self,
            FileOutcome::Processed { .. } | FileOutcome::Empty { .. }
        )
    }
}

/// Summary of a batch run, in traversal order.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// One outcome per discovered file
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    /// Files counted as processed.
    pub fn processed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_counted()).count()
    }

    /// Files that failed.
    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, FileOutcome::Failed { .. }))
            .count()
    }

    /// Files skipped for their extension.
    pub fn unsupported(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, FileOutcome::Unsupported { .. }))
            .count()
    }

    /// Every file written.
    pub fn outputs(&self) -> Vec<&Path> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                FileOutcome::Processed { outputs, .. } => Some(outputs),
                _ => None,
            })
            .flatten()
            .map(PathBuf::as_path)
            .collect()
    }
}

/// Result of normalizing and synthesizing one file, before anything is written.
enum Prepared {
    Ready(DocumentContent, Vec<QaPair>),
    Unsupported,
    Failed(Error),
}

/// The batch driver.
pub struct Pipeline {
    options: PipelineOptions,
    registry: AdapterRegistry,
    synthesizer: QaSynthesizer,
    word: WordRenderer,
}

impl Pipeline {
    /// Create a pipeline with the built-in adapters.
    pub fn new(options: PipelineOptions) -> Self {
        Self {
            options,
            registry: AdapterRegistry::with_defaults(),
            synthesizer: QaSynthesizer::new(),
            word: WordRenderer::new(),
        }
    }

    /// Use a custom adapter registry.
    pub fn with_registry(mut self, registry: AdapterRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Use a custom synthesizer.
    pub fn with_synthesizer(mut self, synthesizer: QaSynthesizer) -> Self {
        self.synthesizer = synthesizer;
        self
    }

    /// The options this pipeline runs with.
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// All files under the input root: each directory's files in name order,
    /// then its subdirectories in name order.
    pub fn discover(&self) -> Result<Vec<PathBuf>> {
        let root = &self.options.input_dir;
        if !root.is_dir() {
            return Err(Error::InputNotFound(root.clone()));
        }
        let mut files = Vec::new();
        collect_files(root, &mut files)?;
        Ok(files)
    }

    /// Run the batch.
    pub fn run(&self) -> Result<BatchReport> {
        self.run_with_progress(|_| {})
    }

    /// Run the batch, calling `on_file` after each file is finished.
    ///
    /// Only a missing input root or an uncreatable output directory is
    /// returned as an error; per-file problems are recorded in the report.
    pub fn run_with_progress<F>(&self, mut on_file: F) -> Result<BatchReport>
    where
        F: FnMut(&FileOutcome),
    {
        let files = self.discover()?;
        fs::create_dir_all(&self.options.output_dir)?;
        log::info!(
            "Processing {} ({} files)",
            self.options.input_dir.display(),
            files.len()
        );

        let mut report = BatchReport::default();
        let mut counter = 0usize;
        let mut finish = |path: &Path, prepared: Prepared, report: &mut BatchReport| {
            let outcome = self.finish(path, prepared, &mut counter);
            on_file(&outcome);
            report.outcomes.push(outcome);
        };

        if self.options.parallel {
            let prepared: Vec<Prepared> = files.par_iter().map(|path| self.prepare(path)).collect();
            for (path, prepared) in files.iter().zip(prepared) {
                finish(path, prepared, &mut report);
            }
        } else {
            for path in &files {
                finish(path, self.prepare(path), &mut report);
            }
        }

        log::info!(
            "Done: {} processed, {} failed, {} unsupported",
            report.processed(),
            report.failed(),
            report.unsupported()
        );
        Ok(report)
    }

    /// Normalize and synthesize a single file.
    pub fn process_document(&self, path: &Path) -> Result<(DocumentContent, Vec<QaPair>)> {
        let content = self.registry.parse_file(path, &self.options.parse)?;
        let pairs = self.synthesizer.synthesize(&content);
        Ok((content, pairs))
    }

    fn prepare(&self, path: &Path) -> Prepared {
        if let Err(e) = format_from_path(path) {
            log::warn!("Skipping {}: {}", path.display(), e);
            return Prepared::Unsupported;
        }

        log::info!("Processing file: {}", path.display());
        match self.process_document(path) {
            Ok((content, pairs)) => Prepared::Ready(content, pairs),
            Err(e) if e.is_unsupported() => Prepared::Unsupported,
            Err(e) => Prepared::Failed(e),
        }
    }

    fn finish(&self, path: &Path, prepared: Prepared, counter: &mut usize) -> FileOutcome {
        let source = path.to_path_buf();
        match prepared {
            Prepared::Unsupported => FileOutcome::Unsupported { source },
            Prepared::Failed(error) => {
                log::error!("Failed to process {}: {}", path.display(), error);
                FileOutcome::Failed { source, error }
            }
            Prepared::Ready(_, pairs) if pairs.is_empty() => {
                log::warn!("{} produced no Q&A pairs", path.display());
                *counter += 1;
                FileOutcome::Empty { source }
            }
            Prepared::Ready(content, pairs) => {
                match self.write_outputs(*counter, path, &content, &pairs) {
                    Ok(outputs) => {
                        let outcome = FileOutcome::Processed {
                            source,
                            counter: *counter,
                            pairs: pairs.len(),
                            outputs,
                        };
                        *counter += 1;
                        outcome
                    }
                    Err(error) => {
                        log::error!("Failed to write outputs for {}: {}", path.display(), error);
                        FileOutcome::Failed { source, error }
                    }
                }
            }
        }
    }

    fn write_outputs(
        &self,
        counter: usize,
        path: &Path,
        content: &DocumentContent,
        pairs: &[QaPair],
    ) -> Result<Vec<PathBuf>> {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut outputs = Vec::new();

        if self.options.write_word {
            let docx_path = self
                .options
                .output_dir
                .join(processed_file_name(counter, &stem));
            fs::write(&docx_path, self.word.render(&content.title, pairs)?)?;
            log::info!("Saved {}", docx_path.display());
            outputs.push(docx_path);
        }

        if self.options.write_json {
            let json_path = self.options.output_dir.join(data_file_name(counter, &stem));
            let json = to_json(&QaRecord::new(content, pairs), self.options.json_format)?;
            fs::write(&json_path, json)?;
            log::debug!("Saved {}", json_path.display());
            outputs.push(json_path);
        }

        Ok(outputs)
    }
}

/// `<counter:02>_<stem>_processed.docx`
pub fn processed_file_name(counter: usize, stem: &str) -> String {
    format!("{:02}_{}_processed.docx", counter, stem)
}

/// `<counter:02>_<stem>_data.json`
pub fn data_file_name(counter: usize, stem: &str) -> String {
    format!("{:02}_{}_data.json", counter, stem)
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries = fs::read_dir(dir)?
        .map(|entry| entry.and_then(|e| Ok((e.path(), e.file_type()?))))
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    let mut dirs = Vec::new();
    for (path, file_type) in entries {
        if file_type.is_dir() {
            dirs.push(path);
        } else if file_type.is_symlink() && path.is_dir() {
            // Linked directories are not descended into; they may loop.
            log::debug!("Not following directory link {}", path.display());
        } else {
            files.push(path);
        }
    }

    for sub in dirs {
        if let Err(e) = collect_files(&sub, files) {
            log::warn!("Skipping unreadable directory {}: {}", sub.display(), e);
        }
    }
    Ok(())
}
