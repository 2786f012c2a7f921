//! docqa CLI - knowledge-base Q&A builder

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use docqa::pipeline::{DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR};
use docqa::{
    parse_file_with_options, render, FileOutcome, JsonFormat, ParseOptions, Pipeline,
    PipelineOptions, QaRecord, QaSynthesizer, WordRenderer,
};

#[derive(Parser)]
#[command(name = "docqa")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Turn office documents into knowledge-base Q&A pairs", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(flatten)]
    process: ProcessArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Process every document under the input directory (default)
    Process(ProcessArgs),

    /// Show the normalized structure of one document
    Inspect {
        /// Input document
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Synthesize Q&A pairs for one document
    Qa {
        /// Input document
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file; `.docx` writes Word, anything else JSON (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show version information
    Version,
}

#[derive(Args, Clone)]
struct ProcessArgs {
    /// Directory scanned recursively for documents
    #[arg(long, value_name = "DIR", env = "DOCQA_INPUT_DIR", default_value = DEFAULT_INPUT_DIR)]
    input_dir: PathBuf,

    /// Directory receiving the Word and JSON outputs
    #[arg(long, value_name = "DIR", env = "DOCQA_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Skip the Word output
    #[arg(long)]
    no_word: bool,

    /// Skip the JSON output
    #[arg(long)]
    no_json: bool,

    /// Write compact JSON
    #[arg(long)]
    compact: bool,

    /// Normalize documents in parallel
    #[arg(long)]
    parallel: bool,

    /// Fail a document on the first unreadable page
    #[arg(long)]
    strict: bool,

    /// Do not extract embedded images
    #[arg(long)]
    no_images: bool,
}

impl ProcessArgs {
    fn parse_options(&self) -> ParseOptions {
        let mut options = ParseOptions::new();
        if !self.strict {
            options = options.lenient();
        }
        if self.no_images {
            options = options.text_only();
        }
        options
    }

    fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions::new(&self.input_dir, &self.output_dir)
            .with_parse_options(self.parse_options())
            .with_word(!self.no_word)
            .with_json(!self.no_json)
            .with_json_format(json_format(self.compact))
            .with_parallel(self.parallel)
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Process(args)) => cmd_process(&args),
        Some(Commands::Inspect { input }) => cmd_inspect(&input),
        Some(Commands::Qa {
            input,
            output,
            compact,
        }) => cmd_qa(&input, output.as_deref(), compact),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => cmd_process(&cli.process),
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn json_format(compact: bool) -> JsonFormat {
    if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    }
}

fn cmd_process(args: &ProcessArgs) -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = Pipeline::new(args.pipeline_options());
    let total = pipeline.discover()?.len();

    println!(
        "{} {} ({} files)",
        "Processing".cyan().bold(),
        args.input_dir.display(),
        total
    );

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let report = pipeline.run_with_progress(|outcome| {
        let name = outcome
            .source()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        pb.set_message(name);
        pb.inc(1);
    })?;
    pb.finish_and_clear();

    for outcome in &report.outcomes {
        match outcome {
            FileOutcome::Processed { source, pairs, .. } => {
                println!("  {} {} ({} pairs)", "✓".green(), source.display(), pairs)
            }
            FileOutcome::Empty { source } => {
                println!("  {} {} (no pairs)", "○".yellow(), source.display())
            }
            FileOutcome::Unsupported { source } => {
                println!("  {} {}", "-".dimmed(), source.display().to_string().dimmed())
            }
            FileOutcome::Failed { source, error } => {
                println!("  {} {}: {}", "✗".red(), source.display(), error)
            }
        }
    }

    println!();
    println!(
        "{} {} processed, {} failed, {} skipped",
        "Done!".green().bold(),
        report.processed(),
        report.failed(),
        report.unsupported()
    );
    println!("{} {}", "Output:".bold(), args.output_dir.display());

    Ok(())
}

fn cmd_inspect(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let content = parse_file_with_options(input, ParseOptions::new().lenient())?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Title".bold(), content.title);
    println!("{}: {}", "Kind".bold(), content.kind);
    println!("{}: {}", "Sections".bold(), content.sections.len());
    println!("{}: {}", "Tables".bold(), content.table_count());
    println!("{}: {}", "Images".bold(), content.images.len());

    if !content.sections.is_empty() {
        println!();
        println!("{}", "Sections".cyan().bold());
        println!("{}", "─".repeat(40).dimmed());
        for section in &content.sections {
            println!(
                "  {} {} {}",
                "├─".dimmed(),
                section.heading,
                format!(
                    "({} chars, {} tables)",
                    section.text_content.chars().count(),
                    section.tables.len()
                )
                .dimmed()
            );
        }
    }

    let pairs = QaSynthesizer::new().synthesize(&content);
    println!();
    println!("{}: {}", "Q&A pairs".bold(), pairs.len());

    Ok(())
}

fn cmd_qa(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = parse_file_with_options(input, ParseOptions::new().lenient())?;
    let pairs = QaSynthesizer::new().synthesize(&content);

    match output {
        Some(path) if is_docx(path) => {
            let data = WordRenderer::new().render(&content.title, &pairs)?;
            fs::write(path, data)?;
            println!("{} {}", "Saved to".green(), path.display());
        }
        Some(path) => {
            let json = render::to_json(&QaRecord::new(&content, &pairs), json_format(compact))?;
            fs::write(path, json)?;
            println!("{} {}", "Saved to".green(), path.display());
        }
        None => {
            let json = render::to_json(&QaRecord::new(&content, &pairs), json_format(compact))?;
            println!("{}", json);
        }
    }

    Ok(())
}

fn is_docx(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("docx"))
}

fn cmd_version() {
    println!("{} {}", "docqa".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Office document to knowledge-base Q&A tool");
    println!();
    println!("Supported formats: {}", docqa::detect::supported_extensions().collect::<Vec<_>>().join(", "));
    println!("Repository: {}", "https://github.com/iyulab/docqa".dimmed());
    println!("License: MIT");
}
