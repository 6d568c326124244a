//! # zdk-toolgen
//!
//! Command line front end: reads a dereferenced OpenAPI document, extracts
//! one tool definition per operation and writes them as JSON or as a
//! TypeScript module.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use zdk_openapi::{ApiDocument, Extraction, Extractor, render_json, render_typescript};
use zdk_telemetry::{ExtractionSummary, LogFormat, init_logging, record_extraction_summary};

mod config;

use config::{OutputFormat, ToolgenConfig};

#[derive(Parser, Debug)]
#[clap(author, version, about = "Generate tool definitions from an OpenAPI document")]
struct Cli {
    /// OpenAPI document (JSON or YAML), already dereferenced
    #[clap(short, long)]
    input: PathBuf,

    /// Output file; stdout when omitted
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[clap(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Config file (defaults to the nearest zdk-toolgen.toml)
    #[clap(long)]
    config: Option<PathBuf>,

    /// Fail on parameters with an unrecognized location instead of skipping
    #[clap(long)]
    strict: bool,

    /// Maximum tool name length (0 disables the limit)
    #[clap(long)]
    max_name_length: Option<usize>,

    /// Leave out operations marked deprecated
    #[clap(long)]
    skip_deprecated: bool,

    /// Exit with status 2 when any operation was skipped
    #[clap(long)]
    fail_on_skip: bool,

    /// Log output style: pretty, compact or json
    #[clap(long)]
    log_format: Option<LogFormat>,
}

impl Cli {
    /// Fold command-line overrides into the file configuration.
    fn apply_to(&self, config: &mut ToolgenConfig) {
        if self.strict {
            config.extract.strict_locations = true;
        }
        if let Some(max) = self.max_name_length {
            config.extract.max_name_length = (max > 0).then_some(max);
        }
        if self.skip_deprecated {
            config.extract.include_deprecated = false;
        }
        if let Some(format) = self.format {
            config.output.format = format;
        }
        if let Some(output) = &self.output {
            config.output.path = Some(output.to_string_lossy().into_owned());
        }
        if self.fail_on_skip {
            config.output.fail_on_skip = true;
        }
        if let Some(log_format) = self.log_format {
            config.logging.format = log_format;
        }
    }
}

/// How a successful run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunStatus {
    Complete,
    /// Output was written but some operations were skipped
    Incomplete,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(RunStatus::Complete) => ExitCode::SUCCESS,
        Ok(RunStatus::Incomplete) => ExitCode::from(2),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<RunStatus> {
    let mut config = ToolgenConfig::load(cli.config.as_deref())?;
    cli.apply_to(&mut config);

    init_logging(config.logging.format, &config.logging.level);
    debug!("Effective configuration: {:?}", config);

    let document = ApiDocument::from_file(&cli.input)
        .with_context(|| format!("Failed to load OpenAPI document {:?}", cli.input))?;

    let extraction = Extractor::new(config.extract.clone())
        .extract(&document)
        .with_context(|| format!("Failed to extract tools from {:?}", cli.input))?;

    record_extraction_summary(&summarize(&extraction));

    let rendered = match config.output.format {
        OutputFormat::Json => render_json(&extraction)?,
        OutputFormat::Typescript => render_typescript(&extraction)?,
    };

    match &config.output.path {
        Some(path) => write_output(Path::new(path), &rendered)?,
        None => print!("{rendered}"),
    }

    if config.output.fail_on_skip && extraction.skipped_count() > 0 {
        return Ok(RunStatus::Incomplete);
    }

    Ok(RunStatus::Complete)
}

fn summarize(extraction: &Extraction) -> ExtractionSummary {
    ExtractionSummary {
        document_title: extraction
            .title
            .clone()
            .unwrap_or_else(|| "untitled document".to_string()),
        tools_extracted: extraction.extracted_count(),
        operations_skipped: extraction.skipped_count(),
        tools_renamed: extraction.renamed.len(),
    }
}

/// Write `contents` to `path`, creating missing parent directories.
fn write_output(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {:?}", parent))?;
    }

    fs::write(path, contents).with_context(|| format!("Failed to write {:?}", path))?;
    info!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}
