//! CLI entry point for the cleaning pipeline.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use dotenv::dotenv;
use lex_cleaner::config::{DEFAULT_OUTPUT_DIR, DEFAULT_OUTPUT_PREFIX};
use lex_cleaner::reporting::CleaningReport;
use lex_cleaner::{CleanerConfig, CleaningOutcome, FormatHint, Pipeline, PipelineBuilder, ReportGenerator};
use std::path::Path;
use tracing::{error, info};

#[cfg(feature = "ai")]
use lex_cleaner::ai::GeminiProvider;
#[cfg(feature = "ai")]
use std::env;
#[cfg(feature = "ai")]
use std::sync::Arc;
#[cfg(feature = "ai")]
use tracing::warn;

#[derive(Parser, Debug)]
#[command(
    author = "Lex Machina Team",
    version,
    about = "Tabular Data Cleaning Pipeline",
    long_about = "Cleans an uploaded CSV/TSV/XLSX file: normalizes column names, removes \
                  duplicate rows, drops rows with missing values and classifies columns.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  GEMINI_API_KEY    API key for Google Gemini (enables the dataset summary)\n\n\
                  EXAMPLES:\n  \
                  # Basic usage\n  \
                  lex-cleaner -i data.csv\n\n  \
                  # Semicolon-separated file written to a custom directory\n  \
                  lex-cleaner -i data.csv --delimiter ';' -o cleaned/\n\n  \
                  # Machine-readable output, no summary call\n  \
                  lex-cleaner -i data.xlsx --no-ai --json"
)]
struct Args {
    /// Path to the CSV, TSV or XLSX file to clean
    #[arg(short, long)]
    input: String,

    /// Input format (delimited, tab_delimited, spreadsheet)
    ///
    /// If not specified, the format is taken from the file extension
    #[arg(long)]
    format: Option<FormatHint>,

    /// Output directory for the cleaned file and reports
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    output: String,

    /// Prefix for the cleaned file name (<prefix>_<input name>)
    #[arg(long, default_value = DEFAULT_OUTPUT_PREFIX)]
    prefix: String,

    /// Encodings to try, in order, for delimited input
    #[arg(long, value_delimiter = ',')]
    encodings: Option<Vec<String>>,

    /// Field delimiter for delimited input and output
    #[arg(long, default_value = ",")]
    delimiter: char,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Skip the AI dataset summary
    #[arg(long, default_value = "false")]
    no_ai: bool,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,

    /// Output JSON to stdout instead of human-readable summary
    ///
    /// Disables all progress logs; only outputs the final JSON report.
    /// Useful for piping to other tools: `... --json | jq .overview`
    #[arg(long)]
    json: bool,

    /// Write a JSON report to the output directory
    ///
    /// The report will be saved as report_<input_name>.json
    #[arg(short = 'r', long)]
    emit_report: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    dotenv().ok();

    if !Path::new(&args.input).exists() {
        return Err(anyhow!("Input file not found: {}", args.input));
    }

    let config = build_config(&args)?;
    let pipeline = build_pipeline(&args, config)?;

    run_pipeline(&pipeline, &args)
}

/// Translate CLI flags into a validated [`CleanerConfig`].
fn build_config(args: &Args) -> Result<CleanerConfig> {
    let delimiter = u8::try_from(args.delimiter)
        .map_err(|_| anyhow!("Delimiter must be a single ASCII character, got '{}'", args.delimiter))?;

    let mut builder = CleanerConfig::builder()
        .delimiter(delimiter)
        .output_dir(&args.output)
        .output_prefix(&args.prefix);

    if let Some(ref encodings) = args.encodings {
        builder = builder.encoding_candidates(encodings.iter().map(|e| e.trim()));
    }

    Ok(builder.build()?)
}

fn with_progress(builder: PipelineBuilder, args: &Args) -> PipelineBuilder {
    if args.quiet || args.json {
        return builder;
    }
    builder.on_progress(|update| {
        info!(
            "[{:.0}%] {}: {}",
            update.progress * 100.0,
            update.stage.display_name(),
            update.message
        );
    })
}

/// Build the pipeline with an optional summary provider
#[cfg(feature = "ai")]
fn build_pipeline(args: &Args, config: CleanerConfig) -> Result<Pipeline> {
    let mut builder = with_progress(Pipeline::builder().config(config), args);

    if args.no_ai {
        info!("Dataset summary disabled");
        return Ok(builder.build()?);
    }

    let api_key = env::var("GEMINI_API_KEY")
        .or_else(|_| env::var("GOOGLE_API_KEY"))
        .unwrap_or_default();

    if api_key.trim().is_empty() {
        warn!("GEMINI_API_KEY not set. The report will not include a summary.");
    } else {
        info!("Dataset summary enabled (Gemini)");
        builder = builder.summary_provider(Arc::new(GeminiProvider::new(api_key)?));
    }

    Ok(builder.build()?)
}

/// Build the pipeline without AI support (fallback when "ai" feature is disabled)
#[cfg(not(feature = "ai"))]
fn build_pipeline(args: &Args, config: CleanerConfig) -> Result<Pipeline> {
    if !args.no_ai {
        tracing::warn!("AI support not compiled in. No summary will be generated.");
        tracing::warn!("Compile with --features ai to enable AI support.");
    }

    Ok(with_progress(Pipeline::builder().config(config), args).build()?)
}

/// Run pipeline and print results
fn run_pipeline(pipeline: &Pipeline, args: &Args) -> Result<()> {
    info!("Cleaning {}", args.input);

    let result = match args.format {
        Some(hint) => {
            let bytes = std::fs::read(&args.input)
                .with_context(|| format!("Failed to read {}", args.input))?;
            pipeline.process(&bytes, &file_name(&args.input), hint)
        }
        None => pipeline.process_file(&args.input),
    };

    match result {
        Ok(outcome) => handle_pipeline_output(&outcome, args),
        Err(e) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&e)?);
            }
            error!("Pipeline failed: {}", e);
            Err(anyhow!("Pipeline failed: {}", e))
        }
    }
}

/// Handle pipeline output based on CLI flags.
///
/// Output behavior:
/// - Default: Print human-readable summary to stdout
/// - `--json`: Print JSON to stdout only (no logs)
/// - `--emit-report`: Write JSON report to file
fn handle_pipeline_output(outcome: &CleaningOutcome, args: &Args) -> Result<()> {
    let report = CleaningReport::from_outcome(&args.input, outcome);

    if args.emit_report {
        let generator = ReportGenerator::new(&args.output);
        let report_path = generator.write_report_to_file(&report, &extract_file_stem(&args.input))?;
        info!("Report written to: {}", report_path.display());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_human_readable_summary(&report);

    Ok(())
}

/// Final path component of `path`, used to name the cleaned file.
fn file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Extract the file stem (name without extension) from a path.
fn extract_file_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string()
}

/// Print a human-readable summary of the cleaning results.
///
/// This is the default output when `--json` is not specified.
fn print_human_readable_summary(report: &CleaningReport) {
    println!();
    println!("{}", "=".repeat(80));
    println!("CLEANING COMPLETE");
    println!("{}", "=".repeat(80));
    println!();
    print!("{}", report);
    println!();
    println!("Use --json for machine-readable output");
    println!("Use --emit-report to save the report as JSON");
    println!("{}", "=".repeat(80));
}
