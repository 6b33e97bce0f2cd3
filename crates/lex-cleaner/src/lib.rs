//! Tabular Data Cleaning Library
//!
//! A deterministic cleaning pipeline for uploaded delimited and spreadsheet
//! files, with an optional AI-written dataset summary.
//!
//! # Overview
//!
//! A run has three parts:
//!
//! - **Loading**: decode bytes with an ordered list of candidate encodings
//!   (delimited text) or read the first worksheet (xlsx) into a [`Table`]
//! - **Cleaning**: normalize column names, drop duplicate rows, count missing
//!   data, drop every row with a missing cell, classify the columns
//! - **Assembling**: write the cleaned table next to the input format and
//!   package metrics, classification and a sample into a [`ResultRecord`]
//!
//! Each step is also available on its own: [`load`], [`clean`],
//! [`classify_columns`] and [`assemble_result`].
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use lex_cleaner::{CleanerConfig, Pipeline};
//! use lex_cleaner::ai::GeminiProvider;
//! use std::sync::Arc;
//!
//! // Option 1: full pipeline with an AI summary and progress reporting
//! let provider = Arc::new(GeminiProvider::new(api_key)?);
//!
//! let outcome = Pipeline::builder()
//!     .summary_provider(provider)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .process_file("uploads/sales.csv")?;
//!
//! println!("Cleaned file: {}", outcome.record.cleaned_file_path().display());
//! println!("Summary: {:?}", outcome.summary);
//!
//! // Option 2: the steps by hand, no provider involved
//! let config = CleanerConfig::default();
//! let table = lex_cleaner::load(&bytes, FormatHint::Delimited, &config)?;
//! let (table, metrics) = lex_cleaner::clean(table)?;
//! let classification = lex_cleaner::classify_columns(&table);
//! ```
//!
//! # Summary Providers
//!
//! Summaries come from the [`ai::SummaryProvider`] trait. Currently
//! implemented providers:
//!
//! - [`ai::GeminiProvider`] - Google Gemini API (feature `ai`)
//!
//! A failing provider never fails the run: the outcome's summary is `None`.
//!
//! # Configuration
//!
//! Use [`CleanerConfig`] to choose encodings, missing markers, the delimiter
//! and where cleaned files go:
//!
//! ```rust,ignore
//! use lex_cleaner::CleanerConfig;
//!
//! let config = CleanerConfig::builder()
//!     .encoding_candidates(["utf-8", "cp1252"])
//!     .delimiter(b';')
//!     .output_dir("out")
//!     .output_prefix("clean")
//!     .build()?;
//! ```

pub mod ai;
pub mod assembler;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod reporting;
pub mod table;
pub mod types;

// Re-exports for convenient access
pub use assembler::{OutputHint, ResultRecord, assemble_result};
pub use cleaner::{DataCleaner, StageReport, classify_column, classify_columns, normalize_column_name};
pub use config::{CleanerConfig, CleanerConfigBuilder, ConfigValidationError};
pub use error::{
    CleaningError, LoadError, PersistenceError, PipelineError, Result as CleaningResult, ResultExt,
};
pub use loader::{FormatHint, load, load_path};
pub use pipeline::{
    CleanedData, CleaningOutcome, CleaningStage, ClosureProgressReporter, Pipeline,
    PipelineBuilder, ProgressReporter, ProgressUpdate,
};
pub use reporting::{CleaningReport, ReportGenerator};
pub use table::{Cell, Column, SampleRow, Table};
pub use types::{CleaningMetrics, ColumnClassification, ColumnKind, MissingSummary};

/// Run the cleaning stages over `table`.
///
/// Shorthand for [`DataCleaner::clean`].
pub fn clean(table: Table) -> std::result::Result<(Table, CleaningMetrics), PipelineError> {
    DataCleaner.clean(table)
}
