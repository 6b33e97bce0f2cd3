//! Summary provider trait for abstracting LLM interactions.
//!
//! This module defines the [`SummaryProvider`] trait that turns the digest of
//! a cleaned table (column names plus a few sample rows) into a short prose
//! description. The cleaning pipeline never depends on a provider succeeding:
//! [`describe`] swallows every failure and returns `None`.
//!
//! # Implementing a New Provider
//!
//! 1. Create a new file in `src/ai/` (e.g., `openai.rs`)
//! 2. Implement the [`SummaryProvider`] trait for your provider struct
//! 3. Export the provider in `src/ai/mod.rs`

use crate::assembler::ResultRecord;
use crate::table::SampleRow;
use anyhow::Result;
use tracing::{debug, warn};

/// Trait for services that describe a dataset in prose.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow usage across threads.
///
/// # Error Handling
///
/// Implementations should return meaningful errors via `anyhow::Result`.
/// Callers treat any error as "no summary".
pub trait SummaryProvider: Send + Sync {
    /// Describe a dataset from its column names and first rows.
    ///
    /// The returned text is opaque to the pipeline and is passed through
    /// unchanged.
    fn summarize(&self, columns: &[String], sample: &[SampleRow]) -> Result<String>;

    /// Get the provider name for logging and debugging.
    fn name(&self) -> &str;

    /// Get the model being used by this provider.
    ///
    /// Returns `None` if the provider doesn't expose model information.
    fn model(&self) -> Option<&str> {
        None
    }
}

/// Build the analyst prompt for a dataset digest.
pub fn build_summary_prompt(columns: &[String], sample: &[SampleRow]) -> String {
    let sample_rows = serde_json::to_string_pretty(sample).unwrap_or_else(|_| "[]".to_string());
    format!(
        "You are a professional data analyst.\n\n\
        Given:\n\
        - Column names\n\
        - Top {} sample rows\n\n\
        Task:\n\
        Write a short, clear dataset description suitable for a data profiling report.\n\n\
        Rules:\n\
        - Do NOT guess missing context.\n\
        - Do NOT mention rows count unless visible.\n\
        - Keep it under 5 sentences.\n\
        - Focus on what the data represents and what analysis is possible.\n\n\
        Columns:\n{:?}\n\n\
        Sample Rows:\n{}\n",
        sample.len(),
        columns,
        sample_rows
    )
}

/// Ask `provider` to describe `record`.
///
/// Never fails: provider errors and blank answers are logged and yield `None`.
pub fn describe(provider: &dyn SummaryProvider, record: &ResultRecord) -> Option<String> {
    debug!("Requesting dataset summary from {}", provider.name());
    match provider.summarize(record.columns(), record.sample()) {
        Ok(text) if text.trim().is_empty() => {
            warn!("{} returned an empty summary", provider.name());
            None
        }
        Ok(text) => Some(text.trim().to_string()),
        Err(e) => {
            warn!("Summary generation with {} failed: {}", provider.name(), e);
            None
        }
    }
}
