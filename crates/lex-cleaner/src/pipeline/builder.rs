//! Main cleaning pipeline module.
//!
//! This module provides the core `Pipeline` struct and builder for
//! orchestrating load → clean → classify → persist → describe.

use crate::ai::{self, SummaryProvider};
use crate::assembler::{self, OutputHint, ResultRecord};
use crate::cleaner::{DataCleaner, classify_columns};
use crate::config::{CleanerConfig, ConfigValidationError};
use crate::error::{LoadError, Result, ResultExt};
use crate::loader::{self, FormatHint};
use crate::pipeline::progress::{
    CleaningStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate,
};
use crate::table::Table;
use crate::types::{CleaningMetrics, ColumnClassification};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// The in-memory product of a run, before anything is written.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedData {
    pub table: Table,
    pub metrics: CleaningMetrics,
    pub classification: ColumnClassification,
}

/// Result of a full pipeline run.
#[derive(Debug, Clone)]
pub struct CleaningOutcome {
    pub record: ResultRecord,
    /// Prose description from the summary provider, if one was set and answered.
    pub summary: Option<String>,
}

/// The main cleaning pipeline.
///
/// Use [`Pipeline::builder()`] to create a new pipeline with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use lex_cleaner::{CleanerConfig, Pipeline};
/// use lex_cleaner::ai::GeminiProvider;
/// use std::sync::Arc;
///
/// // With a summary provider and progress reporting
/// let provider = Arc::new(GeminiProvider::new(api_key)?);
///
/// let outcome = Pipeline::builder()
///     .summary_provider(provider)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .config(CleanerConfig::default())
///     .build()?
///     .process_file("data.csv")?;
///
/// // Without a provider the summary is simply `None`
/// let outcome = Pipeline::builder().build()?.process_file("data.csv")?;
/// ```
pub struct Pipeline {
    config: CleanerConfig,
    summary_provider: Option<Arc<dyn SummaryProvider>>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    cleaner: DataCleaner,
}

// Pipelines are handed to worker threads by callers.
static_assertions::assert_impl_all!(Pipeline: Send, Sync);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &CleanerConfig {
        &self.config
    }

    /// Read `path`, pick the format from its extension and run the full pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::UnsupportedFormat`] for unknown extensions and
    /// [`LoadError::Io`] if the file cannot be read. Other errors are those of
    /// [`Pipeline::process`].
    pub fn process_file(&self, path: impl AsRef<Path>) -> Result<CleaningOutcome> {
        let path = path.as_ref();
        let hint = FormatHint::from_path(path)?;
        let bytes = fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let source_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.process(&bytes, &source_name, hint)
    }

    /// Run the full pipeline over raw bytes.
    ///
    /// `source_name` names the artifact: it is written to
    /// `<output_dir>/<output_prefix>_<source_name>`.
    pub fn process(&self, bytes: &[u8], source_name: &str, hint: FormatHint) -> Result<CleaningOutcome> {
        let start_time = Instant::now();
        info!("Starting cleaning pipeline for '{}'...", source_name);

        let outcome = self
            .prepare(bytes, hint)
            .and_then(|cleaned| self.finish(&cleaned, source_name, hint))
            .context(format!("While cleaning '{}'", source_name));

        match outcome {
            Ok(outcome) => {
                info!(
                    "Cleaning pipeline finished in {:.2}s",
                    start_time.elapsed().as_secs_f64()
                );
                self.report_progress(ProgressUpdate::complete("Pipeline completed successfully"));
                Ok(outcome)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    /// Load, clean and classify without touching the filesystem.
    pub fn prepare(&self, bytes: &[u8], hint: FormatHint) -> Result<CleanedData> {
        self.report_progress(ProgressUpdate::new(
            CleaningStage::Loading,
            0.0,
            format!("Reading {} input...", hint),
        ));
        let table = loader::load(bytes, hint, &self.config)?;
        debug!("Loaded table with shape {:?}", table.shape());
        self.report_progress(ProgressUpdate::new(
            CleaningStage::Loading,
            1.0,
            format!("Loaded {} rows x {} columns", table.height(), table.width()),
        ));

        self.report_progress(ProgressUpdate::new(
            CleaningStage::Cleaning,
            0.0,
            "Normalizing, deduplicating and pruning rows...",
        ));
        let (table, metrics) = self.cleaner.clean(table)?;
        for action in &metrics.actions {
            debug!("{}", action);
        }
        self.report_progress(ProgressUpdate::new(
            CleaningStage::Cleaning,
            1.0,
            format!("{} rows remain", table.height()),
        ));

        self.report_progress(ProgressUpdate::new(
            CleaningStage::Classifying,
            0.0,
            "Classifying columns...",
        ));
        let classification = classify_columns(&table);
        info!(
            "Classified {} numeric and {} categorical columns",
            classification.numeric.len(),
            classification.categorical.len()
        );
        self.report_progress(ProgressUpdate::new(
            CleaningStage::Classifying,
            1.0,
            "Columns classified",
        ));

        Ok(CleanedData {
            table,
            metrics,
            classification,
        })
    }

    /// Persist `cleaned` and ask the summary provider, if any, to describe it.
    ///
    /// On a persistence error `cleaned` is still owned by the caller.
    pub fn finish(&self, cleaned: &CleanedData, source_name: &str, hint: FormatHint) -> Result<CleaningOutcome> {
        self.report_progress(ProgressUpdate::new(
            CleaningStage::Persisting,
            0.0,
            "Saving cleaned data...",
        ));
        let output = OutputHint::from_config(source_name, hint, &self.config);
        let record = assembler::assemble_result(
            &cleaned.table,
            &cleaned.metrics,
            &cleaned.classification,
            &output,
        )?;
        self.report_progress(ProgressUpdate::new(
            CleaningStage::Persisting,
            1.0,
            format!("Saved {}", record.cleaned_file_path().display()),
        ));

        let summary = match &self.summary_provider {
            Some(provider) => {
                self.report_progress(ProgressUpdate::new(
                    CleaningStage::Summarizing,
                    0.0,
                    format!("Requesting summary from {}...", provider.name()),
                ));
                let summary = ai::describe(provider.as_ref(), &record);
                self.report_progress(ProgressUpdate::new(
                    CleaningStage::Summarizing,
                    1.0,
                    if summary.is_some() { "Summary received" } else { "Summary unavailable" },
                ));
                summary
            }
            None => {
                debug!("No summary provider configured, skipping summary");
                None
            }
        };

        Ok(CleaningOutcome { record, summary })
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }
}

/// Builder for creating a [`Pipeline`] with custom configuration.
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<CleanerConfig>,
    summary_provider: Option<Arc<dyn SummaryProvider>>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the cleaner configuration.
    ///
    /// If not called, [`CleanerConfig::default()`] is used.
    pub fn config(mut self, config: CleanerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the provider used to describe the cleaned dataset.
    ///
    /// Without one the outcome's summary is `None`.
    pub fn summary_provider(mut self, provider: Arc<dyn SummaryProvider>) -> Self {
        self.summary_provider = Some(provider);
        self
    }

    /// Set a progress reporter.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback using a closure.
    ///
    /// Convenience over [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Pipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(Pipeline {
            config,
            summary_provider: self.summary_provider,
            progress_reporter: self.progress_reporter,
            cleaner: DataCleaner,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CleaningError;
    use crate::table::SampleRow;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    const PEOPLE: &str = "Name,Age\nann,31\nbob,27\nann,31\n";

    struct CannedProvider(&'static str);

    impl SummaryProvider for CannedProvider {
        fn summarize(&self, columns: &[String], _sample: &[SampleRow]) -> anyhow::Result<String> {
            Ok(format!("{} ({})", self.0, columns.join(", ")))
        }

        fn name(&self) -> &str {
            "canned"
        }
    }

    fn pipeline_in(dir: &TempDir) -> PipelineBuilder {
        let config = CleanerConfig::builder()
            .output_dir(dir.path())
            .build()
            .unwrap();
        Pipeline::builder().config(config)
    }

    #[test]
    fn test_pipeline_builder_default() {
        let pipeline = Pipeline::builder().build().unwrap();
        assert!(pipeline.summary_provider.is_none());
        assert_eq!(pipeline.config(), &CleanerConfig::default());
    }

    #[test]
    fn test_pipeline_builder_rejects_invalid_config() {
        let config = CleanerConfig {
            encoding_candidates: Vec::new(),
            ..Default::default()
        };
        assert!(matches!(
            Pipeline::builder().config(config).build(),
            Err(ConfigValidationError::NoEncodings)
        ));
    }

    #[test]
    fn test_pipeline_builder_with_progress_callback() {
        let call_count = Arc::new(AtomicUsize::new(0));
        let call_count_clone = call_count.clone();

        let pipeline = Pipeline::builder()
            .on_progress(move |_update| {
                call_count_clone.fetch_add(1, Ordering::SeqCst);
            })
            .build()
            .unwrap();

        pipeline.report_progress(ProgressUpdate::new(CleaningStage::Loading, 0.5, "Test"));

        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_prepare_does_not_write() {
        let dir = TempDir::new().unwrap();
        let pipeline = pipeline_in(&dir).build().unwrap();

        let cleaned = pipeline.prepare(PEOPLE.as_bytes(), FormatHint::Delimited).unwrap();

        assert_eq!(cleaned.table.shape(), (2, 2));
        assert_eq!(cleaned.metrics.removed_duplicates, 1);
        assert_eq!(cleaned.classification.numeric, ["age"]);
        assert_eq!(cleaned.classification.categorical, ["name"]);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_process_reports_stages_in_order() {
        let dir = TempDir::new().unwrap();
        let stages = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&stages);

        let outcome = pipeline_in(&dir)
            .summary_provider(Arc::new(CannedProvider("People")))
            .on_progress(move |update| {
                seen.lock()
                    .unwrap()
                    .push((update.stage, update.stage_progress))
            })
            .build()
            .unwrap()
            .process(PEOPLE.as_bytes(), "people.csv", FormatHint::Delimited)
            .unwrap();

        assert_eq!(
            *stages.lock().unwrap(),
            vec![
                (CleaningStage::Loading, 0.0),
                (CleaningStage::Loading, 1.0),
                (CleaningStage::Cleaning, 0.0),
                (CleaningStage::Cleaning, 1.0),
                (CleaningStage::Classifying, 0.0),
                (CleaningStage::Classifying, 1.0),
                (CleaningStage::Persisting, 0.0),
                (CleaningStage::Persisting, 1.0),
                (CleaningStage::Summarizing, 0.0),
                (CleaningStage::Summarizing, 1.0),
                (CleaningStage::Complete, 1.0),
            ]
        );
        assert_eq!(outcome.summary.as_deref(), Some("People (name, age)"));
        assert_eq!(
            outcome.record.cleaned_file_path(),
            dir.path().join("pro_people.csv")
        );
    }

    #[test]
    fn test_stage_end_reaches_next_stage_start() {
        let dir = TempDir::new().unwrap();
        let updates = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&updates);

        pipeline_in(&dir)
            .on_progress(move |update| seen.lock().unwrap().push(update))
            .build()
            .unwrap()
            .process(PEOPLE.as_bytes(), "people.csv", FormatHint::Delimited)
            .unwrap();

        let updates = updates.lock().unwrap();
        let persisted = updates
            .iter()
            .find(|u| u.stage == CleaningStage::Persisting && u.stage_progress == 1.0)
            .unwrap();
        assert!((persisted.progress - CleaningStage::Summarizing.base_progress()).abs() < 1e-6);
        assert!(persisted.message.ends_with("pro_people.csv"));
        assert!(updates.iter().all(|u| u.stage != CleaningStage::Summarizing));
    }

    #[test]
    fn test_process_without_provider_has_no_summary() {
        let dir = TempDir::new().unwrap();
        let outcome = pipeline_in(&dir)
            .build()
            .unwrap()
            .process(PEOPLE.as_bytes(), "people.csv", FormatHint::Delimited)
            .unwrap();
        assert!(outcome.summary.is_none());
        assert!(outcome.record.cleaned_file_path().exists());
    }

    #[test]
    fn test_failure_reports_failed_stage() {
        let last = Arc::new(Mutex::new(None));
        let seen = Arc::clone(&last);

        let result = Pipeline::builder()
            .on_progress(move |update| *seen.lock().unwrap() = Some(update.stage))
            .build()
            .unwrap()
            .process(b"", "empty.csv", FormatHint::Delimited);

        let error = result.unwrap_err();
        assert_eq!(error.error_code(), "EMPTY_INPUT");
        assert!(error.to_string().contains("empty.csv"));
        assert_eq!(*last.lock().unwrap(), Some(CleaningStage::Failed));
    }

    #[test]
    fn test_process_file_unknown_extension() {
        let result = Pipeline::builder().build().unwrap().process_file("notes.pdf");
        assert!(matches!(
            result,
            Err(CleaningError::Load(LoadError::UnsupportedFormat(_)))
        ));
    }

    #[test]
    fn test_process_file_reads_from_disk() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("people.tsv");
        fs::write(&input, "Name\tAge\nann\t31\n").unwrap();

        let outcome = pipeline_in(&dir)
            .build()
            .unwrap()
            .process_file(&input)
            .unwrap();

        let written = fs::read_to_string(dir.path().join("pro_people.tsv")).unwrap();
        assert_eq!(written, "name\tage\nann\t31\n");
        assert_eq!(outcome.record.metrics().processed_shape, (1, 2));
    }
}
