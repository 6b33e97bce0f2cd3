//! Pipeline module.
//!
//! This module provides the end-to-end cleaning pipeline and its progress
//! reporting.

mod builder;
pub mod progress;

pub use builder::{CleanedData, CleaningOutcome, Pipeline, PipelineBuilder};
pub use progress::{ClosureProgressReporter, CleaningStage, ProgressReporter, ProgressUpdate};
