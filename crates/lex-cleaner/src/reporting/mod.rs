//! Report generation module.
//!
//! A [`CleaningReport`] condenses one pipeline run into the figures a reader
//! needs: shapes before and after, what was removed, the column breakdown, a
//! sample of the cleaned rows and the provider summary. It is used for:
//! - the human-readable CLI output (its `Display` impl)
//! - JSON file output (`--emit-report`)
//!
//! # Example
//!
//! ```rust,ignore
//! use lex_cleaner::reporting::{CleaningReport, ReportGenerator};
//!
//! let report = CleaningReport::from_outcome("data/train.csv", &outcome);
//! println!("{}", report);
//!
//! let generator = ReportGenerator::new("reports");
//! generator.write_report_to_file(&report, "train")?;
//! ```

mod generator;

pub use generator::{
    CleaningReport, ColumnBreakdown, OverviewSection, ReportGenerator, SUMMARY_UNAVAILABLE,
};
