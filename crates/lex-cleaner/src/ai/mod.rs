//! AI module for natural-language dataset summaries.
//!
//! The cleaning pipeline emits a neutral digest (column names plus sample
//! rows). A [`SummaryProvider`] turns that digest into prose. Providers are
//! optional collaborators: the pipeline runs and is fully testable without one.
//!
//! # Feature Flag
//!
//! The [`SummaryProvider`] trait is always available for custom
//! implementations. The concrete [`GeminiProvider`] requires the `ai` feature.
//!
//! ```toml
//! # Enable AI support (default)
//! lex_cleaner = { version = "0.1", features = ["ai"] }
//!
//! # Disable AI support for smaller binary
//! lex_cleaner = { version = "0.1", default-features = false }
//! ```

// Provider trait is always available (for custom implementations)
mod provider;
pub use provider::{SummaryProvider, build_summary_prompt, describe};

// Concrete providers require the "ai" feature
#[cfg(feature = "ai")]
mod gemini;

#[cfg(feature = "ai")]
pub use gemini::GeminiProvider;
