//! phonorate - speaking-rate annotation and audio filtering for speech datasets
//!
//! Annotates records with phonemes per second of audio and drops records
//! unfit for training.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod dataset;
pub mod defaults;
#[cfg(feature = "cli")]
pub mod diagnostics;
pub mod error;
pub mod filter;
pub mod logging;
pub mod phonemize;
pub mod pipeline;
pub mod rate;

// Core traits and types
pub use dataset::{Batch, Record};
pub use filter::{FilterConfig, ValidityFilter};
pub use phonemize::{EspeakPhonemizer, MockPhonemizer, Phonemizer, Separator};
pub use rate::{Annotatable, Annotated, ColumnNames, FailurePolicy, RateAnnotator};

// Pipeline
pub use pipeline::{AnnotationJob, AnnotationReport, FilterReport, run_annotation, run_filter};

// Error handling
pub use error::{PhonorateError, Result};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
