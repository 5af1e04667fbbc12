//! Speaking-rate annotation: phonemes per second of audio.

pub mod annotator;
pub mod duration;

pub use annotator::{
    Annotatable, Annotated, BatchAnnotation, RateAnnotator, RateInput, RateMeasurement,
};
pub use duration::{DurationSource, ResolvedDuration};

use crate::defaults;
use crate::error::PhonorateError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Column names the annotator reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub text: String,
    pub audio: String,
    pub speech_duration: String,
    pub speaking_rate: String,
    pub phonemes: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            text: defaults::TEXT_COLUMN.to_string(),
            audio: defaults::AUDIO_COLUMN.to_string(),
            speech_duration: defaults::SPEECH_DURATION_COLUMN.to_string(),
            speaking_rate: defaults::SPEAKING_RATE_COLUMN.to_string(),
            phonemes: defaults::PHONEMES_COLUMN.to_string(),
        }
    }
}

impl ColumnNames {
    /// Defaults with custom input columns.
    pub fn new(text: &str, audio: &str) -> Self {
        Self {
            text: text.to_string(),
            audio: audio.to_string(),
            ..Self::default()
        }
    }
}

/// What a batch does when one of its records fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Null out the failed record's outputs and keep going.
    #[default]
    Isolate,
    /// Fail the whole batch on the first bad record.
    Abort,
}

/// Coarse classification of a per-record failure, for aggregate reporting.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Phonemization,
    MissingField,
    DegenerateDuration,
    Timeout,
    Audio,
    Other,
}

impl FailureKind {
    pub fn of(error: &PhonorateError) -> Self {
        match error {
            PhonorateError::Phonemization { .. }
            | PhonorateError::PhonemizerNotFound { .. }
            | PhonorateError::CommandFailed { .. } => Self::Phonemization,
            PhonorateError::PhonemizerTimeout { .. } => Self::Timeout,
            PhonorateError::MissingField { .. } => Self::MissingField,
            PhonorateError::DegenerateDuration { .. } => Self::DegenerateDuration,
            PhonorateError::AudioDecode { .. } => Self::Audio,
            PhonorateError::RecordFailed { source, .. } => Self::of(source),
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Phonemization => "phonemization",
            Self::MissingField => "missing_field",
            Self::DegenerateDuration => "degenerate_duration",
            Self::Timeout => "timeout",
            Self::Audio => "audio",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One record that could not be annotated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordFailure {
    /// Position of the record in the annotated input.
    pub index: usize,
    pub kind: FailureKind,
    pub message: String,
}

impl RecordFailure {
    pub fn new(index: usize, error: &PhonorateError) -> Self {
        Self {
            index,
            kind: FailureKind::of(error),
            message: error.to_string(),
        }
    }
}

/// Number of whitespace-delimited tokens in a transcription.
pub fn token_count(transcription: &str) -> usize {
    transcription.split_whitespace().count()
}
