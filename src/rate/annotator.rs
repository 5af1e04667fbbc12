use crate::dataset::{Batch, Record};
use crate::defaults;
use crate::error::{PhonorateError, Result};
use crate::phonemize::{Phonemizer, Separator};
use crate::rate::duration::{self, ResolvedDuration};
use crate::rate::{ColumnNames, FailurePolicy, RecordFailure, token_count};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::warn;

/// The cells of one logical record that the rate computation reads.
///
/// Built from either a [`Record`] or one row of a [`Batch`], so both shapes
/// share a single computation.
#[derive(Debug, Clone, Copy)]
pub struct RateInput<'a> {
    pub text: Option<&'a Value>,
    pub speech_duration: Option<&'a Value>,
    pub audio: Option<&'a Value>,
    pub columns: &'a ColumnNames,
}

impl<'a> RateInput<'a> {
    pub fn from_record(record: &'a Record, columns: &'a ColumnNames) -> Self {
        Self {
            text: record.present(&columns.text),
            speech_duration: record.present(&columns.speech_duration),
            audio: record.present(&columns.audio),
            columns,
        }
    }

    pub fn from_batch_row(batch: &'a Batch, columns: &'a ColumnNames, row: usize) -> Self {
        Self {
            text: batch.cell(&columns.text, row),
            speech_duration: batch.cell(&columns.speech_duration, row),
            audio: batch.cell(&columns.audio, row),
            columns,
        }
    }
}

/// Everything computed for one record.
#[derive(Debug, Clone, PartialEq)]
pub struct RateMeasurement {
    pub phonemes: String,
    pub token_count: usize,
    pub duration: ResolvedDuration,
    pub speaking_rate: f64,
}

/// Input shape for [`RateAnnotator::annotate`].
#[derive(Debug, Clone, PartialEq)]
pub enum Annotatable {
    Single(Record),
    Batch(Batch),
}

/// Output shape of [`RateAnnotator::annotate`], mirroring the input.
#[derive(Debug, Clone, PartialEq)]
pub enum Annotated {
    Single(Record),
    Batch(BatchAnnotation),
}

/// An annotated batch plus the records that could not be annotated.
///
/// Failed records keep their position and get `null` outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchAnnotation {
    pub batch: Batch,
    pub failures: Vec<RecordFailure>,
}

impl BatchAnnotation {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Annotates records with `phonemes` and `speaking_rate`.
///
/// Owns its phonemizer exclusively. Build one per worker.
pub struct RateAnnotator<P: Phonemizer> {
    phonemizer: P,
    separator: Separator,
    duration_floor: f64,
    failure_policy: FailurePolicy,
    audio_root: Option<PathBuf>,
}

impl<P: Phonemizer> RateAnnotator<P> {
    pub fn new(phonemizer: P) -> Self {
        Self {
            phonemizer,
            separator: Separator::default(),
            duration_floor: defaults::DURATION_FLOOR_SECS,
            failure_policy: FailurePolicy::default(),
            audio_root: None,
        }
    }

    pub fn with_separator(mut self, separator: Separator) -> Self {
        self.separator = separator;
        self
    }

    /// Seconds substituted for a precomputed duration of zero.
    pub fn with_duration_floor(mut self, floor: f64) -> Self {
        self.duration_floor = floor;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Directory that relative WAV paths in the audio column resolve against.
    pub fn with_audio_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.audio_root = Some(root.into());
        self
    }

    pub fn language(&self) -> &str {
        self.phonemizer.language()
    }

    pub fn separator(&self) -> &Separator {
        &self.separator
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    pub fn phonemizer(&self) -> &P {
        &self.phonemizer
    }

    pub fn audio_root(&self) -> Option<&Path> {
        self.audio_root.as_deref()
    }

    /// Compute the speaking rate of one logical record.
    pub fn measure(&mut self, input: RateInput<'_>) -> Result<RateMeasurement> {
        let duration = duration::resolve(
            input.speech_duration,
            input.audio,
            input.columns,
            self.audio_root.as_deref(),
            self.duration_floor,
        )?;

        let text = self.transcript(input.text, &input.columns.text)?;
        let phonemes = self.phonemizer.phonemize(text, &self.separator)?;
        let tokens = token_count(&phonemes);
        let speaking_rate = tokens as f64 / duration.seconds;

        if !speaking_rate.is_finite() {
            return Err(PhonorateError::degenerate(format!(
                "{} tokens over {} s is not a finite rate",
                tokens, duration.seconds
            )));
        }

        Ok(RateMeasurement {
            phonemes,
            token_count: tokens,
            duration,
            speaking_rate,
        })
    }

    /// Annotate a single record. Existing outputs are overwritten.
    pub fn annotate_record(&mut self, mut record: Record, columns: &ColumnNames) -> Result<Record> {
        let measurement = self.measure(RateInput::from_record(&record, columns))?;
        record.insert(&columns.speaking_rate, measurement.speaking_rate);
        record.insert(&columns.phonemes, measurement.phonemes);
        Ok(record)
    }

    /// Annotate every row of a batch, in order.
    ///
    /// Under [`FailurePolicy::Isolate`] failed rows get `null` outputs and are
    /// listed in the result. Under [`FailurePolicy::Abort`] the first failure
    /// is returned as [`PhonorateError::RecordFailed`].
    pub fn annotate_batch(&mut self, mut batch: Batch, columns: &ColumnNames) -> Result<BatchAnnotation> {
        let mut rates = Vec::with_capacity(batch.len());
        let mut phonemes = Vec::with_capacity(batch.len());
        let mut failures = Vec::new();

        for row in 0..batch.len() {
            match self.measure(RateInput::from_batch_row(&batch, columns, row)) {
                Ok(measurement) => {
                    rates.push(Value::from(measurement.speaking_rate));
                    phonemes.push(Value::from(measurement.phonemes));
                }
                Err(err) if self.failure_policy == FailurePolicy::Abort => {
                    return Err(PhonorateError::RecordFailed {
                        index: row,
                        source: Box::new(err),
                    });
                }
                Err(err) => {
                    warn!(row, error = %err, "record not annotated");
                    failures.push(RecordFailure::new(row, &err));
                    rates.push(Value::Null);
                    phonemes.push(Value::Null);
                }
            }
        }

        batch.set_column(&columns.speaking_rate, rates)?;
        batch.set_column(&columns.phonemes, phonemes)?;
        Ok(BatchAnnotation { batch, failures })
    }

    /// Dispatch on the input shape.
    pub fn annotate(&mut self, input: Annotatable, columns: &ColumnNames) -> Result<Annotated> {
        match input {
            Annotatable::Single(record) => self.annotate_record(record, columns).map(Annotated::Single),
            Annotatable::Batch(batch) => self.annotate_batch(batch, columns).map(Annotated::Batch),
        }
    }

    fn transcript<'v>(&self, value: Option<&'v Value>, column: &str) -> Result<&'v str> {
        let language = self.phonemizer.language();
        match value {
            Some(Value::String(text)) if !text.trim().is_empty() => Ok(text.as_str()),
            Some(Value::String(_)) => Err(PhonorateError::phonemization(
                language,
                format!("column '{}' is empty", column),
            )),
            Some(other) => Err(PhonorateError::phonemization(
                language,
                format!("column '{}' is not a string: {}", column, other),
            )),
            None => Err(PhonorateError::phonemization(
                language,
                format!("record has no '{}'", column),
            )),
        }
    }
}
