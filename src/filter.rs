//! Record validity predicate used before publishing a dataset.
//!
//! A record passes when it has a real transcript, enough speech and a WAV file
//! that is not trivially small. Missing or malformed fields fail their check;
//! the predicate never errors.

use crate::dataset::{Batch, Record};
use crate::defaults;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Thresholds and column names for [`ValidityFilter`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Exclusive lower bound on duration, seconds.
    pub min_duration: f64,
    /// Exclusive lower bound on WAV file size, bytes.
    pub min_filesize: u64,
    pub text_column: String,
    /// Duration columns in lookup order; the first non-null one is used.
    pub duration_columns: Vec<String>,
    pub filesize_column: String,
    /// Transcripts that mean "no transcript".
    pub reject_texts: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_duration: defaults::MIN_SPEECH_DURATION_SECS,
            min_filesize: defaults::MIN_WAV_FILESIZE_BYTES,
            text_column: defaults::TEXT_COLUMN.to_string(),
            duration_columns: defaults::FILTER_DURATION_COLUMNS
                .iter()
                .map(|c| c.to_string())
                .collect(),
            filesize_column: defaults::WAV_FILESIZE_COLUMN.to_string(),
            reject_texts: defaults::REJECT_TEXTS.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// Which check a record failed first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    Text,
    Duration,
    Filesize,
}

impl Rejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Duration => "duration",
            Self::Filesize => "filesize",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pure predicate; cheap to share across threads by reference.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidityFilter {
    config: FilterConfig,
}

impl ValidityFilter {
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn is_valid(&self, record: &Record) -> bool {
        self.rejection(record).is_none()
    }

    /// First failed check, or `None` when the record is valid.
    pub fn rejection(&self, record: &Record) -> Option<Rejection> {
        let duration = self
            .config
            .duration_columns
            .iter()
            .find_map(|column| record.present(column));
        self.check(
            record.present(&self.config.text_column),
            duration,
            record.present(&self.config.filesize_column),
        )
    }

    /// Evaluate every row of a batch, in order.
    pub fn mask(&self, batch: &Batch) -> Vec<bool> {
        (0..batch.len())
            .map(|row| {
                let duration = self
                    .config
                    .duration_columns
                    .iter()
                    .find_map(|column| batch.cell(column, row));
                self.check(
                    batch.cell(&self.config.text_column, row),
                    duration,
                    batch.cell(&self.config.filesize_column, row),
                )
                .is_none()
            })
            .collect()
    }

    fn check(
        &self,
        text: Option<&Value>,
        duration: Option<&Value>,
        filesize: Option<&Value>,
    ) -> Option<Rejection> {
        let text_ok = match text {
            Some(Value::String(text)) => !self.config.reject_texts.iter().any(|r| r == text),
            _ => false,
        };
        if !text_ok {
            return Some(Rejection::Text);
        }

        // NaN and non-numbers compare false and are rejected.
        let duration_ok = duration
            .and_then(Value::as_f64)
            .is_some_and(|d| d > self.config.min_duration);
        if !duration_ok {
            return Some(Rejection::Duration);
        }

        let filesize_ok = filesize
            .and_then(Value::as_f64)
            .is_some_and(|size| size > self.config.min_filesize as f64);
        if !filesize_ok {
            return Some(Rejection::Filesize);
        }

        None
    }
}
