//! Decoding of the `audio` column.
//!
//! Three layouts are accepted:
//! - `{"array": [...], "sampling_rate": N}` (dataset-hub layout)
//! - `{"samples": [...], "sample_rate": N}`
//! - `{"path": "clip.wav"}` when the samples were never materialized
//!
//! Sample arrays may be nested; singleton dimensions are collapsed before
//! counting, so `[[a], [b], [c]]` and `[[a, b, c]]` both hold three samples.

use crate::audio::wav::WavInfo;
use crate::error::{PhonorateError, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};

const ARRAY_KEYS: [&str; 2] = ["array", "samples"];
const RATE_KEYS: [&str; 2] = ["sampling_rate", "sample_rate"];
const PATH_KEY: &str = "path";

/// Where a record's audio lives.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioRef {
    /// Samples stored in the record itself.
    Inline { sample_count: usize, sample_rate: u32 },
    /// A WAV file; duration comes from its header.
    File { path: PathBuf },
}

/// Sample count and rate, however they were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioExtent {
    pub sample_count: usize,
    pub sample_rate: u32,
}

impl AudioRef {
    /// Interpret the `audio` cell. `column` is only used in error messages.
    pub fn parse(value: &Value, column: &str) -> Result<Self> {
        let Value::Object(fields) = value else {
            return Err(PhonorateError::missing_field(
                column,
                "audio value is not an object",
            ));
        };

        let array = ARRAY_KEYS
            .iter()
            .find_map(|key| fields.get(*key).filter(|v| !v.is_null()));

        if let Some(array) = array {
            let rate = RATE_KEYS
                .iter()
                .find_map(|key| fields.get(*key).filter(|v| !v.is_null()))
                .ok_or_else(|| {
                    PhonorateError::missing_field(column, "audio has samples but no sampling_rate")
                })?;
            let sample_rate = parse_sample_rate(rate).ok_or_else(|| {
                PhonorateError::missing_field(
                    column,
                    format!("sampling_rate must be a positive integer, got {}", rate),
                )
            })?;
            let sample_count = squeezed_len(array).map_err(|message| {
                PhonorateError::missing_field(column, format!("malformed sample array: {}", message))
            })?;
            return Ok(Self::Inline {
                sample_count,
                sample_rate,
            });
        }

        match fields.get(PATH_KEY).and_then(Value::as_str) {
            Some(path) if !path.is_empty() => Ok(Self::File {
                path: PathBuf::from(path),
            }),
            _ => Err(PhonorateError::missing_field(
                column,
                "audio has neither a sample array nor a path",
            )),
        }
    }

    /// Resolve to a sample count and rate. Relative file paths are joined onto `root`.
    pub fn extent(&self, root: Option<&Path>) -> Result<AudioExtent> {
        match self {
            Self::Inline {
                sample_count,
                sample_rate,
            } => Ok(AudioExtent {
                sample_count: *sample_count,
                sample_rate: *sample_rate,
            }),
            Self::File { path } => {
                let full = match root {
                    Some(root) if path.is_relative() => root.join(path),
                    _ => path.clone(),
                };
                let info = WavInfo::from_path(&full)?;
                Ok(AudioExtent {
                    sample_count: info.frames,
                    sample_rate: info.sample_rate,
                })
            }
        }
    }
}

fn parse_sample_rate(value: &Value) -> Option<u32> {
    if let Some(rate) = value.as_u64() {
        return u32::try_from(rate).ok().filter(|r| *r > 0);
    }
    // Some exporters write 16000.0
    let rate = value.as_f64()?;
    if rate > 0.0 && rate.fract() == 0.0 && rate <= f64::from(u32::MAX) {
        Some(rate as u32)
    } else {
        None
    }
}

/// Length of the outermost axis after dropping singleton dimensions.
fn squeezed_len(array: &Value) -> std::result::Result<usize, String> {
    let mut current = array;
    loop {
        let Value::Array(items) = current else {
            return Err(format!("expected an array, got {}", current));
        };

        if items.len() == 1
            && let Some(inner @ Value::Array(_)) = items.first()
        {
            current = inner;
            continue;
        }

        let all_numbers = items.iter().all(Value::is_number);
        let all_arrays = items.iter().all(Value::is_array);
        if !all_numbers && !all_arrays {
            return Err("array mixes numbers with other values".to_string());
        }
        return Ok(items.len());
    }
}
