//! Duration resolution for one record.
//!
//! Exactly one source is consulted: a non-null precomputed duration wins over
//! the audio column. Both paths go through the same validation, so the
//! duration handed to the rate computation is always finite and positive.

use crate::audio::{AudioExtent, AudioRef};
use crate::error::{PhonorateError, Result};
use crate::rate::ColumnNames;
use serde_json::Value;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationSource {
    /// The precomputed `speech_duration` column.
    Precomputed,
    /// Sample array stored in the record.
    Samples,
    /// WAV header of a file referenced by the record.
    WavFile,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedDuration {
    pub seconds: f64,
    pub source: DurationSource,
    /// True when a zero duration was replaced by the floor.
    pub floored: bool,
}

/// Resolve the duration of one record.
pub fn resolve(
    speech_duration: Option<&Value>,
    audio: Option<&Value>,
    columns: &ColumnNames,
    audio_root: Option<&Path>,
    floor: f64,
) -> Result<ResolvedDuration> {
    if let Some(value) = speech_duration {
        return from_precomputed(value, &columns.speech_duration, floor);
    }

    let Some(audio) = audio else {
        return Err(PhonorateError::missing_field(
            &columns.audio,
            format!(
                "record has neither '{}' nor '{}'",
                columns.speech_duration, columns.audio
            ),
        ));
    };

    let audio = AudioRef::parse(audio, &columns.audio)?;
    let source = match audio {
        AudioRef::Inline { .. } => DurationSource::Samples,
        AudioRef::File { .. } => DurationSource::WavFile,
    };
    from_extent(audio.extent(audio_root)?, source)
}

/// Precomputed seconds. Exactly zero becomes `floor`; negatives are rejected.
pub fn from_precomputed(value: &Value, column: &str, floor: f64) -> Result<ResolvedDuration> {
    let seconds = value.as_f64().ok_or_else(|| {
        PhonorateError::missing_field(
            column,
            format!("expected a number of seconds, got {}", value),
        )
    })?;

    if !seconds.is_finite() || seconds < 0.0 {
        return Err(PhonorateError::degenerate(format!(
            "'{}' is {}",
            column, seconds
        )));
    }

    let floored = seconds == 0.0;
    Ok(ResolvedDuration {
        seconds: if floored { floor } else { seconds },
        source: DurationSource::Precomputed,
        floored,
    })
}

/// `sample_count / sample_rate`. An empty clip is an error, never a division by zero.
pub fn from_extent(extent: AudioExtent, source: DurationSource) -> Result<ResolvedDuration> {
    if extent.sample_rate == 0 {
        return Err(PhonorateError::degenerate("sample rate is zero"));
    }
    if extent.sample_count == 0 {
        return Err(PhonorateError::degenerate("audio has no samples"));
    }

    Ok(ResolvedDuration {
        seconds: extent.sample_count as f64 / f64::from(extent.sample_rate),
        source,
        floored: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::DURATION_FLOOR_SECS;
    use serde_json::json;

    fn resolve_default(
        speech_duration: Option<Value>,
        audio: Option<Value>,
    ) -> Result<ResolvedDuration> {
        resolve(
            speech_duration.as_ref(),
            audio.as_ref(),
            &ColumnNames::default(),
            None,
            DURATION_FLOOR_SECS,
        )
    }

    #[test]
    fn zero_precomputed_duration_uses_floor() {
        let resolved = resolve_default(Some(json!(0)), None).unwrap();
        assert_eq!(resolved.seconds, 0.01);
        assert!(resolved.floored);
        assert_eq!(resolved.source, DurationSource::Precomputed);

        let resolved = resolve_default(Some(json!(0.0)), None).unwrap();
        assert_eq!(resolved.seconds, 0.01);
    }

    #[test]
    fn positive_precomputed_duration_is_used_as_is() {
        let resolved = resolve_default(Some(json!(2.5)), None).unwrap();
        assert_eq!(resolved.seconds, 2.5);
        assert!(!resolved.floored);
    }

    #[test]
    fn precomputed_wins_over_audio() {
        let audio = json!({"array": vec![0.0; 16000], "sampling_rate": 16000});
        let resolved = resolve_default(Some(json!(4.0)), Some(audio)).unwrap();
        assert_eq!(resolved.seconds, 4.0);
        assert_eq!(resolved.source, DurationSource::Precomputed);
    }

    #[test]
    fn derived_duration_from_samples() {
        let audio = json!({"array": vec![0.0; 16000], "sampling_rate": 16000});
        let resolved = resolve_default(None, Some(audio)).unwrap();
        assert_eq!(resolved.seconds, 1.0);
        assert_eq!(resolved.source, DurationSource::Samples);
    }

    #[test]
    fn empty_audio_is_degenerate() {
        let audio = json!({"array": [], "sampling_rate": 16000});
        assert!(matches!(
            resolve_default(None, Some(audio)),
            Err(PhonorateError::DegenerateDuration { .. })
        ));
    }

    #[test]
    fn negative_precomputed_is_degenerate() {
        assert!(matches!(
            resolve_default(Some(json!(-1.0)), None),
            Err(PhonorateError::DegenerateDuration { .. })
        ));
    }

    #[test]
    fn non_numeric_precomputed_is_missing_field() {
        match resolve_default(Some(json!("2.0")), None) {
            Err(PhonorateError::MissingField { field, .. }) => {
                assert_eq!(field, "speech_duration")
            }
            other => panic!("Expected MissingField error, got {:?}", other),
        }
    }

    #[test]
    fn no_source_is_missing_field() {
        match resolve_default(None, None) {
            Err(PhonorateError::MissingField { field, message }) => {
                assert_eq!(field, "audio");
                assert!(message.contains("speech_duration"));
            }
            other => panic!("Expected MissingField error, got {:?}", other),
        }
    }

    #[test]
    fn zero_rate_extent_is_degenerate() {
        let extent = AudioExtent {
            sample_count: 10,
            sample_rate: 0,
        };
        assert!(from_extent(extent, DurationSource::WavFile).is_err());
    }

    #[test]
    fn custom_floor_is_applied() {
        let resolved = from_precomputed(&json!(0), "speech_duration", 0.5).unwrap();
        assert_eq!(resolved.seconds, 0.5);
    }
}
