//! WAV header inspection for audio columns that point at files on disk.

use crate::error::{PhonorateError, Result};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Frame count and sample rate of a WAV stream, without decoding samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavInfo {
    /// Samples per channel.
    pub frames: usize,
    pub sample_rate: u32,
    pub channels: u16,
}

impl WavInfo {
    /// Read the header from any reader (for testing/flexibility).
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let wav_reader = hound::WavReader::new(reader).map_err(|e| PhonorateError::AudioDecode {
            message: format!("Failed to parse WAV header: {}", e),
        })?;

        let spec = wav_reader.spec();
        Ok(Self {
            frames: wav_reader.duration() as usize,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
        })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| PhonorateError::AudioDecode {
            message: format!("Failed to open {}: {}", path.display(), e),
        })?;
        Self::from_reader(BufReader::new(file))
    }
}
