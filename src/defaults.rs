//! Default configuration constants for phonorate.
//!
//! Shared between the config file defaults, the CLI and the library types so
//! every entry point agrees on the same values.

/// Default phonemization language (espeak-ng voice code).
pub const DEFAULT_LANGUAGE: &str = "en-us";

/// Default espeak-ng executable name, looked up on `PATH`.
pub const ESPEAK_BINARY: &str = "espeak-ng";

/// Default per-call phonemizer timeout in milliseconds.
pub const PHONEMIZER_TIMEOUT_MS: u64 = 10_000;

/// Default word boundary marker in phoneme transcriptions.
pub const WORD_SEPARATOR: &str = " ";

/// Duration substituted for a precomputed duration of exactly zero, in seconds.
///
/// Only keeps the rate finite; the resulting rate is not meaningful.
pub const DURATION_FLOOR_SECS: f64 = 0.01;

/// Minimum speech duration (exclusive) for a record to pass the filter, in seconds.
pub const MIN_SPEECH_DURATION_SECS: f64 = 0.1;

/// Minimum WAV file size (exclusive) for a record to pass the filter, in bytes.
pub const MIN_WAV_FILESIZE_BYTES: u64 = 2000;

/// Text values that mean "no transcript".
pub const REJECT_TEXTS: [&str; 2] = ["", "--"];

/// Default text column name.
pub const TEXT_COLUMN: &str = "text";

/// Default audio column name.
pub const AUDIO_COLUMN: &str = "audio";

/// Precomputed duration column consulted by the annotator.
pub const SPEECH_DURATION_COLUMN: &str = "speech_duration";

/// Duration columns consulted by the filter, first present wins.
pub const FILTER_DURATION_COLUMNS: [&str; 2] = ["duration", "speech_duration"];

/// File size column consulted by the filter.
pub const WAV_FILESIZE_COLUMN: &str = "wav_filesize";

/// Output column for the computed speaking rate.
pub const SPEAKING_RATE_COLUMN: &str = "speaking_rate";

/// Output column for the phoneme transcription.
pub const PHONEMES_COLUMN: &str = "phonemes";

/// Default number of worker threads for dataset passes.
pub const NUM_WORKERS: usize = 8;

/// Default number of records per annotation batch.
pub const BATCH_SIZE: usize = 100;

/// Default dataset split name.
pub const DEFAULT_SPLIT: &str = "train";

/// Number of records printed by a dry run.
pub const DRY_RUN_PREVIEW: usize = 5;

/// Default output directory for the filtering pass.
pub const FILTER_OUTPUT_DIR: &str = "./filtered_dataset";

/// Default output directory for the rate annotation pass.
pub const RATE_OUTPUT_DIR: &str = "./rated_dataset";
