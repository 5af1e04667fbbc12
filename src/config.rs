use crate::defaults;
use crate::error::{PhonorateError, Result};
use crate::filter::FilterConfig;
use crate::phonemize::{EspeakConfig, Separator};
use crate::rate::{ColumnNames, FailurePolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub phonemizer: PhonemizerConfig,
    pub rate: RateConfig,
    pub filter: FilterConfig,
    pub columns: ColumnNames,
    pub pipeline: PipelineConfig,
}

/// Phonemization backend configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PhonemizerConfig {
    pub language: String,
    pub binary: String,
    pub with_stress: bool,
    /// Per-call timeout; 0 disables it.
    pub timeout_ms: u64,
    pub separator: Separator,
}

/// Rate annotation configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RateConfig {
    pub duration_floor: f64,
    pub failure_policy: FailurePolicy,
    pub batch_size: usize,
}

/// Worker pool configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub num_workers: usize,
}

impl Default for PhonemizerConfig {
    fn default() -> Self {
        Self {
            language: defaults::DEFAULT_LANGUAGE.to_string(),
            binary: defaults::ESPEAK_BINARY.to_string(),
            with_stress: false,
            timeout_ms: defaults::PHONEMIZER_TIMEOUT_MS,
            separator: Separator::default(),
        }
    }
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            duration_floor: defaults::DURATION_FLOOR_SECS,
            failure_policy: FailurePolicy::default(),
            batch_size: defaults::BATCH_SIZE,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            num_workers: defaults::NUM_WORKERS,
        }
    }
}

impl PhonemizerConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }

    pub fn espeak(&self) -> EspeakConfig {
        EspeakConfig {
            binary: self.binary.clone(),
            language: self.language.clone(),
            with_stress: self.with_stress,
            timeout: self.timeout(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PhonorateError::ConfigFileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                PhonorateError::Io(e)
            }
        })?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Err(PhonorateError::ConfigFileNotFound { .. }) => Ok(Self::default()),
            other => other,
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - PHONORATE_LANGUAGE → phonemizer.language
    /// - PHONORATE_ESPEAK → phonemizer.binary
    /// - PHONORATE_NUM_WORKERS → pipeline.num_workers
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(language) = std::env::var("PHONORATE_LANGUAGE")
            && !language.is_empty()
        {
            self.phonemizer.language = language;
        }

        if let Ok(binary) = std::env::var("PHONORATE_ESPEAK")
            && !binary.is_empty()
        {
            self.phonemizer.binary = binary;
        }

        if let Ok(workers) = std::env::var("PHONORATE_NUM_WORKERS")
            && !workers.is_empty()
        {
            match workers.parse() {
                Ok(n) => self.pipeline.num_workers = n,
                Err(_) => warn!(value = %workers, "ignoring invalid PHONORATE_NUM_WORKERS"),
            }
        }

        self
    }

    /// Reject values that would make a pass meaningless.
    pub fn validate(&self) -> Result<()> {
        let invalid = |key: &str, message: &str| -> Result<()> {
            Err(PhonorateError::ConfigInvalidValue {
                key: key.to_string(),
                message: message.to_string(),
            })
        };

        if self.phonemizer.language.trim().is_empty() {
            return invalid("phonemizer.language", "must not be empty");
        }
        if !(self.rate.duration_floor.is_finite() && self.rate.duration_floor > 0.0) {
            return invalid("rate.duration_floor", "must be a positive number of seconds");
        }
        if self.rate.batch_size == 0 {
            return invalid("rate.batch_size", "must be at least 1");
        }
        if self.pipeline.num_workers == 0 {
            return invalid("pipeline.num_workers", "must be at least 1");
        }
        if !(self.filter.min_duration.is_finite() && self.filter.min_duration >= 0.0) {
            return invalid("filter.min_duration", "must be a non-negative number of seconds");
        }
        if self.filter.duration_columns.is_empty() {
            return invalid("filter.duration_columns", "must name at least one column");
        }
        Ok(())
    }

    /// Render as TOML, e.g. for `config dump`.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| PhonorateError::ConfigRender {
            message: e.to_string(),
        })
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/phonorate/config.toml on Linux
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("phonorate").join("config.toml"))
    }
}
