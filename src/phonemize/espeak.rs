//! espeak-ng phonemization backend.
//!
//! Runs `espeak-ng -q --ipa --sep=_ -v <language> --stdin` once per distinct
//! text. espeak-ng prints one line per clause, words separated by spaces and
//! phones within a word separated by `_`. That output is re-rendered with the
//! caller's [`Separator`]. Zero-width-joiner tie output (the old `--ipa=3`
//! form) is parsed the same way.
//!
//! # Requirements
//! - espeak-ng on `PATH` (or a configured binary path)
//!
//! # Installation
//! Ubuntu/Debian: `sudo apt install espeak-ng`
//! Arch: `sudo pacman -S espeak-ng`
//! macOS: `brew install espeak-ng`

use crate::defaults;
use crate::error::{PhonorateError, Result};
use crate::phonemize::executor::{CommandExecutor, SystemCommandExecutor};
use crate::phonemize::phonemizer::Phonemizer;
use crate::phonemize::separator::Separator;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

const PHONE_MARKS: [char; 2] = ['_', '\u{200d}'];
const STRESS_MARKS: [char; 2] = ['ˈ', 'ˌ'];
const CACHE_CAPACITY: usize = 4096;

/// Settings for the espeak-ng backend.
#[derive(Debug, Clone, PartialEq)]
pub struct EspeakConfig {
    pub binary: String,
    pub language: String,
    pub with_stress: bool,
    pub timeout: Option<Duration>,
}

impl Default for EspeakConfig {
    fn default() -> Self {
        Self {
            binary: defaults::ESPEAK_BINARY.to_string(),
            language: defaults::DEFAULT_LANGUAGE.to_string(),
            with_stress: false,
            timeout: Some(Duration::from_millis(defaults::PHONEMIZER_TIMEOUT_MS)),
        }
    }
}

/// Phonemizer backed by the espeak-ng command-line tool.
///
/// Holds a memo of raw espeak output keyed by text, which makes it stateful
/// and one-per-worker.
pub struct EspeakPhonemizer<E: CommandExecutor = SystemCommandExecutor> {
    executor: E,
    config: EspeakConfig,
    cache: HashMap<String, String>,
}

impl EspeakPhonemizer<SystemCommandExecutor> {
    /// Build a backend that spawns real espeak-ng processes.
    pub fn system(config: EspeakConfig) -> Result<Self> {
        let mut executor = SystemCommandExecutor::new();
        if let Some(timeout) = config.timeout {
            executor = executor.with_timeout(timeout);
        }
        Self::new(config, executor)
    }
}

impl<E: CommandExecutor> EspeakPhonemizer<E> {
    /// Create the backend, checking that espeak-ng knows the language.
    pub fn new(config: EspeakConfig, executor: E) -> Result<Self> {
        let voices_arg = format!("--voices={}", config.language);
        let listing = executor
            .execute(&config.binary, &[&voices_arg], None)
            .map_err(|e| match e {
                PhonorateError::CommandFailed { message, .. } => {
                    PhonorateError::phonemization(&config.language, message)
                }
                other => other,
            })?;

        if !language_listed(&listing) {
            return Err(PhonorateError::phonemization(
                &config.language,
                format!("language not supported by {}", config.binary),
            ));
        }

        debug!(
            binary = %config.binary,
            language = %config.language,
            "espeak-ng backend ready"
        );

        Ok(Self {
            executor,
            config,
            cache: HashMap::new(),
        })
    }

    fn raw_phonemes(&mut self, text: &str) -> Result<String> {
        if let Some(hit) = self.cache.get(text) {
            return Ok(hit.clone());
        }

        let args = [
            "-q",
            "--ipa",
            "--sep=_",
            "-v",
            self.config.language.as_str(),
            "--stdin",
        ];
        let raw = self
            .executor
            .execute(&self.config.binary, &args, Some(text))
            .map_err(|e| match e {
                PhonorateError::CommandFailed { message, .. } => {
                    PhonorateError::phonemization(&self.config.language, message)
                }
                other => other,
            })?;

        if self.cache.len() >= CACHE_CAPACITY {
            self.cache.clear();
        }
        self.cache.insert(text.to_string(), raw.clone());
        Ok(raw)
    }
}

impl<E: CommandExecutor> Phonemizer for EspeakPhonemizer<E> {
    fn phonemize(&mut self, text: &str, separator: &Separator) -> Result<String> {
        let raw = self.raw_phonemes(text)?;
        let words = parse_ipa_output(&raw, self.config.with_stress);
        if words.is_empty() {
            return Err(PhonorateError::phonemization(
                &self.config.language,
                format!("no phonemes produced for {:?}", text),
            ));
        }
        // espeak-ng marks no syllable boundaries: one syllable per word.
        Ok(separator.render(words.into_iter().map(|phones| vec![phones])))
    }

    fn language(&self) -> &str {
        &self.config.language
    }

    fn backend_name(&self) -> &str {
        "espeak-ng"
    }
}

/// Whether a `--voices=<lang>` listing contains at least one voice.
///
/// The first non-empty line is the column header.
pub fn language_listed(listing: &str) -> bool {
    listing
        .lines()
        .filter(|line| !line.trim().is_empty())
        .nth(1)
        .is_some()
}

/// Split IPA output into words of phones, dropping stress marks unless kept.
pub fn parse_ipa_output(raw: &str, with_stress: bool) -> Vec<Vec<String>> {
    raw.split_whitespace()
        .map(|word| {
            word.split(PHONE_MARKS)
                .map(|phone| {
                    if with_stress {
                        phone.to_string()
                    } else {
                        phone.chars().filter(|c| !STRESS_MARKS.contains(c)).collect()
                    }
                })
                .filter(|phone: &String| !phone.is_empty())
                .collect::<Vec<String>>()
        })
        .filter(|phones| !phones.is_empty())
        .collect()
}
