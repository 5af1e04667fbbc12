use crate::error::{PhonorateError, Result};
use crate::phonemize::separator::Separator;

/// Trait for text-to-phoneme conversion.
///
/// Implementations may hold process-local state (a subprocess handle, a memo
/// cache), so the trait takes `&mut self` and is not `Sync`. Each worker owns
/// its own instance.
pub trait Phonemizer {
    /// Convert `text` into a phoneme transcription rendered with `separator`.
    fn phonemize(&mut self, text: &str, separator: &Separator) -> Result<String>;

    /// Language code this instance was built for.
    fn language(&self) -> &str;

    /// Short backend name for logs.
    fn backend_name(&self) -> &str;
}

impl<T: Phonemizer + ?Sized> Phonemizer for Box<T> {
    fn phonemize(&mut self, text: &str, separator: &Separator) -> Result<String> {
        (**self).phonemize(text, separator)
    }

    fn language(&self) -> &str {
        (**self).language()
    }

    fn backend_name(&self) -> &str {
        (**self).backend_name()
    }
}

/// Deterministic phonemizer for testing.
///
/// Every alphabetic character becomes one phone and every whitespace-separated
/// word becomes one word, so `"hello world"` yields two tokens with the default
/// separator.
#[derive(Debug, Clone)]
pub struct MockPhonemizer {
    language: String,
    should_fail: bool,
    fail_on: Vec<String>,
    calls: usize,
}

impl MockPhonemizer {
    pub fn new(language: &str) -> Self {
        Self {
            language: language.to_string(),
            should_fail: false,
            fail_on: Vec::new(),
            calls: 0,
        }
    }

    /// Configure the mock to fail on every call
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Configure the mock to fail only for this exact text
    pub fn failing_on(mut self, text: &str) -> Self {
        self.fail_on.push(text.to_string());
        self
    }

    /// Number of phonemize calls so far
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl Phonemizer for MockPhonemizer {
    fn phonemize(&mut self, text: &str, separator: &Separator) -> Result<String> {
        self.calls += 1;
        if self.should_fail || self.fail_on.iter().any(|t| t == text) {
            return Err(PhonorateError::phonemization(
                &self.language,
                "mock phonemization failure",
            ));
        }

        let words = text.split_whitespace().map(|word| {
            let phones: Vec<String> = word
                .chars()
                .filter(|c| c.is_alphabetic())
                .flat_map(char::to_lowercase)
                .map(String::from)
                .collect();
            vec![phones]
        });
        Ok(separator.render(words))
    }

    fn language(&self) -> &str {
        &self.language
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}
