//! Boundary markers used to render a phoneme transcription.

use crate::defaults;
use serde::{Deserialize, Serialize};

/// Word, syllable and phone boundary markers.
///
/// The default (`" "`, `""`, `""`) renders one whitespace-delimited token per
/// word, which is what the speaking rate counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Separator {
    pub word: String,
    pub syllable: String,
    pub phone: String,
}

impl Default for Separator {
    fn default() -> Self {
        Self {
            word: defaults::WORD_SEPARATOR.to_string(),
            syllable: String::new(),
            phone: String::new(),
        }
    }
}

impl Separator {
    pub fn new(word: &str, syllable: &str, phone: &str) -> Self {
        Self {
            word: word.to_string(),
            syllable: syllable.to_string(),
            phone: phone.to_string(),
        }
    }

    /// Render words made of syllables made of phones.
    ///
    /// Empty phones, syllables and words are skipped so no doubled markers appear.
    pub fn render<W, S, P>(&self, words: W) -> String
    where
        W: IntoIterator<Item = S>,
        S: IntoIterator<Item = P>,
        P: IntoIterator<Item = String>,
    {
        let rendered: Vec<String> = words
            .into_iter()
            .map(|syllables| {
                let parts: Vec<String> = syllables
                    .into_iter()
                    .map(|phones| {
                        let phones: Vec<String> =
                            phones.into_iter().filter(|p| !p.is_empty()).collect();
                        phones.join(&self.phone)
                    })
                    .filter(|s| !s.is_empty())
                    .collect();
                parts.join(&self.syllable)
            })
            .filter(|w| !w.is_empty())
            .collect();
        rendered.join(&self.word)
    }
}
