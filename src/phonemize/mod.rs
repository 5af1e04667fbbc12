//! Text-to-phoneme conversion.
//!
//! The engine is opaque to the rest of the crate: everything goes through the
//! [`Phonemizer`] trait, keyed by a language code and rendered with a
//! [`Separator`].

pub mod espeak;
pub mod executor;
pub mod phonemizer;
pub mod separator;

pub use espeak::{EspeakConfig, EspeakPhonemizer};
pub use executor::{CommandExecutor, SystemCommandExecutor};
pub use phonemizer::{MockPhonemizer, Phonemizer};
pub use separator::Separator;
