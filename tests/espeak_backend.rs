use phonorate::phonemize::{EspeakConfig, EspeakPhonemizer, Phonemizer, Separator};
use phonorate::{ColumnNames, PhonorateError, RateAnnotator, Record};
use serde_json::Value;
use std::process::Command;

fn espeak_available() -> bool {
    let found = Command::new("espeak-ng")
        .arg("--version")
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false);
    if !found {
        eprintln!("\n╔══════════════════════════════════════════════════════════════╗");
        eprintln!("║  ESPEAK-NG NOT FOUND — SKIPPING BACKEND TESTS                ║");
        eprintln!("║                                                              ║");
        eprintln!("║  Install it with:                                            ║");
        eprintln!("║    sudo apt install espeak-ng                                ║");
        eprintln!("╚══════════════════════════════════════════════════════════════╝\n");
    }
    found
}

#[test]
fn phonemizes_english_one_token_per_word() {
    if !espeak_available() {
        return;
    }
    let mut phonemizer = EspeakPhonemizer::system(EspeakConfig::default()).unwrap();

    let phonemes = phonemizer
        .phonemize("hello world", &Separator::default())
        .unwrap();

    assert_eq!(phonemes.split_whitespace().count(), 2, "got: {}", phonemes);
    assert!(!phonemes.contains('ˈ'), "stress marks should be stripped: {}", phonemes);
    assert!(!phonemes.contains('_'), "phone marks should be removed: {}", phonemes);
    assert!(!phonemes.contains('\u{200d}'), "tie marks should be removed: {}", phonemes);
}

#[test]
fn phone_separator_is_applied() {
    if !espeak_available() {
        return;
    }
    let mut phonemizer = EspeakPhonemizer::system(EspeakConfig::default()).unwrap();

    let phonemes = phonemizer
        .phonemize("cat", &Separator::new(" ", "", "|"))
        .unwrap();
    assert!(phonemes.contains('|'), "got: {}", phonemes);
    assert_eq!(phonemes.split('|').count(), 3, "got: {}", phonemes);
}

#[test]
fn unknown_language_is_rejected_at_construction() {
    if !espeak_available() {
        return;
    }
    let config = EspeakConfig {
        language: "zz-not-a-language".to_string(),
        ..EspeakConfig::default()
    };
    assert!(matches!(
        EspeakPhonemizer::system(config),
        Err(PhonorateError::Phonemization { .. })
    ));
}

#[test]
fn annotates_record_with_real_backend() {
    if !espeak_available() {
        return;
    }
    let phonemizer = EspeakPhonemizer::system(EspeakConfig::default()).unwrap();
    let record = Record::new()
        .with("text", "the quick brown fox")
        .with("speech_duration", 2.0);

    let out = RateAnnotator::new(phonemizer)
        .annotate_record(record, &ColumnNames::default())
        .unwrap();

    assert_eq!(out.get("speaking_rate").and_then(Value::as_f64), Some(2.0));
}

#[test]
fn missing_binary_is_reported() {
    let config = EspeakConfig {
        binary: "nonexistent-espeak-xyz-12345".to_string(),
        ..EspeakConfig::default()
    };
    assert!(matches!(
        EspeakPhonemizer::system(config),
        Err(PhonorateError::PhonemizerNotFound { .. })
    ));
}
