//! System diagnostics and dependency checking.
//!
//! Verifies that espeak-ng is installed and knows the configured language.

use crate::error::PhonorateError;
use crate::phonemize::espeak::language_listed;
use crate::phonemize::{CommandExecutor, EspeakConfig, SystemCommandExecutor};
use owo_colors::OwoColorize;

/// Result of a dependency check.
#[derive(Debug, PartialEq)]
pub enum CheckResult {
    /// Tool is installed and working; carries its version line
    Ok(String),
    /// Tool is not found
    NotFound,
    /// Tool is found but has issues (e.g., language not installed)
    Warning(String),
}

impl CheckResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, CheckResult::Ok(_))
    }
}

/// Check that the espeak-ng binary runs.
pub fn check_espeak<E: CommandExecutor>(executor: &E, binary: &str) -> CheckResult {
    match executor.execute(binary, &["--version"], None) {
        Ok(output) => CheckResult::Ok(output.lines().next().unwrap_or_default().trim().to_string()),
        Err(PhonorateError::PhonemizerNotFound { .. }) => CheckResult::NotFound,
        Err(e) => CheckResult::Warning(format!("'{}' found but --version failed: {}", binary, e)),
    }
}

/// Check that espeak-ng has a voice for `language`.
pub fn check_language<E: CommandExecutor>(executor: &E, binary: &str, language: &str) -> CheckResult {
    let voices_arg = format!("--voices={}", language);
    match executor.execute(binary, &[&voices_arg], None) {
        Ok(listing) if language_listed(&listing) => CheckResult::Ok(language.to_string()),
        Ok(_) => CheckResult::Warning(format!(
            "no espeak-ng voice for '{}' (list voices with: {} --voices)",
            language, binary
        )),
        Err(PhonorateError::PhonemizerNotFound { .. }) => CheckResult::NotFound,
        Err(e) => CheckResult::Warning(format!("Error listing voices: {}", e)),
    }
}

/// Run all checks, print results, and report whether everything passed.
pub fn check_dependencies(config: &EspeakConfig) -> bool {
    let executor = SystemCommandExecutor::new();
    println!("Checking system dependencies...\n");

    print!("espeak-ng ({}): ", config.binary);
    match check_espeak(&executor, &config.binary) {
        CheckResult::Ok(version) => println!("{} {}", "✓".green(), version),
        CheckResult::NotFound => {
            println!("{}", "✗ NOT FOUND".red());
            println!("  Install: sudo apt install espeak-ng  (Debian/Ubuntu)");
            println!("           sudo pacman -S espeak-ng    (Arch)");
            println!("           brew install espeak-ng      (macOS)");
            return false;
        }
        CheckResult::Warning(msg) => {
            println!("{} {}", "⚠ WARNING:".yellow(), msg);
            return false;
        }
    }

    print!("Language '{}': ", config.language);
    match check_language(&executor, &config.binary, &config.language) {
        CheckResult::Ok(_) => {
            println!("{}", "✓ OK".green());
            true
        }
        CheckResult::NotFound => {
            println!("{}", "✗ NOT FOUND".red());
            false
        }
        CheckResult::Warning(msg) => {
            println!("{} {}", "⚠ WARNING:".yellow(), msg);
            false
        }
    }
}
