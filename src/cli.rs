//! Command-line interface for phonorate
//!
//! Provides argument parsing using clap derive macros.

use crate::defaults;
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use std::time::Duration;

/// Speaking-rate annotation and audio filtering for speech datasets
#[derive(Parser, Debug)]
#[command(
    name = "phonorate",
    version,
    about = "Speaking-rate annotation and audio filtering for speech datasets"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (-v: debug, -vv: trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Annotate each record with phonemes and speaking rate
    Rate(RateArgs),

    /// Drop records with missing text, too little speech or tiny WAV files
    Filter(FilterArgs),

    /// Check that espeak-ng is installed and supports the language
    Check {
        /// espeak-ng voice to check (default: from config)
        #[arg(long, value_name = "LANG")]
        language: Option<String>,
    },

    /// View configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Dataset selection shared by both passes.
#[derive(Args, Debug, Clone)]
pub struct DatasetArgs {
    /// JSONL file, or a directory holding <split>.jsonl
    #[arg(long, short = 'i', value_name = "PATH")]
    pub input: PathBuf,

    /// Dataset split
    #[arg(long, value_name = "SPLIT", default_value = defaults::DEFAULT_SPLIT)]
    pub split: String,

    /// Only process the first N records
    #[arg(long, value_name = "N")]
    pub num_records: Option<usize>,

    /// Worker threads (default: from config)
    #[arg(long, value_name = "N")]
    pub num_workers: Option<usize>,

    /// Print counts and a few sample records instead of writing output
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct RateArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,

    /// Output directory, written as <dir>/<split>.jsonl
    #[arg(long, short = 'o', value_name = "DIR", default_value = defaults::RATE_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// espeak-ng voice (default: from config)
    #[arg(long, short = 'l', value_name = "LANG")]
    pub language: Option<String>,

    /// Transcript column
    #[arg(long, value_name = "COLUMN")]
    pub text_column: Option<String>,

    /// Audio column
    #[arg(long, value_name = "COLUMN")]
    pub audio_column: Option<String>,

    /// Records per batch
    #[arg(long, value_name = "N")]
    pub batch_size: Option<usize>,

    /// Per-call phonemizer timeout. Examples: 500ms, 10s, 1m
    #[arg(long, value_name = "DURATION", value_parser = parse_timeout)]
    pub timeout: Option<Duration>,

    /// Stop at the first record that cannot be annotated
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args, Debug, Clone)]
pub struct FilterArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,

    /// Output directory, written as <dir>/<split>.jsonl
    #[arg(long, short = 'o', value_name = "DIR", default_value = defaults::FILTER_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Minimum duration in seconds (exclusive)
    #[arg(long, value_name = "SECONDS")]
    pub min_duration: Option<f64>,

    /// Minimum WAV file size in bytes (exclusive)
    #[arg(long, value_name = "BYTES")]
    pub min_filesize: Option<u64>,
}

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Dump,
}

/// Parse a timeout string.
///
/// Supports any duration format accepted by `humantime`; bare numbers are
/// milliseconds. `0` disables the timeout.
fn parse_timeout(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    // Bare number → milliseconds
    if let Ok(ms) = s.parse::<u64>() {
        return Ok(Duration::from_millis(ms));
    }
    humantime::parse_duration(s).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rate_defaults() {
        let cli = Cli::try_parse_from(["phonorate", "rate", "--input", "data"]).unwrap();
        let Commands::Rate(args) = cli.command else {
            panic!("Expected Rate command");
        };
        assert_eq!(args.dataset.input, PathBuf::from("data"));
        assert_eq!(args.dataset.split, "train");
        assert_eq!(args.output_dir, PathBuf::from("./rated_dataset"));
        assert!(args.dataset.num_records.is_none());
        assert!(args.dataset.num_workers.is_none());
        assert!(!args.dataset.dry_run);
        assert!(args.language.is_none());
        assert!(args.timeout.is_none());
        assert!(!args.strict);
        assert!(!cli.quiet);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_parse_rate_with_options() {
        let cli = Cli::try_parse_from([
            "phonorate",
            "rate",
            "-i",
            "train.jsonl",
            "--split",
            "test",
            "--language",
            "fr-fr",
            "--text-column",
            "sentence",
            "--audio-column",
            "clip",
            "--num-workers",
            "2",
            "--batch-size",
            "32",
            "--num-records",
            "100",
            "--timeout",
            "2s",
            "--strict",
            "--dry-run",
        ])
        .unwrap();

        let Commands::Rate(args) = cli.command else {
            panic!("Expected Rate command");
        };
        assert_eq!(args.dataset.split, "test");
        assert_eq!(args.language.as_deref(), Some("fr-fr"));
        assert_eq!(args.text_column.as_deref(), Some("sentence"));
        assert_eq!(args.audio_column.as_deref(), Some("clip"));
        assert_eq!(args.dataset.num_workers, Some(2));
        assert_eq!(args.batch_size, Some(32));
        assert_eq!(args.dataset.num_records, Some(100));
        assert_eq!(args.timeout, Some(Duration::from_secs(2)));
        assert!(args.strict);
        assert!(args.dataset.dry_run);
    }

    #[test]
    fn test_parse_filter_defaults() {
        let cli = Cli::try_parse_from(["phonorate", "filter", "--input", "data"]).unwrap();
        let Commands::Filter(args) = cli.command else {
            panic!("Expected Filter command");
        };
        assert_eq!(args.output_dir, PathBuf::from("./filtered_dataset"));
        assert!(args.min_duration.is_none());
        assert!(args.min_filesize.is_none());
    }

    #[test]
    fn test_parse_filter_thresholds() {
        let cli = Cli::try_parse_from([
            "phonorate",
            "filter",
            "--input",
            "data",
            "--min-duration",
            "0.5",
            "--min-filesize",
            "4096",
        ])
        .unwrap();
        let Commands::Filter(args) = cli.command else {
            panic!("Expected Filter command");
        };
        assert_eq!(args.min_duration, Some(0.5));
        assert_eq!(args.min_filesize, Some(4096));
    }

    #[test]
    fn test_input_is_required() {
        let err = Cli::try_parse_from(["phonorate", "rate"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_parse_check() {
        let cli = Cli::try_parse_from(["phonorate", "check", "--language", "de"]).unwrap();
        match cli.command {
            Commands::Check { language } => assert_eq!(language.as_deref(), Some("de")),
            _ => panic!("Expected Check command"),
        }
    }

    #[test]
    fn test_parse_config_dump() {
        let cli = Cli::try_parse_from(["phonorate", "config", "dump"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config {
                action: ConfigAction::Dump
            }
        ));
    }

    #[test]
    fn test_parse_completions() {
        let cli = Cli::try_parse_from(["phonorate", "completions", "bash"]).unwrap();
        match cli.command {
            Commands::Completions { shell } => assert_eq!(shell, Shell::Bash),
            _ => panic!("Expected Completions command"),
        }
    }

    #[test]
    fn test_parse_verbose_double() {
        let cli = Cli::try_parse_from(["phonorate", "-vv", "check"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_global_options_after_command() {
        let cli = Cli::try_parse_from([
            "phonorate",
            "filter",
            "--input",
            "d",
            "--config",
            "/tmp/config.toml",
            "-q",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("/tmp/config.toml")));
        assert!(cli.quiet);
    }

    #[test]
    fn test_invalid_command_returns_error() {
        let err = Cli::try_parse_from(["phonorate", "invalid"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidSubcommand);
    }

    #[test]
    fn test_version_flag() {
        let err = Cli::try_parse_from(["phonorate", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_parse_timeout_formats() {
        assert_eq!(parse_timeout("250").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_timeout("1m").unwrap(), Duration::from_secs(60));
        assert_eq!(parse_timeout("1s 500ms").unwrap(), Duration::from_millis(1500));
        assert!(parse_timeout("soon").is_err());
    }
}
