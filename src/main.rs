use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use owo_colors::OwoColorize;
use phonorate::cli::{Cli, Commands, ConfigAction, DatasetArgs, FilterArgs, RateArgs};
use phonorate::config::Config;
use phonorate::dataset::{Record, jsonl};
use phonorate::defaults;
use phonorate::diagnostics::check_dependencies;
use phonorate::filter::ValidityFilter;
use phonorate::phonemize::EspeakPhonemizer;
use phonorate::pipeline::{AnnotationJob, run_annotation, run_filter};
use phonorate::rate::{FailurePolicy, RateAnnotator};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

fn main() -> Result<()> {
    let cli = Cli::parse();
    phonorate::logging::init(cli.verbose, cli.quiet);
    debug!(version = %phonorate::version_string(), "phonorate starting");

    match cli.command {
        Commands::Rate(args) => {
            let config = load_config(cli.config.as_deref())?;
            run_rate(config, args, cli.quiet)?;
        }
        Commands::Filter(args) => {
            let config = load_config(cli.config.as_deref())?;
            run_filter_command(config, args, cli.quiet)?;
        }
        Commands::Check { language } => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(language) = language {
                config.phonemizer.language = language;
            }
            println!("phonorate {}\n", phonorate::version_string());
            if !check_dependencies(&config.phonemizer.espeak()) {
                std::process::exit(1);
            }
        }
        Commands::Config {
            action: ConfigAction::Dump,
        } => {
            let config = load_config(cli.config.as_deref())?;
            print!("{}", config.to_toml()?);
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "phonorate", &mut std::io::stdout());
        }
    }

    Ok(())
}

/// Load configuration from a custom path, or the default path with fallback to defaults.
fn load_config(custom_path: Option<&Path>) -> Result<Config> {
    let config = if let Some(path) = custom_path {
        Config::load(path)?
    } else if let Some(default_path) = Config::default_path() {
        Config::load_or_default(&default_path)?
    } else {
        Config::default()
    };

    Ok(config.with_env_overrides())
}

/// Resolve, load and truncate the requested split.
fn load_split(args: &DatasetArgs) -> Result<(PathBuf, Vec<Record>)> {
    let path = jsonl::resolve_split_path(&args.input, &args.split);
    let records = jsonl::load(&path)
        .with_context(|| format!("Failed to load split '{}' from {}", args.split, path.display()))?;
    let loaded = records.len();
    let records = jsonl::select(records, args.num_records);
    info!(path = %path.display(), loaded, selected = records.len(), "dataset loaded");
    Ok((path, records))
}

fn run_rate(mut config: Config, args: RateArgs, quiet: bool) -> Result<()> {
    if let Some(language) = args.language {
        config.phonemizer.language = language;
    }
    if let Some(column) = args.text_column {
        config.columns.text = column;
    }
    if let Some(column) = args.audio_column {
        config.columns.audio = column;
    }
    if let Some(workers) = args.dataset.num_workers {
        config.pipeline.num_workers = workers;
    }
    if let Some(batch_size) = args.batch_size {
        config.rate.batch_size = batch_size;
    }
    if let Some(timeout) = args.timeout {
        config.phonemizer.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
    }
    if args.strict {
        config.rate.failure_policy = FailurePolicy::Abort;
    }
    config.validate()?;

    let (path, records) = load_split(&args.dataset)?;
    let total = records.len();
    let audio_root = path.parent().map(Path::to_path_buf);

    let espeak = config.phonemizer.espeak();
    let separator = config.phonemizer.separator.clone();
    let job = AnnotationJob::from_config(&config);
    let rate = &config.rate;

    let report = run_annotation(records, &job, |worker| {
        debug!(worker, language = %espeak.language, "starting phonemizer");
        let phonemizer = EspeakPhonemizer::system(espeak.clone())?;
        let mut annotator = RateAnnotator::new(phonemizer)
            .with_separator(separator.clone())
            .with_duration_floor(rate.duration_floor)
            .with_failure_policy(rate.failure_policy);
        if let Some(root) = &audio_root {
            annotator = annotator.with_audio_root(root.clone());
        }
        Ok(annotator)
    })
    .with_context(|| format!("Failed to annotate {}", path.display()))?;

    if !quiet {
        eprintln!(
            "{} {}/{} records in {:.1?} ({} batches, {} workers)",
            "Annotated".green().bold(),
            report.annotated(),
            total,
            report.elapsed,
            report.batches,
            report.workers,
        );
        for (kind, count) in report.failure_counts() {
            eprintln!("  {} {}: {}", "✗".red(), kind, count);
        }
    }

    if args.dataset.dry_run {
        preview(&report.records)?;
        return Ok(());
    }

    let out = jsonl::split_path(&args.output_dir, &args.dataset.split);
    jsonl::save(&out, &report.records)
        .with_context(|| format!("Failed to write {}", out.display()))?;
    if !quiet {
        eprintln!("{} {}", "Saved".green().bold(), out.display());
    }
    Ok(())
}

fn run_filter_command(mut config: Config, args: FilterArgs, quiet: bool) -> Result<()> {
    if let Some(workers) = args.dataset.num_workers {
        config.pipeline.num_workers = workers;
    }
    if let Some(min_duration) = args.min_duration {
        config.filter.min_duration = min_duration;
    }
    if let Some(min_filesize) = args.min_filesize {
        config.filter.min_filesize = min_filesize;
    }
    config.validate()?;

    let (_, records) = load_split(&args.dataset)?;
    let filter = ValidityFilter::new(config.filter);
    let report = run_filter(records, &filter, config.pipeline.num_workers);

    if !quiet {
        eprintln!(
            "{} {} of {} records ({} removed)",
            "Kept".green().bold(),
            report.kept.len(),
            report.total,
            report.removed(),
        );
        for (rejection, count) in &report.rejections {
            eprintln!("  {} {}: {}", "✗".red(), rejection, count);
        }
    }

    if args.dataset.dry_run {
        preview(&report.kept)?;
        return Ok(());
    }

    let out = jsonl::split_path(&args.output_dir, &args.dataset.split);
    jsonl::save(&out, &report.kept).with_context(|| format!("Failed to write {}", out.display()))?;
    if !quiet {
        eprintln!("{} {}", "Saved".green().bold(), out.display());
    }
    Ok(())
}

/// Print the first few records as JSON lines on stdout.
fn preview(records: &[Record]) -> Result<()> {
    for record in records.iter().take(defaults::DRY_RUN_PREVIEW) {
        println!("{}", serde_json::to_string(record)?);
    }
    Ok(())
}
