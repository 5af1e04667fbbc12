//! JSON Lines persistence for dataset splits.
//!
//! A split lives either in a single `.jsonl` file or as `<dir>/<split>.jsonl`.
//! Blank lines are skipped; every other line must be a JSON object.

use crate::dataset::record::Record;
use crate::error::{PhonorateError, Result};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

const EXTENSION: &str = "jsonl";

/// Resolve the file holding `split`.
///
/// A directory input maps to `<input>/<split>.jsonl`; a file input is used as-is.
pub fn resolve_split_path(input: &Path, split: &str) -> PathBuf {
    if input.is_dir() {
        split_path(input, split)
    } else {
        input.to_path_buf()
    }
}

/// `<dir>/<split>.jsonl`
pub fn split_path(dir: &Path, split: &str) -> PathBuf {
    dir.join(format!("{}.{}", split, EXTENSION))
}

/// Load every record of a JSON Lines file, in file order.
pub fn load(path: &Path) -> Result<Vec<Record>> {
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            PhonorateError::DatasetParse {
                path: path.display().to_string(),
                line: 0,
                message: "file not found".to_string(),
            }
        } else {
            PhonorateError::Io(e)
        }
    })?;

    let mut records = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let parse_error = |message: String| PhonorateError::DatasetParse {
            path: path.display().to_string(),
            line: idx + 1,
            message,
        };
        let value: serde_json::Value =
            serde_json::from_str(&line).map_err(|e| parse_error(e.to_string()))?;
        let record = Record::try_from(value)
            .map_err(|other| parse_error(format!("expected a JSON object, got {}", other)))?;
        records.push(record);
    }

    Ok(records)
}

/// Write records as JSON Lines, creating parent directories as needed.
pub fn save(path: &Path, records: &[Record]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Keep the first `min(limit, len)` records. `None` keeps everything.
pub fn select(mut records: Vec<Record>, limit: Option<usize>) -> Vec<Record> {
    if let Some(limit) = limit {
        records.truncate(limit);
    }
    records
}
