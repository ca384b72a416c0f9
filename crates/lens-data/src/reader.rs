//! History file discovery and loading.
//!
//! Accepts the export formats of the history producer: a JSON document (a
//! top-level array of records, or an object with an `items` array), JSON
//! Lines, or a directory holding any mix of the two.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use lens_core::error::{LensError, Result};
use lens_core::models::HistoryRecord;
use serde_json::Value;
use tracing::{debug, warn};

// ── Public API ────────────────────────────────────────────────────────────────

/// Find all `.json` and `.jsonl` files recursively under `dir`, sorted by path.
pub fn find_history_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && is_history_file(entry.path()))
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Load every record under `path`.
///
/// A directory is scanned recursively and its files are concatenated in path
/// order.
pub fn load_records(path: &Path) -> Result<Vec<HistoryRecord>> {
    if !path.exists() {
        return Err(LensError::DataPathNotFound(path.to_path_buf()));
    }

    if !path.is_dir() {
        return load_file(path);
    }

    let files = find_history_files(path);
    if files.is_empty() {
        return Err(LensError::NoDataFiles(path.to_path_buf()));
    }

    let mut records = Vec::new();
    for file in &files {
        records.extend(load_file(file)?);
    }

    debug!(
        "Loaded {} records from {} files under {}",
        records.len(),
        files.len(),
        path.display()
    );
    Ok(records)
}

/// Load one file, choosing the format from its extension.
pub fn load_file(path: &Path) -> Result<Vec<HistoryRecord>> {
    if has_extension(path, "jsonl") {
        load_jsonl(path)
    } else {
        let content = std::fs::read_to_string(path).map_err(|source| LensError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        parse_json_document(&content)
    }
}

/// Parse a JSON document holding an array of records or `{"items": [...]}`.
///
/// Array elements that are not record objects are skipped.
pub fn parse_json_document(content: &str) -> Result<Vec<HistoryRecord>> {
    let value: Value = serde_json::from_str(content)?;
    let items = match value {
        Value::Object(mut map) => map.remove("items").unwrap_or(Value::Null),
        other => other,
    };
    let items: Vec<Value> = serde_json::from_value(items)?;

    let total = items.len();
    let records: Vec<HistoryRecord> = items.into_iter().filter_map(to_record).collect();
    if records.len() < total {
        debug!("Skipped {} malformed records", total - records.len());
    }
    Ok(records)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn load_jsonl(path: &Path) -> Result<Vec<HistoryRecord>> {
    let file = std::fs::File::open(path).map_err(|source| LensError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = std::io::BufReader::new(file);

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for (line_no, line_result) in reader.lines().enumerate() {
        let line = match line_result {
            Ok(l) => l,
            Err(e) => {
                warn!("Failed to read {} line {}: {}", path.display(), line_no + 1, e);
                skipped += 1;
                continue;
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match serde_json::from_str::<Value>(trimmed).ok().and_then(to_record) {
            Some(record) => records.push(record),
            None => {
                debug!("Skipping malformed line {} in {}", line_no + 1, path.display());
                skipped += 1;
            }
        }
    }

    debug!(
        "{}: {} records, {} lines skipped",
        path.display(),
        records.len(),
        skipped
    );
    Ok(records)
}

fn to_record(value: Value) -> Option<HistoryRecord> {
    if !value.is_object() {
        return None;
    }
    serde_json::from_value(value).ok()
}

fn is_history_file(path: &Path) -> bool {
    has_extension(path, "json") || has_extension(path, "jsonl")
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
