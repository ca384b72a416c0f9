use std::path::PathBuf;
use thiserror::Error;

/// All errors produced around the history analytics engine.
///
/// The engine itself (normalize → segment → aggregate / graph) is total and
/// never fails; these variants cover loading, configuration and orchestration.
#[derive(Error, Debug)]
pub enum LensError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// The input path does not exist.
    #[error("Data path not found: {0}")]
    DataPathNotFound(PathBuf),

    /// No `.json` / `.jsonl` history files were found under the given directory.
    #[error("No history files found in {0}")]
    NoDataFiles(PathBuf),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A pipeline branch running on a worker thread failed to complete.
    #[error("Analysis task failed: {0}")]
    Task(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the lens crates.
pub type Result<T> = std::result::Result<T, LensError>;
