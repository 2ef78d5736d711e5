//! Per-subsystem error types. Binaries bridge these to `anyhow::Result` at
//! `main`, following the pattern `datadog-profiling-validator` uses to wrap
//! its own `ValidationError` before returning from `main`.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to create {path}: {source}")]
    Create { path: PathBuf, #[source] source: std::io::Error },
    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, #[source] source: std::io::Error },
    #[error("failed to seek in {path}: {source}")]
    Seek { path: PathBuf, #[source] source: std::io::Error },
}

#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("failed to open {path}: {source}")]
    Open { path: PathBuf, #[source] source: std::io::Error },
    #[error("failed to read metadata for {path}: {source}")]
    Metadata { path: PathBuf, #[source] source: std::io::Error },
    #[error("failed to mmap {path}: {source}")]
    Mmap { path: PathBuf, #[source] source: nix::Error },
    #[error("database {path} is empty")]
    EmptyDatabase { path: PathBuf },
    #[error("offset {offset} out of bounds ({len} bytes available)")]
    OutOfBounds { offset: i64, len: usize },
    #[error("corrupt database: {0}")]
    Corrupt(&'static str),
    #[error("start database has no start states")]
    NoStartStates,
}
