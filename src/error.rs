//! Error types shared by the loader, the route engine and the writers.

use std::path::PathBuf;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum TourError {
    /// The places file does not exist.
    #[error("file '{}' not found", .0.display())]
    InputNotFound(PathBuf),
    /// Nothing usable was parsed from the input.
    #[error("no valid places found in {0}")]
    InputEmpty(String),
    /// A single row could not be parsed. Recovered by the loader.
    #[error("line {line}: {reason}")]
    MalformedRow { line: u64, reason: String },
    #[error("starting place '{0}' not found")]
    StartNotFound(String),
    #[error("index {index} out of range for {len} places")]
    InvalidIndex { index: usize, len: usize },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TourError>;

impl TourError {
    pub fn malformed_row(line: u64, reason: impl Into<String>) -> Self {
        Self::MalformedRow {
            line,
            reason: reason.into(),
        }
    }
}
