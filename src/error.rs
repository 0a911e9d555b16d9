// src/error.rs

use crate::model::{LineNumber, RuleKey};
use std::path::PathBuf;
use thiserror::Error;

/// The one fatal condition of the matching engine: a raw issue anchored
/// past the end of the file it was reported on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackingError {
    #[error("Invalid line number {line} for issue {rule}: {}", valid_lines(.lines))]
    LineOutOfRange { line: LineNumber, lines: usize, rule: RuleKey },
}

fn valid_lines(lines: &usize) -> String {
    match lines {
        0 => "the file is empty".to_string(),
        n => format!("valid lines are 1..={n}"),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid rule key '{0}', expected <repository>:<rule>")]
pub struct InvalidRuleKey(pub String);

/// Failures while gathering the inputs of a tracking run.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed batch input: {0}")]
    Json(#[from] serde_json::Error),
    #[error("git error: {0}")]
    Git(#[from] git2::Error),
    #[error("no source for {path} at {revision}")]
    MissingSource { path: String, revision: String },
    #[error(transparent)]
    Tracking(#[from] TrackingError),
}

pub type Result<T, E = InputError> = std::result::Result<T, E>;
