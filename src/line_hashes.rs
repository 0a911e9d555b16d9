// src/line_hashes.rs

use crate::error::TrackingError;
use crate::model::{LineNumber, RuleKey};
use sha2::{Digest, Sha256};

/// Content hashes of every line of one file revision, addressed by 1-based
/// line number.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineHashIndex {
    hashes: Vec<String>,
}

impl LineHashIndex {
    pub fn new(hashes: Vec<String>) -> Self {
        Self { hashes }
    }

    /// Hashes each line with its whitespace removed, so re-indenting a line
    /// keeps its hash. Blank lines hash to the empty string.
    pub fn from_content(content: &str) -> Self {
        Self::from_bytes(content.as_bytes())
    }

    /// Same as [`from_content`](Self::from_content) for content in any
    /// encoding. Lines end at `\n`; ASCII whitespace is removed.
    pub fn from_bytes(content: &[u8]) -> Self {
        if content.is_empty() {
            return Self::default();
        }
        let hashes = content
            .strip_suffix(b"\n")
            .unwrap_or(content)
            .split(|&b| b == b'\n')
            .map(|line| {
                let stripped: Vec<u8> = line.iter().copied().filter(|b| !b.is_ascii_whitespace()).collect();
                if stripped.is_empty() {
                    String::new()
                } else {
                    hex::encode(Sha256::digest(&stripped))
                }
            })
            .collect();
        Self { hashes }
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    /// Hash of `line`, or `None` when it is outside `1..=len()`.
    pub fn hash(&self, line: LineNumber) -> Option<&str> {
        let idx = usize::try_from(line).ok()?.checked_sub(1)?;
        self.hashes.get(idx).map(String::as_str)
    }

    /// Like [`hash`](Self::hash), but a line outside the file is reported
    /// against the issue's rule.
    pub fn checked_hash(&self, line: LineNumber, rule: &RuleKey) -> Result<&str, TrackingError> {
        self.hash(line).ok_or_else(|| TrackingError::LineOutOfRange {
            line,
            lines: self.len(),
            rule: rule.clone(),
        })
    }
}
