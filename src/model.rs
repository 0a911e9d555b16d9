// src/model.rs

use crate::error::InvalidRuleKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 1-based line number within a file revision
pub type LineNumber = u32;

/// Stable identity of an issue persisted by a previous analysis
pub type IssueKey = String;

/// Identifies the rule that raised an issue (repository + rule key)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RuleKey {
    pub repository: String,
    pub rule: String,
}

impl RuleKey {
    pub fn new(repository: impl Into<String>, rule: impl Into<String>) -> Self {
        Self { repository: repository.into(), rule: rule.into() }
    }
}

impl fmt::Display for RuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository, self.rule)
    }
}

impl FromStr for RuleKey {
    type Err = InvalidRuleKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((repository, rule)) if !repository.is_empty() && !rule.is_empty() => {
                Ok(RuleKey::new(repository, rule))
            }
            _ => Err(InvalidRuleKey(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Minor,
    Major,
    Critical,
    Blocker,
}

/// An issue recorded against the previous analysis of a file.
///
/// Only `key`, `rule`, `line`, `message` and `checksum` take part in
/// matching. The remaining fields are history that a match carries forward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviousIssue {
    pub key: IssueKey,
    pub rule: RuleKey,
    #[serde(default)]
    pub line: Option<LineNumber>,
    #[serde(default)]
    pub message: Option<String>,
    /// Hash of the line the issue was anchored to when it was last seen
    #[serde(default)]
    pub checksum: Option<String>,
    #[serde(default)]
    pub severity: Option<Severity>,
    #[serde(default)]
    pub manual_severity: bool,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub resolution: Option<String>,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub creation_date: Option<DateTime<Utc>>,
}

impl PreviousIssue {
    pub fn new(key: impl Into<IssueKey>, rule: RuleKey) -> Self {
        Self {
            key: key.into(),
            rule,
            line: None,
            message: None,
            checksum: None,
            severity: None,
            manual_severity: false,
            status: None,
            resolution: None,
            assignee: None,
            creation_date: None,
        }
    }

    pub fn with_line(mut self, line: LineNumber) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_checksum(mut self, checksum: impl Into<String>) -> Self {
        self.checksum = Some(checksum.into());
        self
    }

    /// The checksum used for matching. An issue without a line has none,
    /// whatever was stored.
    pub fn effective_checksum(&self) -> Option<&str> {
        self.line.and(self.checksum.as_deref())
    }
}

/// An issue freshly produced by the current analysis. Its checksum is
/// derived from the line-hash index of the current file revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawIssue {
    pub rule: RuleKey,
    #[serde(default)]
    pub line: Option<LineNumber>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub severity: Option<Severity>,
}

impl RawIssue {
    pub fn new(rule: RuleKey) -> Self {
        Self { rule, line: None, message: None, severity: None }
    }

    pub fn with_line(mut self, line: LineNumber) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}
