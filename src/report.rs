// src/report.rs

use crate::model::{IssueKey, LineNumber, PreviousIssue, RawIssue, RuleKey, Severity};
use crate::result::TrackingResult;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::{self, Write};

pub const STATUS_CLOSED: &str = "CLOSED";
pub const RESOLUTION_FIXED: &str = "FIXED";

/// A raw issue that inherits the identity and history of a previous one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedIssue {
    pub key: IssueKey,
    pub rule: RuleKey,
    pub line: Option<LineNumber>,
    pub previous_line: Option<LineNumber>,
    pub message: Option<String>,
    pub severity: Option<Severity>,
    pub manual_severity: bool,
    pub status: Option<String>,
    pub resolution: Option<String>,
    pub assignee: Option<String>,
    pub creation_date: Option<DateTime<Utc>>,
}

impl MatchedIssue {
    fn new(raw: &RawIssue, previous: &PreviousIssue) -> Self {
        // A severity set by hand survives re-analysis
        let severity = if previous.manual_severity { previous.severity } else { raw.severity };
        Self {
            key: previous.key.clone(),
            rule: raw.rule.clone(),
            line: raw.line,
            previous_line: previous.line,
            message: raw.message.clone(),
            severity,
            manual_severity: previous.manual_severity,
            status: previous.status.clone(),
            resolution: previous.resolution.clone(),
            assignee: previous.assignee.clone(),
            creation_date: previous.creation_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewIssue {
    pub rule: RuleKey,
    pub line: Option<LineNumber>,
    pub message: Option<String>,
    pub severity: Option<Severity>,
    pub creation_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClosedIssue {
    pub key: IssueKey,
    pub rule: RuleKey,
    pub line: Option<LineNumber>,
    pub status: &'static str,
    pub resolution: &'static str,
}

/// Outcome of tracking the issues of one component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
    pub matched: Vec<MatchedIssue>,
    pub new: Vec<NewIssue>,
    pub closed: Vec<ClosedIssue>,
}

impl FileReport {
    pub fn tracked(path: Option<String>, result: &TrackingResult<'_>, analysis_date: DateTime<Utc>) -> Self {
        let matched = result
            .matched_issues()
            .map(|(raw, previous)| MatchedIssue::new(raw, previous))
            .collect();
        let new = result
            .new_issues()
            .map(|issue| NewIssue {
                rule: issue.rule.clone(),
                line: issue.line,
                message: issue.message.clone(),
                severity: issue.severity,
                creation_date: analysis_date,
            })
            .collect();
        let closed = result
            .unmatched()
            .map(|previous| ClosedIssue {
                key: previous.key.clone(),
                rule: previous.rule.clone(),
                line: previous.line,
                status: STATUS_CLOSED,
                resolution: RESOLUTION_FIXED,
            })
            .collect();
        Self { path, failure: None, matched, new, closed }
    }

    pub fn failed(path: Option<String>, error: &dyn std::error::Error) -> Self {
        Self { path, failure: Some(error.to_string()), matched: Vec::new(), new: Vec::new(), closed: Vec::new() }
    }

    fn display_path(&self) -> &str {
        self.path.as_deref().unwrap_or("<component>")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub files: usize,
    pub failed: usize,
    pub matched: usize,
    pub new: usize,
    pub closed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub analysis_date: DateTime<Utc>,
    pub totals: Totals,
    pub files: Vec<FileReport>,
}

impl BatchReport {
    pub fn new(analysis_date: DateTime<Utc>, files: Vec<FileReport>) -> Self {
        let totals = files.iter().fold(Totals::default(), |mut t, f| {
            t.files += 1;
            t.failed += usize::from(f.failure.is_some());
            t.matched += f.matched.len();
            t.new += f.new.len();
            t.closed += f.closed.len();
            t
        });
        Self { analysis_date, totals, files }
    }

    pub fn write_json(&self, out: impl Write) -> serde_json::Result<()> {
        serde_json::to_writer_pretty(out, self)
    }

    pub fn write_text(&self, mut out: impl Write) -> io::Result<()> {
        for file in &self.files {
            match &file.failure {
                Some(failure) => writeln!(out, "{}: FAILED {}", file.display_path(), failure)?,
                None => writeln!(
                    out,
                    "{}: {} matched, {} new, {} closed",
                    file.display_path(),
                    file.matched.len(),
                    file.new.len(),
                    file.closed.len()
                )?,
            }
        }
        let t = &self.totals;
        writeln!(
            out,
            "{} file(s), {} failed: {} matched, {} new, {} closed",
            t.files, t.failed, t.matched, t.new, t.closed
        )
    }
}
