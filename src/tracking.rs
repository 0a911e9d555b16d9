// src/tracking.rs

//! Issue tracking: pairs the issues of the current analysis of a file with
//! the issues recorded by the previous one, so that matched issues keep
//! their identity and history.
//!
//! Matching runs as an ordered cascade of passes. Each pass only looks at
//! raw issues that are still unmatched and only sees previous issues that
//! are still unmatched; the first eligible candidate wins.

use crate::error::TrackingError;
use crate::line_hashes::LineHashIndex;
use crate::model::{PreviousIssue, RawIssue};
use crate::result::{Candidate, TrackingResult};
use tracing::{debug, trace};

/// A raw issue together with the checksum derived for it.
#[derive(Debug, Clone, Copy)]
pub struct TrackedRaw<'r> {
    pub issue: &'r RawIssue,
    pub checksum: Option<&'r str>,
}

type Finder = for<'a, 'r, 's, 't> fn(&'s TrackedRaw<'r>, &'t TrackingResult<'a>) -> Option<Candidate<'a>>;

/// One matching strategy of the cascade.
#[derive(Clone, Copy)]
pub struct Pass {
    pub name: &'static str,
    find: Finder,
}

impl Pass {
    /// Tries to match every still unmatched raw issue, returning how many
    /// were matched.
    pub fn apply<'a>(&self, raws: &[TrackedRaw<'_>], result: &mut TrackingResult<'a>) -> usize {
        let mut matched = 0;
        for (pos, raw) in raws.iter().enumerate() {
            if result.is_matched(pos) {
                continue;
            }
            if let Some(candidate) = (self.find)(raw, &*result) {
                trace!(pass = self.name, raw = pos, key = %candidate.issue().key, "matched");
                result.set_match(pos, candidate);
                matched += 1;
            }
        }
        debug!(pass = self.name, matched, remaining = raws.len() - result.matched_count(), "pass complete");
        result.record_pass(self.name, matched);
        matched
    }
}

/// Same rule, same line and same checksum; the message may differ.
pub const EXACT: Pass = Pass { name: "exact", find: find_same_line_and_checksum };

/// Passes run once the exact pass left raw issues unmatched. All of them are
/// restricted to previous issues of the same rule.
pub const FALLBACKS: [Pass; 3] = [
    Pass { name: "checksum_and_message", find: find_same_checksum_and_message },
    Pass { name: "line_and_message", find: find_same_line_and_message },
    // Message changed but the line content did not
    Pass { name: "checksum", find: find_same_checksum },
];

/// Derives the checksum of every raw issue from `index`.
///
/// Fails on the first issue anchored past the end of the file.
pub fn prepare<'r>(index: Option<&'r LineHashIndex>, raw: &'r [RawIssue]) -> Result<Vec<TrackedRaw<'r>>, TrackingError> {
    raw.iter()
        .map(|issue| -> Result<TrackedRaw<'r>, TrackingError> {
            let checksum = match (index, issue.line) {
                (Some(index), Some(line)) => Some(index.checked_hash(line, &issue.rule)?),
                _ => None,
            };
            Ok(TrackedRaw { issue, checksum })
        })
        .collect()
}

/// Matches `raw` issues against `previous` ones.
///
/// `index` holds the line hashes of the current revision of the file, and
/// is `None` for components that are not files. A raw issue whose line lies
/// outside the index fails the whole call; no partial result is returned.
pub fn track<'a>(
    index: Option<&LineHashIndex>,
    previous: &'a [PreviousIssue],
    raw: &'a [RawIssue],
) -> Result<TrackingResult<'a>, TrackingError> {
    let raws = prepare(index, raw)?;

    let mut result = TrackingResult::new(raw);
    for issue in previous {
        result.add_unmatched(issue);
    }

    EXACT.apply(&raws, &mut result);
    if result.matched_count() == raws.len() {
        debug!(raw = raws.len(), "every raw issue matched exactly");
        return Ok(result);
    }

    for pass in &FALLBACKS {
        pass.apply(&raws, &mut result);
    }
    Ok(result)
}

fn find_same_line_and_checksum<'a>(raw: &TrackedRaw<'_>, result: &TrackingResult<'a>) -> Option<Candidate<'a>> {
    result
        .unmatched_for_rule_line_checksum(&raw.issue.rule, raw.issue.line, raw.checksum)
        .next()
}

fn find_same_checksum_and_message<'a>(raw: &TrackedRaw<'_>, result: &TrackingResult<'a>) -> Option<Candidate<'a>> {
    result
        .unmatched_by_rule(&raw.issue.rule)
        .find(|c| same_checksum(raw, c.issue()) && same_message(raw, c.issue()))
}

fn find_same_line_and_message<'a>(raw: &TrackedRaw<'_>, result: &TrackingResult<'a>) -> Option<Candidate<'a>> {
    result
        .unmatched_by_rule(&raw.issue.rule)
        .find(|c| same_line(raw, c.issue()) && same_message(raw, c.issue()))
}

fn find_same_checksum<'a>(raw: &TrackedRaw<'_>, result: &TrackingResult<'a>) -> Option<Candidate<'a>> {
    result.unmatched_by_rule(&raw.issue.rule).find(|c| same_checksum(raw, c.issue()))
}

/// Issues without a checksum never match on checksum.
fn same_checksum(raw: &TrackedRaw<'_>, previous: &PreviousIssue) -> bool {
    matches!((raw.checksum, previous.effective_checksum()), (Some(a), Some(b)) if a == b)
}

fn same_line(raw: &TrackedRaw<'_>, previous: &PreviousIssue) -> bool {
    raw.issue.line == previous.line
}

fn same_message(raw: &TrackedRaw<'_>, previous: &PreviousIssue) -> bool {
    raw.issue.message == previous.message
}
