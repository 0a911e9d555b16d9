// src/result.rs

use crate::model::{LineNumber, PreviousIssue, RawIssue, RuleKey};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Position of a previous issue in the order it was seeded
type Slot = usize;

/// An unmatched previous issue, as handed out by the lookups of
/// [`TrackingResult`] and handed back to [`TrackingResult::set_match`].
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    slot: Slot,
    issue: &'a PreviousIssue,
}

impl<'a> Candidate<'a> {
    pub fn issue(&self) -> &'a PreviousIssue {
        self.issue
    }
}

/// Unmatched previous issues raised by one rule.
#[derive(Debug, Default)]
struct RuleBucket<'a> {
    unmatched: BTreeMap<Slot, &'a PreviousIssue>,
    by_line_and_checksum: HashMap<LineNumber, HashMap<&'a str, BTreeSet<Slot>>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassStats {
    pub name: &'static str,
    pub matched: usize,
}

/// Which passes ran during a tracking call and what each of them matched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackingStats {
    pub passes: Vec<PassStats>,
}

impl TrackingStats {
    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|p| p.name).collect()
    }
}

/// Matching state of one tracking call.
///
/// Raw issues are borrowed from the caller and addressed by their position
/// in that slice. Previous issues are borrowed as well and are, at any time, either matched
/// to exactly one raw issue or part of the unmatched pool; all lookups only
/// ever see the unmatched pool.
#[derive(Debug)]
pub struct TrackingResult<'a> {
    raw: &'a [RawIssue],
    previous: Vec<&'a PreviousIssue>,
    /// Raw position -> slot of the previous issue it was matched to
    raw_matches: Vec<Option<Slot>>,
    matched_count: usize,
    unmatched: BTreeMap<Slot, &'a PreviousIssue>,
    by_rule: HashMap<&'a RuleKey, RuleBucket<'a>>,
    stats: TrackingStats,
}

impl<'a> TrackingResult<'a> {
    pub fn new(raw: &'a [RawIssue]) -> Self {
        Self {
            raw,
            previous: Vec::new(),
            raw_matches: vec![None; raw.len()],
            matched_count: 0,
            unmatched: BTreeMap::new(),
            by_rule: HashMap::new(),
            stats: TrackingStats::default(),
        }
    }

    pub fn add_unmatched(&mut self, issue: &'a PreviousIssue) {
        let slot = self.previous.len();
        self.previous.push(issue);
        self.unmatched.insert(slot, issue);

        let bucket = self.by_rule.entry(&issue.rule).or_default();
        bucket.unmatched.insert(slot, issue);
        if let (Some(line), Some(checksum)) = (issue.line, issue.effective_checksum()) {
            bucket
                .by_line_and_checksum
                .entry(line)
                .or_default()
                .entry(checksum)
                .or_default()
                .insert(slot);
        }
    }

    /// Pairs raw issue `raw` with `candidate` and drops the candidate from
    /// every unmatched view. A raw issue that is already matched, or a
    /// candidate that is no longer unmatched, is left untouched.
    pub fn set_match(&mut self, raw: usize, candidate: Candidate<'a>) {
        if raw >= self.raw_count() || self.is_matched(raw) || self.unmatched.remove(&candidate.slot).is_none() {
            return;
        }
        let issue = candidate.issue;
        if let Some(bucket) = self.by_rule.get_mut(&issue.rule) {
            bucket.unmatched.remove(&candidate.slot);
            if let (Some(line), Some(checksum)) = (issue.line, issue.effective_checksum()) {
                if let Some(by_checksum) = bucket.by_line_and_checksum.get_mut(&line) {
                    if let Some(slots) = by_checksum.get_mut(checksum) {
                        slots.remove(&candidate.slot);
                        if slots.is_empty() {
                            by_checksum.remove(checksum);
                        }
                    }
                    if by_checksum.is_empty() {
                        bucket.by_line_and_checksum.remove(&line);
                    }
                }
            }
        }
        self.raw_matches[raw] = Some(candidate.slot);
        self.matched_count += 1;
    }

    pub fn is_matched(&self, raw: usize) -> bool {
        matches!(self.raw_matches.get(raw), Some(Some(_)))
    }

    pub fn matched_count(&self) -> usize {
        self.matched_count
    }

    pub fn raw_count(&self) -> usize {
        self.raw_matches.len()
    }

    /// Unmatched previous issues raised by `rule`, in seed order.
    pub fn unmatched_by_rule<'s>(&'s self, rule: &RuleKey) -> impl Iterator<Item = Candidate<'a>> + 's {
        self.by_rule
            .get(rule)
            .into_iter()
            .flat_map(|bucket| bucket.unmatched.iter().map(|(&slot, &issue)| Candidate { slot, issue }))
    }

    /// Unmatched previous issues of `rule` anchored on `line` with `checksum`,
    /// in seed order. Empty unless both a line and a checksum are given.
    pub fn unmatched_for_rule_line_checksum<'s>(
        &'s self,
        rule: &RuleKey,
        line: Option<LineNumber>,
        checksum: Option<&str>,
    ) -> impl Iterator<Item = Candidate<'a>> + 's {
        let slots = match (self.by_rule.get(rule), line, checksum) {
            (Some(bucket), Some(line), Some(checksum)) => {
                bucket.by_line_and_checksum.get(&line).and_then(|by_checksum| by_checksum.get(checksum))
            }
            _ => None,
        };
        slots
            .into_iter()
            .flatten()
            .map(move |&slot| Candidate { slot, issue: self.previous[slot] })
    }

    /// Matched pairs as (raw position, previous issue), in raw order.
    pub fn matched(&self) -> impl Iterator<Item = (usize, &'a PreviousIssue)> + '_ {
        self.raw_matches
            .iter()
            .enumerate()
            .filter_map(move |(raw, slot)| slot.map(|slot| (raw, self.previous[slot])))
    }

    /// Matched pairs as (raw issue, previous issue), in raw order.
    pub fn matched_issues(&self) -> impl Iterator<Item = (&'a RawIssue, &'a PreviousIssue)> + '_ {
        let raw = self.raw;
        self.matched().map(move |(pos, previous)| (&raw[pos], previous))
    }

    pub fn raw_issue(&self, raw: usize) -> Option<&'a RawIssue> {
        self.raw.get(raw)
    }

    pub fn match_of(&self, raw: usize) -> Option<&'a PreviousIssue> {
        self.raw_matches.get(raw).copied().flatten().map(|slot| self.previous[slot])
    }

    /// Previous issues left unmatched, in seed order.
    pub fn unmatched(&self) -> impl Iterator<Item = &'a PreviousIssue> + '_ {
        self.unmatched.values().copied()
    }

    pub fn unmatched_count(&self) -> usize {
        self.unmatched.len()
    }

    pub fn is_unmatched_key(&self, key: &str) -> bool {
        self.unmatched.values().any(|issue| issue.key == key)
    }

    /// Positions of the raw issues no previous issue was found for.
    pub fn unmatched_raw(&self) -> impl Iterator<Item = usize> + '_ {
        self.raw_matches
            .iter()
            .enumerate()
            .filter_map(|(raw, slot)| slot.is_none().then_some(raw))
    }

    /// Raw issues no previous issue was found for, in raw order.
    pub fn new_issues(&self) -> impl Iterator<Item = &'a RawIssue> + '_ {
        let raw = self.raw;
        self.unmatched_raw().map(move |pos| &raw[pos])
    }

    pub fn stats(&self) -> &TrackingStats {
        &self.stats
    }

    pub(crate) fn record_pass(&mut self, name: &'static str, matched: usize) {
        self.stats.passes.push(PassStats { name, matched });
    }
}
