//! Day-keyed completion counters.
//!
//! Keys are zero-padded `YYYY-MM-DD` strings, so lexicographic order equals
//! chronological order and the retention sweep can compare keys directly.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::date_key;

/// How long completion history is kept.
pub const RETENTION_DAYS: i64 = 30;

/// Width of the completion chart window.
pub const CHART_DAYS: usize = 7;

/// Completions per day. Counts never drop below zero.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct StatsLedger {
    counts: BTreeMap<String, u32>,
}

impl StatsLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the count for `key`, creating the entry at 1.
    pub fn record_completion(&mut self, key: &str) {
        let count = self.counts.entry(key.to_string()).or_insert(0);
        *count = count.saturating_add(1);
        debug!(key, count = *count, "recorded completion");
    }

    /// Decrements the count for `key` if it is positive.
    ///
    /// Returns `false` when there was nothing to take away.
    pub fn record_uncompletion(&mut self, key: &str) -> bool {
        match self.counts.get_mut(key) {
            Some(count) if *count > 0 => {
                *count -= 1;
                debug!(key, count = *count, "recorded uncompletion");
                true
            }
            _ => false,
        }
    }

    /// Removes every entry dated before `reference - days`. Returns how many were removed.
    pub fn purge_older_than(&mut self, days: i64, reference: NaiveDate) -> usize {
        let cutoff = date_key(reference - Duration::days(days));
        let before = self.counts.len();
        self.counts.retain(|key, _| key.as_str() >= cutoff.as_str());
        let removed = before - self.counts.len();
        if removed > 0 {
            debug!(%cutoff, removed, "purged old completion stats");
        }
        removed
    }

    /// Seven days ending at `reference`, oldest first.
    pub fn last_7_days(&self, reference: NaiveDate) -> DayWindow<'_> {
        self.last_days(CHART_DAYS, reference)
    }

    /// `days` days ending at `reference` (inclusive), oldest first. Missing days count 0.
    pub fn last_days(&self, days: usize, reference: NaiveDate) -> DayWindow<'_> {
        DayWindow {
            ledger: self,
            end: reference,
            remaining: days,
        }
    }

    pub fn count(&self, key: &str) -> u32 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn count_on(&self, date: NaiveDate) -> u32 {
        self.count(&date_key(date))
    }

    /// Sum of all stored counts.
    pub fn total(&self) -> u64 {
        self.counts.values().map(|&c| u64::from(c)).sum()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.counts.iter().map(|(k, &v)| (k.as_str(), v))
    }
}

/// Builds a ledger from stored `(key, count)` pairs; negative counts are dropped.
impl FromIterator<(String, i64)> for StatsLedger {
    fn from_iter<I: IntoIterator<Item = (String, i64)>>(iter: I) -> Self {
        let counts = iter
            .into_iter()
            .filter_map(|(key, count)| u32::try_from(count).ok().map(|c| (key, c)))
            .collect();
        Self { counts }
    }
}

/// One bar of the completion chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCount {
    pub date: NaiveDate,
    pub key: String,
    /// Short label such as `Mon, Jan 5`.
    pub label: String,
    pub count: u32,
}

/// Lazy window over the ledger. Clone it to walk the window again.
#[derive(Debug, Clone)]
pub struct DayWindow<'a> {
    ledger: &'a StatsLedger,
    end: NaiveDate,
    remaining: usize,
}

impl Iterator for DayWindow<'_> {
    type Item = DayCount;

    fn next(&mut self) -> Option<DayCount> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let date = self.end - Duration::days(self.remaining as i64);
        let key = date_key(date);
        Some(DayCount {
            date,
            label: date.format("%a, %b %-d").to_string(),
            count: self.ledger.count(&key),
            key,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for DayWindow<'_> {}
