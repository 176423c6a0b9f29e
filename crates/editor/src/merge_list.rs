//! Merge lists: which marker pairs are concatenated into merged clips.
//!
//! A merge list is `;`-separated groups, each a `,`-separated list of 1-based
//! pair numbers or inclusive `a-b` ranges, e.g. `"1,3-5;7;9-8"`. Numbers are
//! read from their leading digits (`"2a"` is 2, `"1-2-3"` is `1-2`); entries
//! without a readable number are skipped.

use std::ops::RangeInclusive;

use clipmarks_common::format_hhmmss_trimmed;
use clipmarks_model::MarkerPair;

/// Widest range that is expanded into explicit pair numbers.
pub const MAX_EXPANDED_RANGE: usize = 10_000;

/// One entry of a merge group, as written (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeEntry {
    Single(usize),
    /// Inclusive range; `from > to` is a descending range.
    Range { from: usize, to: usize },
}

impl MergeEntry {
    fn parse(text: &str) -> Option<Self> {
        if text.contains('-') {
            let mut bounds = text.split('-');
            let from = leading_number(bounds.next()?)?;
            let to = leading_number(bounds.next()?)?;
            Some(Self::Range { from, to })
        } else {
            leading_number(text).map(Self::Single)
        }
    }

    fn bounds(&self) -> (usize, usize) {
        match *self {
            Self::Single(n) => (n, n),
            Self::Range { from, to } => (from.min(to), from.max(to)),
        }
    }

    /// Highest pair number the entry refers to.
    pub fn highest(&self) -> usize {
        self.bounds().1
    }

    /// How many pair numbers the entry spans.
    pub fn width(&self) -> usize {
        let (lo, hi) = self.bounds();
        (hi - lo).saturating_add(1)
    }

    /// Pair numbers in concatenation order. Descending ranges stay descending.
    pub fn numbers(&self) -> impl Iterator<Item = usize> {
        let (lo, hi) = self.bounds();
        let descending = matches!(*self, Self::Range { from, to } if from > to);
        (lo..=hi).map(move |n| if descending { hi - (n - lo) } else { n })
    }

    /// The numbers that name one of `count` existing pairs, ascending.
    fn existing(&self, count: usize) -> RangeInclusive<usize> {
        let (lo, hi) = self.bounds();
        lo.max(1)..=hi.min(count)
    }
}

fn leading_number(text: &str) -> Option<usize> {
    let text = text.trim_start();
    let digits = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    text[..digits].parse().ok()
}

/// One `;`-separated group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeGroup {
    /// The group text as written.
    pub source: String,
    pub entries: Vec<MergeEntry>,
}

impl MergeGroup {
    /// Pair numbers in concatenation order, with zero dropped. Ranges wider
    /// than [`MAX_EXPANDED_RANGE`] are skipped.
    pub fn numbers(&self) -> Vec<usize> {
        self.entries
            .iter()
            .filter(|entry| {
                let too_wide = entry.width() > MAX_EXPANDED_RANGE;
                if too_wide {
                    tracing::debug!(?entry, "Skipping oversized merge list range");
                }
                !too_wide
            })
            .flat_map(MergeEntry::numbers)
            .filter(|n| *n > 0)
            .collect()
    }

    /// Naive duration estimate: `(end - start) / speed` summed over the
    /// referenced pairs. Numbers past the end of `pairs` contribute nothing.
    pub fn naive_duration(&self, pairs: &[MarkerPair]) -> f64 {
        self.entries
            .iter()
            .flat_map(|entry| entry.existing(pairs.len()))
            .filter_map(|n| pairs.get(n - 1))
            .map(MarkerPair::naive_output_duration)
            .sum()
    }
}

/// Parse a merge list. Every `;`-separated group is returned, even when empty.
pub fn parse(list: &str) -> Vec<MergeGroup> {
    list.split(';')
        .map(|group| {
            let entries = group
                .split(',')
                .filter_map(|entry| {
                    let parsed = MergeEntry::parse(entry);
                    if parsed.is_none() {
                        tracing::debug!(entry, "Skipping malformed merge list entry");
                    }
                    parsed
                })
                .collect();
            MergeGroup {
                source: group.trim().to_string(),
                entries,
            }
        })
        .collect()
}

/// Estimated duration of each group.
pub fn durations(list: &str, pairs: &[MarkerPair]) -> Vec<f64> {
    parse(list)
        .iter()
        .map(|group| group.naive_duration(pairs))
        .collect()
}

/// Render durations as trimmed `H:MM:SS.fff` joined by `" ; "`.
pub fn format_durations(durations: &[f64]) -> String {
    durations
        .iter()
        .map(|d| format_hhmmss_trimmed(*d))
        .collect::<Vec<_>>()
        .join(" ; ")
}

/// Expand each non-empty group into its ordered pair numbers.
pub fn expand(list: &str) -> Vec<(String, Vec<usize>)> {
    parse(list)
        .into_iter()
        .filter_map(|group| {
            let numbers = group.numbers();
            (!numbers.is_empty()).then(|| (group.source, numbers))
        })
        .collect()
}
