//! Marker planning: which text occurrences get wrapped, and where.
//!
//! The region's content is described as a list of text runs (its text nodes
//! in document order), each flagged with whether it already sits inside a
//! marker. Issues are matched against the concatenated plain text so word
//! boundaries are judged on the text the user actually sees, then each match
//! is accepted only if it
//!
//! - lies entirely within one unmarked run (element structure is never split),
//! - does not overlap a range already claimed by an earlier match or marker.
//!
//! Issues are processed in the order given; callers pass them in category
//! priority order so spelling claims text before grammar, grammar before style.

use std::ops::Range;

use regex::RegexBuilder;

use crate::caret::utf16_offset_of_byte;
use crate::types::{Category, Issue};

/// Upper bound on compiled pattern size. Issue text comes from the network.
const PATTERN_SIZE_LIMIT: usize = 1 << 16;

/// One text node's contents as seen by the planner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextRun {
    pub text: String,
    /// True when the node is inside an existing marker.
    pub marked: bool,
}

impl TextRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marked: false,
        }
    }

    pub fn marked(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marked: true,
        }
    }
}

/// A single occurrence to wrap in a marker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placement {
    /// Index of the run (text node) the occurrence lives in.
    pub run_index: usize,
    /// Byte range within the run's text.
    pub byte_range: Range<usize>,
    /// UTF-16 range within the run's text, for DOM `splitText`.
    pub utf16_range: Range<usize>,
    /// The occurrence exactly as written in the document.
    pub text: String,
    pub category: Category,
    pub suggestions: Vec<String>,
}

/// Ordered set of placements produced for one reconcile pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MarkerPlan {
    /// Sorted by run, then by position within the run.
    pub placements: Vec<Placement>,
}

impl MarkerPlan {
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    /// Placements inside one run, in text order.
    pub fn for_run(&self, run_index: usize) -> impl Iterator<Item = &Placement> {
        self.placements
            .iter()
            .filter(move |p| p.run_index == run_index)
    }

    /// Distinct run indices touched by this plan, ascending.
    pub fn touched_runs(&self) -> Vec<usize> {
        let mut runs: Vec<usize> = self.placements.iter().map(|p| p.run_index).collect();
        runs.dedup();
        runs
    }
}

/// Plan marker placements for `issues` over `runs`.
///
/// Malformed issues (blank text, no suggestions) are skipped. A pattern that
/// fails to compile is logged and skipped without affecting other issues.
pub fn plan_markers<'a>(runs: &[TextRun], issues: impl IntoIterator<Item = &'a Issue>) -> MarkerPlan {
    let mut plain = String::new();
    let mut run_starts = Vec::with_capacity(runs.len());
    for run in runs {
        run_starts.push(plain.len());
        plain.push_str(&run.text);
    }

    // Ranges (in `plain` bytes) no new marker may touch.
    let mut claimed: Vec<Range<usize>> = runs
        .iter()
        .zip(&run_starts)
        .filter(|(run, _)| run.marked)
        .map(|(run, &start)| start..start + run.text.len())
        .collect();

    let mut placements = Vec::new();

    for issue in issues {
        if !issue.is_renderable() {
            tracing::trace!(
                target: "proofmark::merge",
                word = %issue.word,
                "skipping issue without text or suggestions"
            );
            continue;
        }

        let needle = issue.word.trim();
        let pattern = match RegexBuilder::new(&regex::escape(needle))
            .case_insensitive(true)
            .size_limit(PATTERN_SIZE_LIMIT)
            .build()
        {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(word = %needle, error = %e, "could not build issue pattern");
                continue;
            }
        };

        // A rejected match resumes one character later so an overlapping
        // occurrence further on is still found.
        let mut from = 0;
        while let Some(found) = pattern.find_at(&plain, from) {
            let range = found.range();
            let Some(next) = next_char_boundary(&plain, range.start) else {
                break;
            };
            from = next;
            if range.is_empty() || !on_word_boundaries(&plain, range.clone()) {
                continue;
            }
            if claimed.iter().any(|c| c.start < range.end && range.start < c.end) {
                continue;
            }

            // Run containing the match start; the match must also end inside it.
            let run_index = run_starts.partition_point(|&s| s <= range.start) - 1;
            let run_start = run_starts[run_index];
            let run = &runs[run_index];
            if run.marked || range.end > run_start + run.text.len() {
                continue;
            }
            from = range.end;

            let byte_range = range.start - run_start..range.end - run_start;
            let utf16_range = utf16_offset_of_byte(&run.text, byte_range.start)
                ..utf16_offset_of_byte(&run.text, byte_range.end);

            claimed.push(range);
            placements.push(Placement {
                run_index,
                text: run.text[byte_range.clone()].to_string(),
                byte_range,
                utf16_range,
                category: issue.category,
                suggestions: issue.suggestions.clone(),
            });
        }
    }

    placements.sort_by_key(|p| (p.run_index, p.byte_range.start));
    MarkerPlan { placements }
}

/// Byte offset just past the character starting at `at`, if there is one.
fn next_char_boundary(text: &str, at: usize) -> Option<usize> {
    text[at..].chars().next().map(|c| at + c.len_utf8())
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Whole-word check: a word character at the edge of the match must not
/// continue into a word character outside it.
fn on_word_boundaries(text: &str, range: Range<usize>) -> bool {
    let matched = &text[range.clone()];
    let (Some(first), Some(last)) = (matched.chars().next(), matched.chars().next_back()) else {
        return false;
    };

    let before = text[..range.start].chars().next_back();
    let after = text[range.end..].chars().next();

    let start_ok = !is_word_char(first) || !before.is_some_and(is_word_char);
    let end_ok = !is_word_char(last) || !after.is_some_and(is_word_char);
    start_ok && end_ok
}
