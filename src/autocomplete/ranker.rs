use super::*;
use itertools::Itertools;
use std::cmp::Reverse;

/// Turns the raw union of rule output into the final list.
#[derive(Debug, Clone, Copy)]
pub struct Ranker {
    max_suggestions: usize,
}

impl Default for Ranker {
    fn default() -> Self {
        Self::new(20)
    }
}

impl Ranker {
    pub const fn new(max_suggestions: usize) -> Self {
        Self { max_suggestions }
    }

    /// Filter by `prefix`, strip it, dedupe, order and truncate.
    ///
    /// 1. Keep candidates whose insert text starts with `prefix`, ignoring
    ///    case, and drop the typed part from the insert text.
    /// 2. Collapse equal `(kind, insert text)` pairs; the first one wins.
    /// 3. Sort by kind priority descending, then insert text ascending.
    /// 4. Truncate, then number the survivors.
    pub fn rank(
        &self,
        candidates: Vec<CompletionCandidate>,
        prefix: &str,
        caret: CaretPosition,
    ) -> Vec<CompletionCandidate> {
        let total = candidates.len();
        let mut ranked = candidates
            .into_iter()
            .filter_map(|mut candidate| {
                candidate.insert_text = strip_prefix_ignore_case(&candidate.insert_text, prefix)?;
                Some(candidate)
            })
            .unique_by(|c| (c.kind, c.insert_text.clone()))
            .collect::<Vec<_>>();

        ranked.sort_by(|a, b| {
            (Reverse(a.kind.priority()), &a.insert_text)
                .cmp(&(Reverse(b.kind.priority()), &b.insert_text))
        });
        ranked.truncate(self.max_suggestions);

        for (idx, candidate) in ranked.iter_mut().enumerate() {
            candidate.sort_key = format!("{idx:04}");
            candidate.replace_range = Some(ReplaceRange {
                start: caret,
                end: caret,
            });
        }
        trace!("Ranked {total} candidates down to {}", ranked.len());
        ranked
    }
}

/// Remainder of `text` after `prefix`, compared per character without case.
fn strip_prefix_ignore_case(text: &str, prefix: &str) -> Option<String> {
    let mut chars = text.chars();
    for expected in prefix.chars() {
        let actual = chars.next()?;
        if !actual.to_lowercase().eq(expected.to_lowercase()) {
            return None;
        }
    }
    Some(chars.collect())
}
