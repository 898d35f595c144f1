//! Alignment extension: growing anchors into maximal aligned spans.
//!
//! One extension walks both texts forward from an anchor, applying rules in
//! strict priority order: step across an elision marker, accept aligned
//! fuzzy-equal tokens, heal a word split on either side, and - once per side
//! per extension - skip a single token to resynchronize. A leading elision
//! marker additionally allows a bounded backward probe before the forward
//! walk starts.
//!
//! The driving scan retries a source position for as long as it has queued
//! anchors, so one source position can yield several matches against
//! different target regions. Accepting a match retires every anchor strictly
//! inside the claimed region of both texts, which is what keeps alignments
//! from re-anchoring inside already-matched spans.

use std::collections::BTreeMap;

use crate::anchor::ForwardReferences;
use crate::fuzzy::fuzzy_match;
use crate::tokenize::Token;
use crate::types::{BestMatch, InternalMatch, Span};

/// Per-call extension state over the two token sequences.
pub(crate) struct Extender<'a> {
    pub source: &'a [Token],
    pub target: &'a [Token],
    pub refs: ForwardReferences,
    pub initial_match_length: usize,
    pub look_back_limit: usize,
    pub look_ahead_limit: usize,
    pub min_similarity: f64,
}

impl Extender<'_> {
    /// Drive the scan across the whole source range and collect every raw
    /// match.
    pub(crate) fn find_all_matches(&mut self) -> Vec<InternalMatch> {
        // snapshot of target -> source anchors, for retiring claimed regions
        let mut by_target: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (source_pos, targets) in self.refs.iter() {
            for &target_pos in targets {
                by_target.entry(target_pos).or_default().push(source_pos);
            }
        }

        let window = self.initial_match_length;
        let mut matches = Vec::new();
        let mut source_start = 0;

        while source_start + window <= self.source.len() {
            match self.best_match_from(source_start) {
                Some(best) if best.source_length > 0 => {
                    matches.push(InternalMatch {
                        source: span_of(self.source, best.source_token_start, best.source_length),
                        target: span_of(self.target, best.target_token_start, best.target_length),
                    });
                    self.retire_claimed_region(&by_target, &best);
                    // the same position may hold further anchors; retry it
                }
                _ => {
                    if !self.refs.has_pending(source_start) {
                        source_start += 1;
                    }
                }
            }
        }

        matches
    }

    /// Retire every anchor whose target position lies strictly inside the
    /// accepted target span and whose source position lies strictly inside
    /// the accepted source span.
    fn retire_claimed_region(
        &mut self,
        by_target: &BTreeMap<usize, Vec<usize>>,
        best: &BestMatch,
    ) {
        let source_end = best.source_token_start + best.source_length;
        let target_end = best.target_token_start + best.target_length;

        for target_pos in best.target_token_start + 1..target_end {
            if let Some(sources) = by_target.get(&target_pos) {
                for &source_pos in sources {
                    if best.source_token_start < source_pos && source_pos < source_end {
                        self.refs.remove(source_pos, target_pos);
                    }
                }
            }
        }
    }

    /// Grow the earliest unconsumed anchor at `source_start` into the best
    /// match it supports, or report that none remains.
    pub(crate) fn best_match_from(&mut self, source_start: usize) -> Option<BestMatch> {
        let target_start = self.refs.pop_front(source_start)?;
        let window = self.initial_match_length;

        let (source_extra, target_extra) = self.extend_backward(source_start, target_start);

        let mut match_len = window;
        let mut source_pos = source_start + window;
        let mut target_pos = target_start + window;
        let mut offset_source = 0usize;
        let mut offset_target = 0usize;
        let mut has_skipped = false;

        while source_pos < self.source.len() && target_pos < self.target.len() {
            // an elision marker lets the source run ahead
            if self.target[target_pos].is_elision() {
                let mut found = false;
                for ahead in 1..=self.look_ahead_limit {
                    if target_pos + 1 < self.target.len()
                        && source_pos + ahead < self.source.len()
                        && self.fuzzy(&self.source[source_pos + ahead], &self.target[target_pos + 1])
                    {
                        source_pos += ahead;
                        target_pos += 1;
                        match_len += ahead;
                        offset_target += ahead - 1;
                        found = true;
                        break;
                    }
                }
                if !found {
                    break;
                }
            }

            if self.fuzzy(&self.source[source_pos], &self.target[target_pos]) {
                // aligned tokens agree
                source_pos += 1;
                target_pos += 1;
                match_len += 1;
            } else if source_pos + 1 < self.source.len()
                && self.fuzzy_joined(
                    &self.source[source_pos],
                    &self.source[source_pos + 1],
                    &self.target[target_pos],
                )
            {
                // the source split one word the target keeps whole
                source_pos += 2;
                target_pos += 1;
                match_len += 2;
                offset_target += 1;
            } else if target_pos + 1 < self.target.len()
                && self.fuzzy_joined(
                    &self.target[target_pos],
                    &self.target[target_pos + 1],
                    &self.source[source_pos],
                )
            {
                // the target split one word the source keeps whole
                source_pos += 1;
                target_pos += 2;
                match_len += 2;
                offset_source += 1;
            } else if !has_skipped {
                // one resynchronization skip per extension, source side first
                if source_pos + 1 < self.source.len()
                    && self.fuzzy(&self.source[source_pos + 1], &self.target[target_pos])
                {
                    source_pos += 2;
                    target_pos += 1;
                    match_len += 2;
                    offset_target += 1;
                    has_skipped = true;
                } else if target_pos + 1 < self.target.len()
                    && self.fuzzy(&self.source[source_pos], &self.target[target_pos + 1])
                {
                    source_pos += 1;
                    target_pos += 2;
                    match_len += 2;
                    offset_source += 1;
                    has_skipped = true;
                } else {
                    break;
                }
            } else {
                break;
            }
        }

        if match_len < window {
            return None;
        }

        Some(BestMatch {
            source_token_start: source_start - source_extra,
            target_token_start: target_start - target_extra,
            source_length: match_len - offset_source + source_extra,
            target_length: match_len - offset_target + target_extra,
        })
    }

    /// Backward pre-extension: a match that starts right after an elided run
    /// may really begin earlier in the source. Probe up to `look_back_limit`
    /// tokens back for the token before the marker, then greedily pull in
    /// directly adjacent matching tokens.
    ///
    /// Returns how many extra tokens the match start moved back in
    /// (source, target).
    fn extend_backward(&self, source_start: usize, target_start: usize) -> (usize, usize) {
        if target_start < 2 || !self.target[target_start - 1].is_elision() {
            return (0, 0);
        }

        for back in 1..self.look_back_limit.min(source_start) {
            if !self.fuzzy(&self.source[source_start - back], &self.target[target_start - 2]) {
                continue;
            }

            let mut new_source_start = source_start - back;
            let mut new_target_start = target_start - 2;
            let mut source_extra = back;
            let mut target_extra = 2;

            for _ in 1..self.initial_match_length {
                if new_source_start >= 1
                    && new_target_start >= 1
                    && self.fuzzy(
                        &self.source[new_source_start - 1],
                        &self.target[new_target_start - 1],
                    )
                {
                    new_source_start -= 1;
                    new_target_start -= 1;
                    source_extra += 1;
                    target_extra += 1;
                } else {
                    break;
                }
            }

            return (source_extra, target_extra);
        }

        (0, 0)
    }

    fn fuzzy(&self, a: &Token, b: &Token) -> bool {
        fuzzy_match(&a.text, &b.text, self.min_similarity)
    }

    /// Compare one side's token joined to its successor against the other
    /// side's whole token (word-split healing).
    fn fuzzy_joined(&self, first: &Token, second: &Token, whole: &Token) -> bool {
        let joined = format!("{}{}", first.text, second.text);
        fuzzy_match(&joined, &whole.text, self.min_similarity)
    }
}

fn span_of(tokens: &[Token], token_start: usize, token_len: usize) -> Span {
    Span {
        token_start,
        token_len,
        char_start: tokens[token_start].char_start,
        char_end: tokens[token_start + token_len - 1].char_end,
    }
}
