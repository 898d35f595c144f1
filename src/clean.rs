//! Cleaning passes turning raw aligned spans into the final match list.
//!
//! Four passes run in order over the matches, sorted by target character
//! start:
//!
//! 1. **merge** - neighbouring or interleaved matches become one;
//! 2. **de-overlap** - target-side overlaps are resolved, keeping the longer
//!    competitor (or both, under the ambiguous-matches policy, when their
//!    source ranges do not collide);
//! 3. **prune** - fragments below `min_match_length` are dropped, with a
//!    one-token allowance next to elision markers;
//! 4. **trim** - extensions that fuzzy-matched past a sentence boundary are
//!    cut back to it.

use crate::tokenize::{Token, SENTENCE_DELIMITER};
use crate::types::InternalMatch;

/// Per-call cleaning state over the two token sequences.
pub(crate) struct Cleaner<'a> {
    pub source: &'a [Token],
    pub target: &'a [Token],
    pub min_match_length: usize,
    pub max_merge_distance: usize,
    pub max_merge_ellipse_distance: usize,
    pub keep_ambiguous_matches: bool,
}

impl Cleaner<'_> {
    /// Run all four passes.
    pub(crate) fn clean(&self, mut matches: Vec<InternalMatch>) -> Vec<InternalMatch> {
        matches.sort_by_key(|m| m.target.char_start);
        let matches = self.merge_neighbouring(matches);
        let matches = self.drop_overlapping_targets(matches);
        let mut matches = self.drop_too_short(matches);
        self.trim_boundary_overshoot(&mut matches);
        matches
    }

    /// Pass 1: merge matches separated by a small gap in both texts, by a
    /// single elided token in the target, or interleaved in a nested fashion
    /// in both texts.
    fn merge_neighbouring(&self, matches: Vec<InternalMatch>) -> Vec<InternalMatch> {
        let mut remaining: std::collections::VecDeque<InternalMatch> = matches.into();
        let mut result = Vec::with_capacity(remaining.len());

        while let Some(mut current) = remaining.pop_front() {
            let mut i = 0;
            while i < remaining.len() {
                let next = &remaining[i];
                if self.should_merge(&current, next) {
                    current = merge_pair(&current, next);
                    remaining.remove(i);
                } else if next.target.token_start >= current.target.token_end()
                    && next.target.token_start - current.target.token_end()
                        > self.max_merge_distance
                {
                    // the list is target-ordered; later matches are further away
                    break;
                } else {
                    i += 1;
                }
            }
            result.push(current);
        }

        result
    }

    fn should_merge(&self, current: &InternalMatch, next: &InternalMatch) -> bool {
        let source_gap = next.source.token_start as isize - current.source.token_end() as isize;
        let target_gap = next.target.token_start as isize - current.target.token_end() as isize;

        // small gap on both sides
        if (0..=self.max_merge_distance as isize).contains(&target_gap)
            && (0..=self.max_merge_distance as isize).contains(&source_gap)
        {
            return true;
        }

        // exactly one elided token between the target spans
        if target_gap == 1
            && self.target[next.target.token_start - 1].is_elision()
            && current.source.token_start < next.source.token_start
            && source_gap <= self.max_merge_ellipse_distance as isize
        {
            return true;
        }

        // nested interleave in both texts
        next.target.token_end() > current.target.token_end()
            && current.target.token_end() > next.target.token_start
            && next.target.token_start > current.target.token_start
            && next.source.token_end() > current.source.token_end()
            && current.source.token_end() > next.source.token_start
            && next.source.token_start > current.source.token_start
    }

    /// Pass 2: resolve target-side overlaps.
    fn drop_overlapping_targets(&self, matches: Vec<InternalMatch>) -> Vec<InternalMatch> {
        if matches.is_empty() {
            return matches;
        }

        let mut result = Vec::with_capacity(matches.len());

        if self.keep_ambiguous_matches {
            // keep target-overlapping matches unless a longer competitor
            // also claims overlapping source text
            for (position, current) in matches.iter().enumerate() {
                let mut conflict = false;
                for next in &matches[position + 1..] {
                    if next.target.char_start >= current.target.char_end {
                        break;
                    }
                    let overlap_start = current.source.char_start.max(next.source.char_start);
                    let overlap_end = current.source.char_end.min(next.source.char_end);
                    if overlap_end > overlap_start
                        && current.target.token_len < next.target.token_len
                    {
                        conflict = true;
                        break;
                    }
                }
                if !conflict {
                    result.push(current.clone());
                }
            }
        } else {
            let mut iter = matches.into_iter();
            let Some(mut current) = iter.next() else {
                return result;
            };
            for next in iter {
                if next.target.char_start >= current.target.char_end {
                    result.push(current);
                    current = next;
                } else if current.target.token_len < next.target.token_len {
                    current = next;
                }
            }
            result.push(current);
        }

        result
    }

    /// Pass 3: drop matches below the minimum length. A match that begins at
    /// or right after an elided run gets a one-token allowance on the target
    /// side.
    fn drop_too_short(&self, matches: Vec<InternalMatch>) -> Vec<InternalMatch> {
        matches
            .into_iter()
            .filter(|m| {
                let source_len = m.source.token_len;
                let target_len = m.target.token_len;

                if target_len >= self.min_match_length && source_len >= self.min_match_length {
                    return true;
                }

                if target_len + 1 >= self.min_match_length {
                    let first = &self.target[m.target.token_start];
                    if first.is_elision() {
                        return true;
                    }
                    if m.target.token_start >= 1
                        && self.target[m.target.token_start - 1].is_elision()
                    {
                        return true;
                    }
                }

                false
            })
            .collect()
    }

    /// Pass 4: a long match whose tail fuzzy-matched across a sentence
    /// boundary is cut back to the delimiter. A match that genuinely *ends*
    /// on a delimiter is left alone.
    fn trim_boundary_overshoot(&self, matches: &mut [InternalMatch]) {
        for m in matches.iter_mut() {
            if m.source.token_len <= 3 {
                continue;
            }

            let source_end = m.source.token_end();
            let target_end = m.target.token_end();

            if is_delimited(&self.source[source_end - 1].text)
                || is_delimited(&self.target[target_end - 1].text)
            {
                continue;
            }

            'source_scan: for back_source in 2..4usize {
                let source_text = &self.source[source_end - back_source].text;
                if !is_delimited(source_text) {
                    continue;
                }

                for back_target in 2..4usize {
                    if back_target > target_end || back_target >= m.target.token_len {
                        continue;
                    }
                    let target_text = &self.target[target_end - back_target].text;
                    if source_text.contains(target_text.as_str()) {
                        // the delimiter token itself stays in the span
                        m.source.token_len -= back_source - 1;
                        m.target.token_len -= back_target - 1;
                        m.source.char_end = self.source[source_end - back_source].char_end;
                        m.target.char_end = self.target[target_end - back_target].char_end;
                        break 'source_scan;
                    }
                }
            }
        }
    }
}

/// Bounds of the merged pair: current's start, next's end, on both sides.
fn merge_pair(current: &InternalMatch, next: &InternalMatch) -> InternalMatch {
    let mut merged = current.clone();
    merged.source.token_len = next.source.token_end() - current.source.token_start;
    merged.source.char_end = next.source.char_end;
    merged.target.token_len = next.target.token_end() - current.target.token_start;
    merged.target.char_end = next.target.char_end;
    merged
}

fn is_delimited(text: &str) -> bool {
    text.starts_with(SENTENCE_DELIMITER) || text.ends_with(SENTENCE_DELIMITER)
}
