//! Anchor resolution: which target windows plausibly continue which source
//! positions.
//!
//! The target text is scanned window by window; each window's fingerprint is
//! shortlisted against the sketch index and the single closest source
//! fingerprint (if any clears the exact threshold) contributes one anchor
//! per source occurrence.
//!
//! The result is the per-call [`ForwardReferences`] multimap - the one piece
//! of genuinely mutable shared state in a comparison. Extension *consumes*
//! it: popping an anchor removes it, and accepting a match retires every
//! anchor inside the claimed region, so a target position seeds at most one
//! growing alignment.

use std::collections::{BTreeMap, VecDeque};

use crate::fuzzy::{closest, strip_special};
use crate::index::SourceIndex;
use crate::sketch::CharSketch;
use crate::tokenize::Token;

/// Ordered multimap from source token position to pending target anchors.
///
/// Target positions are queued in scan order, so the front of each queue is
/// always the earliest unconsumed anchor. Iteration order over source
/// positions is ascending (`BTreeMap`), keeping the whole pipeline
/// deterministic.
#[derive(Debug, Default, Clone)]
pub(crate) struct ForwardReferences {
    refs: BTreeMap<usize, VecDeque<usize>>,
}

impl ForwardReferences {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, source_pos: usize, target_pos: usize) {
        self.refs.entry(source_pos).or_default().push_back(target_pos);
    }

    /// Pop the earliest unconsumed anchor queued under `source_pos`.
    pub(crate) fn pop_front(&mut self, source_pos: usize) -> Option<usize> {
        self.refs.get_mut(&source_pos)?.pop_front()
    }

    /// Does `source_pos` still have queued anchors?
    pub(crate) fn has_pending(&self, source_pos: usize) -> bool {
        self.refs.get(&source_pos).is_some_and(|queue| !queue.is_empty())
    }

    /// Remove one specific queued anchor, wherever it sits in the queue.
    pub(crate) fn remove(&mut self, source_pos: usize, target_pos: usize) {
        if let Some(queue) = self.refs.get_mut(&source_pos) {
            if let Some(at) = queue.iter().position(|&t| t == target_pos) {
                queue.remove(at);
            }
        }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (usize, &VecDeque<usize>)> {
        self.refs.iter().map(|(&source_pos, queue)| (source_pos, queue))
    }

    #[cfg(test)]
    pub(crate) fn total(&self) -> usize {
        self.refs.values().map(VecDeque::len).sum()
    }
}

/// Scan the target text and collect forward references against the source
/// index.
pub(crate) fn resolve_anchors(
    target_tokens: &[Token],
    index: &SourceIndex,
    window: usize,
    min_similarity: f64,
) -> ForwardReferences {
    let mut refs = ForwardReferences::new();

    let Some(last) = target_tokens.len().checked_sub(window) else {
        return refs;
    };

    for target_pos in 0..=last {
        let mut fingerprint = String::new();
        for token in &target_tokens[target_pos..target_pos + window] {
            fingerprint.push_str(&strip_special(&token.text));
        }

        let candidates = index.sketches().query(&CharSketch::of(&fingerprint));
        if let Some(key) = closest(&candidates, &fingerprint, min_similarity) {
            if let Some(positions) = index.positions(key) {
                for &source_pos in positions {
                    refs.push(source_pos, target_pos);
                }
            }
        }
    }

    refs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenize::tokenize;

    fn index_of(text: &str) -> (Vec<Token>, SourceIndex) {
        let tokens = tokenize(text);
        let index = SourceIndex::build(&tokens, 3, 0.7);
        (tokens, index)
    }

    #[test]
    fn queues_are_fifo() {
        let mut refs = ForwardReferences::new();
        refs.push(4, 10);
        refs.push(4, 20);
        assert!(refs.has_pending(4));
        assert_eq!(refs.pop_front(4), Some(10));
        assert_eq!(refs.pop_front(4), Some(20));
        assert_eq!(refs.pop_front(4), None);
        assert!(!refs.has_pending(4));
    }

    #[test]
    fn remove_deletes_from_the_middle() {
        let mut refs = ForwardReferences::new();
        refs.push(0, 1);
        refs.push(0, 2);
        refs.push(0, 3);
        refs.remove(0, 2);
        assert_eq!(refs.pop_front(0), Some(1));
        assert_eq!(refs.pop_front(0), Some(3));
    }

    #[test]
    fn identical_windows_anchor_every_position() {
        let (_, index) = index_of("the quick brown fox jumps");
        let target_tokens = tokenize("the quick brown fox jumps");
        let refs = resolve_anchors(&target_tokens, &index, 3, 0.85);
        // each of the three target windows anchors its source twin
        assert_eq!(refs.total(), 3);
        let mut refs = refs;
        assert_eq!(refs.pop_front(0), Some(0));
        assert_eq!(refs.pop_front(1), Some(1));
        assert_eq!(refs.pop_front(2), Some(2));
    }

    #[test]
    fn repeated_source_fingerprints_fan_out() {
        let (_, index) = index_of("ab cd ef gh ab cd ef");
        let target_tokens = tokenize("ab cd ef");
        let refs = resolve_anchors(&target_tokens, &index, 3, 0.85);
        let mut refs = refs;
        // "abcdef" starts at source positions 0 and 4
        assert_eq!(refs.pop_front(0), Some(0));
        assert_eq!(refs.pop_front(4), Some(0));
    }

    #[test]
    fn dissimilar_windows_produce_no_anchors() {
        let (_, index) = index_of("alpha beta gamma delta");
        let target_tokens = tokenize("uvw xyz pqr stu");
        let refs = resolve_anchors(&target_tokens, &index, 3, 0.85);
        assert_eq!(refs.total(), 0);
    }

    #[test]
    fn short_target_yields_nothing() {
        let (_, index) = index_of("one two three four");
        let refs = resolve_anchors(&tokenize("one two"), &index, 3, 0.85);
        assert_eq!(refs.total(), 0);
    }
}
