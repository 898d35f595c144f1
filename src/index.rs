//! Candidate index over the source text.
//!
//! Every window of `initial_match_length` consecutive source tokens is
//! reduced to a fingerprint: the concatenation of the tokens' comparison
//! text, stripped of special characters. The index maps each fingerprint to
//! the ordered list of its starting positions and files the fingerprint's
//! character sketch for approximate lookup.
//!
//! # INVARIANTS (DO NOT VIOLATE)
//!
//! 1. **POSITIONS_ORDERED**: Every position list is ascending (windows are
//!    scanned left to right).
//! 2. **SKETCH_ONCE**: A fingerprint enters the sketch index exactly once,
//!    on first occurrence; duplicates only extend the position list.
//! 3. **IMMUTABLE**: A built index is never mutated - that is what makes it
//!    safe to cache and share across `compare` calls.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::fuzzy::strip_special;
use crate::sketch::{CharSketch, SketchIndex};
use crate::tokenize::Token;

/// Precomputed fingerprint index for one source text.
///
/// Built by [`Detector::prepare_source_data`](crate::Detector::prepare_source_data)
/// (or internally by `compare`); reusable across any number of comparisons
/// against the same source text. Read-only after construction.
#[derive(Debug, Clone)]
pub struct SourceIndex {
    fingerprints: HashMap<String, Vec<usize>>,
    sketches: SketchIndex,
}

impl SourceIndex {
    pub(crate) fn build(tokens: &[Token], window: usize, lsh_threshold: f64) -> Self {
        let mut fingerprints: HashMap<String, Vec<usize>> = HashMap::new();
        let mut sketches = SketchIndex::new(lsh_threshold);

        if let Some(last) = tokens.len().checked_sub(window) {
            for position in 0..=last {
                let mut joined = String::new();
                for token in &tokens[position..position + window] {
                    joined.push_str(&token.text);
                }
                let fingerprint = strip_special(&joined);

                match fingerprints.entry(fingerprint) {
                    Entry::Occupied(mut occupied) => occupied.get_mut().push(position),
                    Entry::Vacant(vacant) => {
                        sketches.insert(vacant.key().clone(), &CharSketch::of(vacant.key()));
                        vacant.insert(vec![position]);
                    }
                }
            }
        }

        Self {
            fingerprints,
            sketches,
        }
    }

    /// Source token positions where `fingerprint` starts, in ascending order.
    pub(crate) fn positions(&self, fingerprint: &str) -> Option<&[usize]> {
        self.fingerprints.get(fingerprint).map(Vec::as_slice)
    }

    pub(crate) fn sketches(&self) -> &SketchIndex {
        &self.sketches
    }

    /// Number of distinct fingerprints.
    pub fn len(&self) -> usize {
        self.fingerprints.len()
    }

    /// True when the source text had fewer tokens than one window.
    pub fn is_empty(&self) -> bool {
        self.fingerprints.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenize::tokenize;

    #[test]
    fn indexes_every_window_of_the_source() {
        let tokens = tokenize("the quick brown fox jumps");
        let index = SourceIndex::build(&tokens, 3, 0.7);
        assert_eq!(index.len(), 3);
        assert_eq!(index.positions("thequickbrown"), Some(&[0][..]));
        assert_eq!(index.positions("quickbrownfox"), Some(&[1][..]));
        assert_eq!(index.positions("brownfoxjumps"), Some(&[2][..]));
    }

    #[test]
    fn repeated_fingerprints_share_one_entry() {
        let tokens = tokenize("ab cd ef ab cd ef");
        let index = SourceIndex::build(&tokens, 3, 0.7);
        assert_eq!(index.positions("abcdef"), Some(&[0, 3][..]));
        // the sketch index holds each fingerprint once
        assert_eq!(index.sketches().len(), index.len());
    }

    #[test]
    fn fingerprints_drop_sentence_delimiters() {
        let tokens = tokenize("the lazy dog.");
        let index = SourceIndex::build(&tokens, 3, 0.7);
        assert_eq!(index.positions("thelazydog"), Some(&[0][..]));
    }

    #[test]
    fn too_short_input_builds_an_empty_index() {
        let tokens = tokenize("only two");
        let index = SourceIndex::build(&tokens, 3, 0.7);
        assert!(index.is_empty());
    }
}
