// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The building blocks of a comparison.
//!
//! A comparison works on two owned token sequences (source and target); all
//! token positions are indices into the sequence they belong to, never into
//! some shared arena. Character offsets are byte offsets into that text's
//! *original* input string and always fall on UTF-8 boundaries.
//!
//! # Invariants (the stuff that breaks if you ignore it)
//!
//! - **Token**: `char_start < char_end ≤ text.len()`. Immutable once created.
//! - **Span**: `char_end ≥ char_start`. Token length and character bounds
//!   only ever move together - a pass that shrinks one must shrink the other
//!   from the same token.
//! - **InternalMatch**: source and target spans are correlated but sized
//!   independently (skips and word splits make the token counts differ).

use serde::{Deserialize, Serialize};

/// One contiguous token run inside a single text, with its character range.
///
/// Internal working representation; only the character range survives into
/// the public [`Match`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Span {
    pub token_start: usize,
    pub token_len: usize,
    pub char_start: usize,
    pub char_end: usize,
}

impl Span {
    /// One past the last token position of the span.
    pub(crate) fn token_end(&self) -> usize {
        self.token_start + self.token_len
    }
}

/// A raw aligned pair of spans, produced by extension and reshaped by the
/// cleaning passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InternalMatch {
    pub source: Span,
    pub target: Span,
}

/// Transient result of growing one anchor; folded into an [`InternalMatch`]
/// once accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BestMatch {
    pub source_token_start: usize,
    pub target_token_start: usize,
    pub source_length: usize,
    pub target_length: usize,
}

/// A character range in one of the two original input strings.
///
/// `start` and `end` are byte offsets; `text` carries the matched substring
/// when the detector is configured with `include_text_in_result`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSpan {
    pub start: usize,
    pub end: usize,
    pub text: Option<String>,
}

impl MatchSpan {
    /// Length of the matched character range in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// True when the span covers no characters.
    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

/// One detected reuse: a span of the source text aligned with a span of the
/// target text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub source: MatchSpan,
    pub target: MatchSpan,
}
