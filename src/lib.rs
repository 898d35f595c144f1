//! Fuzzy text-reuse detection between a source text and a target text.
//!
//! This crate finds passages of a target text that reuse passages of a
//! source text, tolerating spelling variation, small insertions and
//! deletions, merged or split words, and elisions marked with `[...]`.
//! Offsets in the results are byte offsets into the original input strings,
//! so matched passages can be sliced out directly.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌─────────────┐
//! │ tokenize.rs │────▶│   index.rs   │────▶│  anchor.rs  │
//! │  (Token,    │     │ (SourceIndex,│     │ (Forward-   │
//! │  tokenize)  │     │  sketch.rs)  │     │ References) │
//! └─────────────┘     └──────────────┘     └─────────────┘
//!                                                 │
//!                                                 ▼
//! ┌─────────────┐     ┌──────────────┐     ┌─────────────┐
//! │  detect.rs  │◀────│   clean.rs   │◀────│  extend.rs  │
//! │ (Detector)  │     │  (Cleaner)   │     │ (Extender)  │
//! └─────────────┘     └──────────────┘     └─────────────┘
//! ```
//!
//! The pipeline: both texts are tokenized into normalized comparison tokens
//! that remember their original byte range. Every window of consecutive
//! source tokens is fingerprinted and indexed, with a MinHash sketch index
//! over the fingerprints for fuzzy lookup. Target windows are resolved
//! against the index into anchors, anchors are greedily extended forwards
//! and backwards into aligned runs, and the raw runs are merged, de-
//! overlapped, pruned, and trimmed into the final match list.
//!
//! # Usage
//!
//! ```
//! use reusex::{Detector, DetectorConfig};
//!
//! let detector = Detector::new(DetectorConfig::default()).unwrap();
//! let matches = detector.compare(
//!     "The quick brown fox jumps over the lazy dog.",
//!     "He wrote that the quick brown fox jumps over the lazy dog.",
//! );
//! assert_eq!(matches.len(), 1);
//! ```

mod anchor;
mod clean;
pub mod config;
mod detect;
mod extend;
mod fuzzy;
pub mod index;
pub mod sketch;
pub mod tokenize;
mod types;

// Re-exports for public API
pub use config::{ConfigError, DetectorConfig};
pub use detect::Detector;
pub use index::SourceIndex;
pub use sketch::{CharSketch, SketchIndex};
pub use tokenize::{tokenize, Token};
pub use types::{Match, MatchSpan};
