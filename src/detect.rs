//! Top-level comparison driver.
//!
//! A [`Detector`] is built once from a validated [`DetectorConfig`] and then
//! compares any number of text pairs. Each comparison runs the full pipeline:
//! tokenize both texts, index the source, resolve anchors in the target,
//! extend anchors into aligned runs, and clean the raw runs into the final
//! match list. The source-side index can be built once up front with
//! [`Detector::prepare_source_data`] and reused across targets.

use tracing::debug;

use crate::anchor::resolve_anchors;
use crate::clean::Cleaner;
use crate::config::{ConfigError, DetectorConfig};
use crate::extend::Extender;
use crate::index::SourceIndex;
use crate::tokenize::tokenize;
use crate::types::{Match, MatchSpan};

/// Reusable comparison engine.
#[derive(Debug, Clone)]
pub struct Detector {
    config: DetectorConfig,
    /// Anchor window size. `min(3, min_match_length)`.
    initial_match_length: usize,
    /// Candidate-lookup threshold, slacker than the verification threshold
    /// so near-misses still surface as candidates.
    lsh_threshold: f64,
}

impl Detector {
    /// Build a detector, rejecting configurations that cannot work.
    pub fn new(config: DetectorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let initial_match_length = config.min_match_length.min(3);
        let lsh_threshold = (config.min_levenshtein_similarity - 0.15).max(0.0);
        Ok(Self {
            config,
            initial_match_length,
            lsh_threshold,
        })
    }

    /// Index a source text for repeated comparisons against many targets.
    pub fn prepare_source_data(&self, source_text: &str) -> SourceIndex {
        let tokens = tokenize(source_text);
        SourceIndex::build(&tokens, self.initial_match_length, self.lsh_threshold)
    }

    /// Compare a target text against a source text.
    pub fn compare(&self, source_text: &str, target_text: &str) -> Vec<Match> {
        let index = self.prepare_source_data(source_text);
        self.run(source_text, target_text, &index)
    }

    /// Compare against a previously prepared source index. The index must
    /// have been built from `source_text` by this detector's configuration.
    pub fn compare_with_index(
        &self,
        source_text: &str,
        target_text: &str,
        index: &SourceIndex,
    ) -> Vec<Match> {
        self.run(source_text, target_text, index)
    }

    fn run(&self, source_text: &str, target_text: &str, index: &SourceIndex) -> Vec<Match> {
        if source_text.is_empty() || target_text.is_empty() {
            return Vec::new();
        }

        let source = tokenize(source_text);
        let target = tokenize(target_text);
        if source.len() < self.initial_match_length || target.len() < self.initial_match_length {
            return Vec::new();
        }

        let refs = resolve_anchors(
            &target,
            index,
            self.initial_match_length,
            self.config.min_levenshtein_similarity,
        );
        debug!(
            source_tokens = source.len(),
            target_tokens = target.len(),
            anchors = refs.iter().map(|(_, targets)| targets.len()).sum::<usize>(),
            "anchors resolved"
        );

        let mut extender = Extender {
            source: &source,
            target: &target,
            refs,
            initial_match_length: self.initial_match_length,
            look_back_limit: self.config.look_back_limit,
            look_ahead_limit: self.config.look_ahead_limit,
            min_similarity: self.config.min_levenshtein_similarity,
        };
        let raw = extender.find_all_matches();
        debug!(raw_matches = raw.len(), "extension finished");

        let cleaner = Cleaner {
            source: &source,
            target: &target,
            min_match_length: self.config.min_match_length,
            max_merge_distance: self.config.max_merge_distance,
            max_merge_ellipse_distance: self.config.max_merge_ellipse_distance,
            keep_ambiguous_matches: self.config.keep_ambiguous_matches,
        };
        let cleaned = cleaner.clean(raw);

        cleaned
            .into_iter()
            .map(|m| Match {
                source: self.public_span(source_text, m.source.char_start, m.source.char_end),
                target: self.public_span(target_text, m.target.char_start, m.target.char_end),
            })
            .collect()
    }

    fn public_span(&self, text: &str, start: usize, end: usize) -> MatchSpan {
        MatchSpan {
            start,
            end,
            text: self
                .config
                .include_text_in_result
                .then(|| text[start..end].to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> Detector {
        Detector::new(DetectorConfig::default()).unwrap()
    }

    #[test]
    fn identical_sentences_yield_one_full_match() {
        let text = "The quick brown fox jumps over the lazy dog.";
        let matches = detector().compare(text, text);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].source.start, 0);
        assert_eq!(matches[0].source.end, text.len());
        assert_eq!(matches[0].target.text.as_deref(), Some(text));
    }

    #[test]
    fn empty_inputs_yield_no_matches() {
        let detector = detector();
        assert!(detector.compare("", "The quick brown fox.").is_empty());
        assert!(detector.compare("The quick brown fox.", "").is_empty());
    }

    #[test]
    fn unrelated_texts_yield_no_matches() {
        let matches = detector().compare(
            "The quick brown fox jumps over the lazy dog.",
            "Colourless green ideas sleep furiously every single night.",
        );
        assert!(matches.is_empty());
    }

    #[test]
    fn match_text_is_omitted_on_request() {
        let config = DetectorConfig {
            include_text_in_result: false,
            ..DetectorConfig::default()
        };
        let text = "The quick brown fox jumps over the lazy dog.";
        let matches = Detector::new(config).unwrap().compare(text, text);
        assert_eq!(matches.len(), 1);
        assert!(matches[0].source.text.is_none());
        assert!(matches[0].target.text.is_none());
    }

    #[test]
    fn a_prepared_index_matches_direct_comparison() {
        let detector = detector();
        let source = "The quick brown fox jumps over the lazy dog.";
        let target = "A reporter saw the quick brown fox jumps over the lazy dog again.";
        let index = detector.prepare_source_data(source);
        assert_eq!(
            detector.compare(source, target),
            detector.compare_with_index(source, target, &index)
        );
    }
}
