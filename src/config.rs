//! Detector configuration and its eager validation.
//!
//! Every parameter is checked at construction time, before any text is
//! touched. A `compare` call can therefore never fail halfway through: it
//! either runs to completion or the detector was refused up front.
//!
//! Count-valued limits (`look_back_limit`, `look_ahead_limit`,
//! `max_merge_distance`, `max_merge_ellipse_distance`) are `usize`, so their
//! non-negativity is carried by the type system rather than a runtime check.

use std::fmt;

/// Tuning knobs for a [`Detector`](crate::Detector).
///
/// The defaults are the values the algorithm was calibrated with; most
/// callers only ever touch `min_match_length` and
/// `min_levenshtein_similarity`.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    /// Minimum number of tokens both spans of a reported match must cover.
    pub min_match_length: usize,
    /// Maximum number of source tokens probed backwards when a match starts
    /// right after an elided run in the target.
    pub look_back_limit: usize,
    /// Maximum number of source tokens skipped forwards across an elision
    /// marker during extension.
    pub look_ahead_limit: usize,
    /// Maximum token gap (both texts) between two matches considered for
    /// merging.
    pub max_merge_distance: usize,
    /// Maximum source-side token gap for merging across an ellipsis in the
    /// target.
    pub max_merge_ellipse_distance: usize,
    /// Fill the matched substrings into the returned [`MatchSpan`]s.
    ///
    /// [`MatchSpan`]: crate::MatchSpan
    pub include_text_in_result: bool,
    /// Keep target-overlapping matches as long as their source ranges do not
    /// overlap as well; otherwise only the longest competitor survives.
    pub keep_ambiguous_matches: bool,
    /// Similarity threshold in `[0, 1]` for two token strings (and the
    /// initial n-grams) to count as the same.
    pub min_levenshtein_similarity: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_match_length: 5,
            look_back_limit: 10,
            look_ahead_limit: 3,
            max_merge_distance: 2,
            max_merge_ellipse_distance: 10,
            include_text_in_result: true,
            keep_ambiguous_matches: false,
            min_levenshtein_similarity: 0.85,
        }
    }
}

impl DetectorConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.min_match_length < 1 {
            return Err(ConfigError::MinMatchLengthTooSmall {
                given: self.min_match_length,
            });
        }

        if !(0.0..=1.0).contains(&self.min_levenshtein_similarity) {
            return Err(ConfigError::SimilarityOutOfRange {
                given: self.min_levenshtein_similarity,
            });
        }

        Ok(())
    }
}

/// Error type for invalid construction parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// `min_match_length` must be at least 1.
    MinMatchLengthTooSmall { given: usize },
    /// `min_levenshtein_similarity` must lie in `[0, 1]`.
    SimilarityOutOfRange { given: f64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MinMatchLengthTooSmall { given } => {
                write!(f, "min match length must be >= 1, got {}", given)
            }
            ConfigError::SimilarityOutOfRange { given } => {
                write!(
                    f,
                    "min levenshtein similarity must be between 0 and 1, got {}",
                    given
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(DetectorConfig::default().validate(), Ok(()));
    }

    #[test]
    fn zero_min_match_length_is_rejected() {
        let config = DetectorConfig {
            min_match_length: 0,
            ..DetectorConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::MinMatchLengthTooSmall { given: 0 })
        );
    }

    #[test]
    fn min_match_length_of_one_is_accepted() {
        let config = DetectorConfig {
            min_match_length: 1,
            ..DetectorConfig::default()
        };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn similarity_outside_unit_interval_is_rejected() {
        for bad in [-0.1, 1.1, 2.0] {
            let config = DetectorConfig {
                min_levenshtein_similarity: bad,
                ..DetectorConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::SimilarityOutOfRange { .. })
            ));
        }
    }

    #[test]
    fn errors_render_the_offending_value() {
        let error = ConfigError::MinMatchLengthTooSmall { given: 0 };
        assert!(error.to_string().contains("min match length"));
    }
}
