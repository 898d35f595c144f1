//! Fuzzy token comparison: are two token strings "the same"?
//!
//! Decisions go through normalized Levenshtein similarity (`strsim`), with
//! one escape hatch: strings shorter than two characters degenerate to exact
//! equality, because edit-distance ratios on single characters are noise.

use crate::tokenize::ELISION_MARKER;

/// Strip everything that is not a word character, an elision marker, or a
/// space. Elision markers are dropped as well once real word characters
/// remain; a pure marker run keeps them so it stays comparable.
pub(crate) fn strip_special(input: &str) -> String {
    let mut kept: String = input
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == ELISION_MARKER || *c == ' ')
        .collect();

    if kept.chars().any(|c| c.is_alphanumeric() || c == '_') {
        kept.retain(|c| c != ELISION_MARKER);
    }

    kept
}

/// Do the two token strings match under the configured similarity threshold?
pub(crate) fn fuzzy_match(a: &str, b: &str, min_similarity: f64) -> bool {
    let a = strip_special(a);
    let b = strip_special(b);

    if a.chars().count().min(b.chars().count()) < 2 {
        return a == b;
    }

    strsim::normalized_levenshtein(&a, &b) >= min_similarity
}

/// Pick the candidate closest to `word`: an exact hit wins outright,
/// otherwise the best-scoring candidate at or above the threshold.
///
/// Candidates are scanned in the order given and ties keep the earlier
/// entry, so callers that pass candidates in index insertion order get a
/// deterministic tie-break (lowest first source position).
///
/// Both `word` and the candidates are expected to be already stripped; index
/// fingerprints are stored that way.
pub(crate) fn closest<'a>(
    candidates: &[&'a str],
    word: &str,
    min_similarity: f64,
) -> Option<&'a str> {
    if candidates.is_empty() {
        return None;
    }

    if let Some(exact) = candidates.iter().find(|c| **c == word) {
        return Some(exact);
    }

    let mut best: Option<(&'a str, f64)> = None;
    for candidate in candidates {
        let score = strsim::normalized_levenshtein(candidate, word);
        if score >= min_similarity && best.map_or(true, |(_, top)| score > top) {
            best = Some((candidate, score));
        }
    }

    best.map(|(candidate, _)| candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stripping_removes_delimiters_and_markers() {
        assert_eq!(strip_special("dog\u{2190}"), "dog");
        assert_eq!(strip_special("foo@@@"), "foo");
    }

    #[test]
    fn pure_marker_runs_keep_their_markers() {
        assert_eq!(strip_special("@@@"), "@@@");
    }

    #[test]
    fn identical_strings_match_at_any_threshold() {
        assert!(fuzzy_match("paraphrase", "paraphrase", 1.0));
    }

    #[test]
    fn single_character_comparison_is_exact() {
        assert!(fuzzy_match("a", "a", 0.0));
        assert!(!fuzzy_match("a", "b", 0.0));
    }

    #[test]
    fn close_words_match_at_default_threshold() {
        // one substitution in a ten-letter word: similarity 0.9
        assert!(fuzzy_match("goldsmiths", "goldsmitts", 0.85));
        assert!(!fuzzy_match("quick", "swift", 0.85));
    }

    #[test]
    fn closest_prefers_an_exact_hit() {
        let candidates = ["abcde", "abcdx"];
        assert_eq!(closest(&candidates, "abcdx", 0.85), Some("abcdx"));
    }

    #[test]
    fn closest_falls_back_to_best_scoring_candidate() {
        let candidates = ["abcdefghij", "zzzzzzzzzz"];
        assert_eq!(closest(&candidates, "abcdefghix", 0.85), Some("abcdefghij"));
    }

    #[test]
    fn closest_respects_the_cutoff() {
        let candidates = ["abcdefghij"];
        assert_eq!(closest(&candidates, "zzzzzzzzzz", 0.85), None);
    }

    #[test]
    fn closest_ties_keep_the_earliest_candidate() {
        // both are one edit away from the word
        let candidates = ["abcx", "abcy"];
        assert_eq!(closest(&candidates, "abcz", 0.5), Some("abcx"));
    }

    #[test]
    fn closest_of_nothing_is_none() {
        assert_eq!(closest(&[], "anything", 0.5), None);
    }
}
