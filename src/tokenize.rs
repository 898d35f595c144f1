//! Text normalization and tokenization.
//!
//! The cleaning pipeline rewrites a working copy of the input character by
//! character; every pass is length-preserving, so a character's index in the
//! working copy always equals its index in the original input. That is what
//! lets tokens carry offsets into the *original* string while being matched
//! on normalized text.
//!
//! Two reserved characters encode structure the matcher cares about:
//! ellipsis notations collapse into runs of the elision marker, and
//! sentence-terminal punctuation becomes the sentence delimiter. Short
//! bracketed editorial annotations like `[s]` or `[er]` are preserved
//! through the scrub via a temporary marker pair.

/// Marker for one collapsed ellipsis character.
pub(crate) const ELISION_MARKER: char = '@';

/// Marker replacing sentence-terminal punctuation (`. ; ! ?`).
pub(crate) const SENTENCE_DELIMITER: char = '\u{2190}';

/// Temporary wrapper protecting short bracketed annotations during the scrub.
const ANNOTATION_MARKER: char = '\u{2191}';

/// Characters the pipeline uses internally; their presence in raw input is
/// advisory-logged but never fatal.
pub(crate) const RESERVED_CHARACTERS: [char; 2] = [SENTENCE_DELIMITER, ANNOTATION_MARKER];

/// A cleaned word-like unit with byte offsets into the original input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Normalized comparison text (lower-cased, folded, bracket-stripped).
    pub text: String,
    /// Byte offset of the first character of the token in the original input.
    pub char_start: usize,
    /// Byte offset one past the last character of the token.
    pub char_end: usize,
}

impl Token {
    /// True when the token stands for an elided run (`...`, `[...]`, `…`).
    pub(crate) fn is_elision(&self) -> bool {
        self.text.starts_with(ELISION_MARKER)
    }
}

/// Split a raw text into cleaned tokens with original byte offsets.
///
/// Malformed input is never an error; it simply yields fewer or different
/// tokens.
pub fn tokenize(input: &str) -> Vec<Token> {
    warn_on_reserved(input);

    let mut chars: Vec<char> = Vec::with_capacity(input.len());
    // byte offset of every character, plus a sentinel for the end
    let mut offsets: Vec<usize> = Vec::with_capacity(input.len() + 1);
    for (offset, c) in input.char_indices() {
        offsets.push(offset);
        chars.push(c);
    }
    offsets.push(input.len());

    collapse_ellipses(&mut chars);
    mark_sentence_delimiters(&mut chars);
    wrap_annotations(&mut chars);
    scrub_foreign_characters(&mut chars);
    unwrap_annotations(&mut chars);
    lowercase_in_place(&mut chars);

    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        if chars[i].is_whitespace() {
            i += 1;
            continue;
        }
        let run_start = i;
        while i < chars.len() && !chars[i].is_whitespace() {
            i += 1;
        }
        let raw: String = chars[run_start..i].iter().collect();
        let text = fold_word(&raw);
        if !text.is_empty() {
            tokens.push(Token {
                text,
                char_start: offsets[run_start],
                char_end: offsets[i],
            });
        }
    }

    tokens
}

fn warn_on_reserved(input: &str) {
    for reserved in RESERVED_CHARACTERS {
        if input.contains(reserved) {
            tracing::warn!(
                character = %reserved.escape_unicode(),
                "input contains a reserved marker character; results may be distorted"
            );
        }
    }
}

/// Collapse `[...]`, `[…]`, `...` and `…` into runs of the elision marker,
/// one marker per replaced character so offsets stay aligned.
fn collapse_ellipses(chars: &mut [char]) {
    let mut i = 0;
    while i < chars.len() {
        let replaced = if starts_with_at(chars, i, &['[', '.', '.', '.', ']']) {
            5
        } else if starts_with_at(chars, i, &['[', '\u{2026}', ']']) {
            3
        } else if starts_with_at(chars, i, &['.', '.', '.']) {
            3
        } else if chars[i] == '\u{2026}' {
            1
        } else {
            0
        };

        if replaced == 0 {
            i += 1;
        } else {
            for c in &mut chars[i..i + replaced] {
                *c = ELISION_MARKER;
            }
            i += replaced;
        }
    }
}

fn starts_with_at(chars: &[char], at: usize, needle: &[char]) -> bool {
    chars.len() - at >= needle.len() && chars[at..at + needle.len()] == *needle
}

fn mark_sentence_delimiters(chars: &mut [char]) {
    for c in chars.iter_mut() {
        if matches!(*c, '.' | ';' | '!' | '?') {
            *c = SENTENCE_DELIMITER;
        }
    }
}

/// Temporarily rewrite `[s]`, `[er]` etc. (1-3 ASCII letters in brackets) so
/// the brackets survive the scrub pass.
fn wrap_annotations(chars: &mut [char]) {
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '[' {
            let mut j = i + 1;
            while j < chars.len() && j <= i + 3 && chars[j].is_ascii_alphabetic() {
                j += 1;
            }
            if j > i + 1 && j < chars.len() && chars[j] == ']' {
                chars[i] = ANNOTATION_MARKER;
                chars[j] = ANNOTATION_MARKER;
                i = j + 1;
                continue;
            }
        }
        i += 1;
    }
}

fn unwrap_annotations(chars: &mut [char]) {
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == ANNOTATION_MARKER {
            let mut j = i + 1;
            while j < chars.len() && j <= i + 3 && chars[j].is_ascii_alphabetic() {
                j += 1;
            }
            if j > i + 1 && j < chars.len() && chars[j] == ANNOTATION_MARKER {
                chars[i] = '[';
                chars[j] = ']';
                i = j + 1;
                continue;
            }
        }
        i += 1;
    }
}

/// Replace every character that is neither a word character, a marker, nor a
/// space with a space; digits go too.
fn scrub_foreign_characters(chars: &mut [char]) {
    for c in chars.iter_mut() {
        let is_word = c.is_alphanumeric() || *c == '_';
        let is_marker = matches!(*c, ELISION_MARKER | SENTENCE_DELIMITER | ANNOTATION_MARKER);
        if (!is_word && !is_marker && *c != ' ') || c.is_numeric() {
            *c = ' ';
        }
    }
}

/// Lowercase each character, but only where the mapping is one-to-one;
/// anything that would expand (ligatures and friends) keeps its case so the
/// buffer length stays fixed.
fn lowercase_in_place(chars: &mut [char]) {
    for c in chars.iter_mut() {
        let mut lowered = c.to_lowercase();
        if let (Some(single), None) = (lowered.next(), lowered.next()) {
            *c = single;
        }
    }
}

/// Word-level folding applied to the comparison text only; offsets keep
/// pointing at the unfolded characters.
fn fold_word(raw: &str) -> String {
    raw.replace('\u{00df}', "ss")
        .replace('\u{00e4}', "ae")
        .replace('\u{00f6}', "oe")
        .replace('\u{00fc}', "ue")
        .replace("ey", "ei")
        .replace(['[', ']'], "")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn splits_on_whitespace_and_lowercases() {
        let tokens = tokenize("The Quick  Brown");
        assert_eq!(texts(&tokens), ["the", "quick", "brown"]);
        assert_eq!(tokens[0].char_start, 0);
        assert_eq!(tokens[0].char_end, 3);
        assert_eq!(tokens[2].char_start, 11);
        assert_eq!(tokens[2].char_end, 16);
    }

    #[test]
    fn sentence_punctuation_becomes_a_delimiter() {
        let tokens = tokenize("End. Next");
        assert_eq!(tokens[0].text, format!("end{}", SENTENCE_DELIMITER));
        // the delimiter stays attached to the word, covering the '.'
        assert_eq!(tokens[0].char_end, 4);
    }

    #[test]
    fn ellipsis_notations_collapse_into_markers() {
        assert_eq!(texts(&tokenize("a ... b")), ["a", "@@@", "b"]);
        assert_eq!(texts(&tokenize("a [...] b")), ["a", "@@@@@", "b"]);
        assert_eq!(texts(&tokenize("a \u{2026} b")), ["a", "@", "b"]);
        assert_eq!(texts(&tokenize("a [\u{2026}] b")), ["a", "@@@", "b"]);
    }

    #[test]
    fn elision_marker_offsets_cover_the_original_notation() {
        let tokens = tokenize("a [...] b");
        assert_eq!(tokens[1].char_start, 2);
        assert_eq!(tokens[1].char_end, 7);
        assert!(tokens[1].is_elision());
    }

    #[test]
    fn short_bracketed_annotations_survive() {
        let tokens = tokenize("da[s] Werk");
        assert_eq!(texts(&tokens), ["das", "werk"]);
        // offsets still cover the bracketed original
        assert_eq!(tokens[0].char_start, 0);
        assert_eq!(tokens[0].char_end, 5);
    }

    #[test]
    fn long_bracketed_runs_are_scrubbed() {
        // four letters exceed the annotation limit, brackets become spaces
        assert_eq!(texts(&tokenize("word [abcd] tail")), ["word", "abcd", "tail"]);
    }

    #[test]
    fn digits_and_symbols_become_separators() {
        assert_eq!(texts(&tokenize("one 123 two,three")), ["one", "two", "three"]);
    }

    #[test]
    fn german_letters_fold_in_comparison_text_only() {
        let tokens = tokenize("M\u{00fc}ller stra\u{00df}e");
        assert_eq!(texts(&tokens), ["mueller", "strasse"]);
        // byte offsets refer to the original string
        assert_eq!(tokens[0].char_start, 0);
        assert_eq!(tokens[0].char_end, "M\u{00fc}ller".len());
    }

    #[test]
    fn ey_folds_to_ei() {
        assert_eq!(texts(&tokenize("Meyer")), ["meier"]);
    }

    #[test]
    fn empty_and_blank_input_yield_no_tokens() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \t\n ").is_empty());
        assert!(tokenize("12 34 --").is_empty());
    }

    #[test]
    fn reserved_characters_do_not_abort_tokenization() {
        let tokens = tokenize("before \u{2190} after");
        assert_eq!(texts(&tokens), ["before", "\u{2190}", "after"]);
    }
}
