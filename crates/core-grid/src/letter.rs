//! Letter classification for cell values.
//!
//! A cell value is a single extended grapheme cluster whose leading scalar is
//! in the Unicode `Letter` general category (`\p{L}`). Digits, punctuation and
//! whitespace are rejected. Input is NFC normalized before segmentation so a
//! decomposed sequence (e.g. `e` + combining acute) is treated as one letter.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

static LETTER: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^\p{L}").ok());

/// True when `text` begins with a `\p{L}` scalar.
pub fn starts_with_letter(text: &str) -> bool {
    LETTER.as_ref().is_some_and(|re| re.is_match(text))
}

/// True when `text` is exactly one grapheme cluster that starts with a letter.
pub fn is_letter_grapheme(text: &str) -> bool {
    let normalized: String = text.nfc().collect();
    let mut graphemes = normalized.graphemes(true);
    match (graphemes.next(), graphemes.next()) {
        (Some(g), None) => starts_with_letter(g),
        _ => false,
    }
}

/// First grapheme of `text` (after NFC normalization) when it is a letter.
/// Used to reduce free-form compound input to a single cell value.
pub fn first_letter_grapheme(text: &str) -> Option<String> {
    let normalized: String = text.nfc().collect();
    let first = normalized.graphemes(true).next()?;
    starts_with_letter(first).then(|| first.to_string())
}
