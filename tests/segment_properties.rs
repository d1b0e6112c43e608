//! Generated-input tests for the verse segmenter.
//!
//! These hold for every input, so they are checked over random strings
//! rather than hand-picked cases.

use charaka_pipeline::pipeline::segment::{clean_sanskrit, contains_devanagari};
use charaka_pipeline::segment;
use proptest::prelude::*;

/// Text that looks like OCR output: Devanagari, dandas, digits, brackets,
/// Latin noise and assorted line breaks.
const VERSE_LIKE: &str =
    "[\u{0900}-\u{097F}a-zA-Z0-9 \t\n\r\u{000C}\u{2028}।॥.\\[\\]-]{0,300}";

proptest! {
    #[test]
    fn clean_is_idempotent(text in ".{0,300}") {
        let once = clean_sanskrit(&text);
        prop_assert_eq!(clean_sanskrit(&once), once);
    }

    #[test]
    fn clean_is_idempotent_on_verse_like_text(text in VERSE_LIKE) {
        let once = clean_sanskrit(&text);
        prop_assert_eq!(clean_sanskrit(&once), once);
    }

    #[test]
    fn clean_keeps_only_devanagari_and_single_spaces(text in VERSE_LIKE) {
        let out = clean_sanskrit(&text);
        prop_assert!(!out.contains("  "));
        prop_assert_eq!(out.trim(), out.as_str());
        prop_assert!(out.chars().all(|c| c == ' ' || contains_devanagari(&c.to_string())));
    }

    // No '[' means no bracketed group tag can appear.
    #[test]
    fn no_devanagari_yields_nothing(text in "[^\u{0900}-\u{097F}\\[]{0,300}") {
        let out = segment(&text);
        prop_assert!(out.verses.is_empty(), "verses: {:?}", out.verses);
        prop_assert!(out.verse_groups.is_empty(), "groups: {:?}", out.verse_groups);
    }

    #[test]
    fn segment_never_panics(text in ".{0,400}") {
        let _ = segment(&text);
    }

    #[test]
    fn verses_are_cleaned_and_non_empty(text in VERSE_LIKE) {
        for v in segment(&text).verses {
            prop_assert!(contains_devanagari(&v.sanskrit));
            prop_assert_eq!(clean_sanskrit(&v.sanskrit), v.sanskrit.clone());
        }
    }
}
