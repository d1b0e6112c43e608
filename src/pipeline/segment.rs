//! Verse segmentation: split a chapter's OCR text into numbered verses.
//!
//! OCR of a printed Sanskrit chapter is a stream of lines in which verses are
//! closed by a number wrapped in double dandas (`…गच्छति।।12।।`), sometimes
//! opened by a leading number (`12. रामः …`), and interleaved with bracketed
//! citation tags (`[12-15]`) and non-Devanagari noise (commentary, running
//! heads, page numbers).
//!
//! [`segment`] is a pure fold over the lines with a small explicit state. It
//! never fails: whatever matches the line patterns becomes a verse or a verse
//! group, everything else is dropped.
//!
//! ## Line rules, in priority order
//!
//! 1. blank line → skipped, state untouched
//! 2. `[N]` / `[N-M]` anywhere → label recorded (independently of 3–6)
//! 3. `।। N ।।` → text before it closes the open verse as verse N
//! 4. verse open → line appended
//! 5. `N. text` → previous text flushed, verse N opened with `text`
//! 6. Devanagari without a number → verse opened as (emitted + 1)
//!
//! Verse numbers are neither deduplicated nor checked for order, and verse
//! groups are not reconciled with the verses found.

use crate::output::Verse;
use once_cell::sync::Lazy;
use regex::Regex;

static RE_VERSE_GROUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([0-9०-९]+(?:-[0-9०-९]+)?)\]").unwrap());

// `।।` as two single dandas (what OCR emits) or the U+0965 double danda.
static RE_VERSE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:।।|॥)\s*([0-9०-९]+)\s*(?:।।|॥)").unwrap());

static RE_VERSE_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9०-९]+)\.?\s*(.+)").unwrap());

static RE_NON_DEVANAGARI: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\u{0900}-\u{097F}\s]").unwrap());

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

// Every line boundary a text file may carry, including lone CR, form feed
// between OCR pages, and the Unicode line/paragraph separators.
static RE_LINE_BREAK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\r\n|[\n\r\x0b\x0c\x1c-\x1e\u{85}\u{2028}\u{2029}]").unwrap()
});

/// Verses and verse-group labels found in one chapter's text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segmentation {
    pub verses: Vec<Verse>,
    pub verse_groups: Vec<String>,
}

/// Segment OCR text into verses and verse-group labels.
pub fn segment(text: &str) -> Segmentation {
    RE_LINE_BREAK
        .split(text)
        .fold(SegmentState::default(), SegmentState::step)
        .finish()
}

/// `true` iff `text` has at least one codepoint in U+0900–U+097F.
pub fn contains_devanagari(text: &str) -> bool {
    text.chars().any(is_devanagari)
}

/// Keep only Devanagari (dandas included) and whitespace, then collapse
/// whitespace runs to one space and trim.
pub fn clean_sanskrit(text: &str) -> String {
    let kept = RE_NON_DEVANAGARI.replace_all(text, "");
    RE_WHITESPACE.replace_all(&kept, " ").trim().to_string()
}

fn is_devanagari(c: char) -> bool {
    ('\u{0900}'..='\u{097F}').contains(&c)
}

/// Parse a run of ASCII or Devanagari digits. Saturates instead of failing.
pub(crate) fn parse_decimal(digits: &str) -> u64 {
    digits.chars().fold(0u64, |acc, c| {
        let d = match c {
            '0'..='9' => c as u64 - '0' as u64,
            '\u{0966}'..='\u{096F}' => c as u64 - 0x0966,
            _ => return acc,
        };
        acc.saturating_mul(10).saturating_add(d)
    })
}

#[derive(Debug, Default)]
struct SegmentState {
    accumulator: String,
    current_number: Option<u64>,
    verses: Vec<Verse>,
    verse_groups: Vec<String>,
}

impl SegmentState {
    fn step(mut self, raw_line: &str) -> Self {
        let line = raw_line.trim();
        if line.is_empty() {
            return self;
        }

        if let Some(caps) = RE_VERSE_GROUP.captures(line) {
            self.verse_groups.push(caps[1].to_string());
        }

        if let Some(caps) = RE_VERSE_END.captures(line) {
            let number = parse_decimal(&caps[1]);
            let end_at = caps.get(0).map_or(0, |m| m.start());
            self.accumulator.push(' ');
            self.accumulator.push_str(line[..end_at].trim());
            if contains_devanagari(&self.accumulator) {
                self.emit(number);
            }
            self.accumulator.clear();
            self.current_number = None;
        } else if self.current_number.is_some() {
            self.accumulator.push(' ');
            self.accumulator.push_str(line);
        } else if let Some(caps) = RE_VERSE_START.captures(line) {
            if !self.accumulator.is_empty() && contains_devanagari(&self.accumulator) {
                let number = self.current_number.unwrap_or(self.next_number());
                self.emit(number);
            }
            self.current_number = Some(parse_decimal(&caps[1]));
            self.accumulator = caps[2].to_string();
        } else if contains_devanagari(line) {
            self.accumulator = line.to_string();
            self.current_number = Some(self.next_number());
        }

        self
    }

    fn finish(mut self) -> Segmentation {
        if !self.accumulator.is_empty() && contains_devanagari(&self.accumulator) {
            // A zero verse number counts as missing here.
            let number = self
                .current_number
                .filter(|&n| n != 0)
                .unwrap_or(self.next_number());
            self.emit(number);
        }
        Segmentation {
            verses: self.verses,
            verse_groups: self.verse_groups,
        }
    }

    fn emit(&mut self, number: u64) {
        self.verses
            .push(Verse::new(number, clean_sanskrit(&self.accumulator)));
    }

    fn next_number(&self) -> u64 {
        self.verses.len() as u64 + 1
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(s: &Segmentation) -> Vec<u64> {
        s.verses.iter().map(|v| v.verse_number).collect()
    }

    #[test]
    fn empty_input() {
        assert_eq!(segment(""), Segmentation::default());
        assert_eq!(segment("\n\n   \n"), Segmentation::default());
    }

    #[test]
    fn no_devanagari_yields_nothing() {
        for input in [
            "Chapter 5\nIntroduction to the text.",
            "12. The physician said\n13. nothing in Sanskrit",
            "page 4 || 12 ||",
        ] {
            assert_eq!(segment(input), Segmentation::default(), "input: {input:?}");
        }
    }

    #[test]
    fn start_and_end_on_one_line() {
        let s = segment("12. रामः गच्छति।।12।।");
        assert_eq!(s.verses, vec![Verse::new(12, "रामः गच्छति")]);
        assert!(s.verse_groups.is_empty());
    }

    #[test]
    fn two_verses_end_to_end() {
        let s = segment("1. सत्यं वचनम्।।1।।\n2. धर्मः आचरणम्।।2।।");
        assert_eq!(
            s.verses,
            vec![Verse::new(1, "सत्यं वचनम्"), Verse::new(2, "धर्मः आचरणम्")]
        );
    }

    #[test]
    fn verse_groups_are_independent_of_verses() {
        let text = "[12-15] अथातो मात्राशितीयम्\n\
                    12. मात्राशी स्यात्।।12।।\n\
                    some commentary line\n\
                    13. अग्निबलापेक्षिणी।।13।।\n\
                    see also [20] and [21]";
        let s = segment(text);
        assert_eq!(s.verse_groups, vec!["12-15".to_string(), "20".to_string()]);
        assert_eq!(numbers(&s), vec![12, 13]);
    }

    #[test]
    fn unterminated_verse_flushed_at_end() {
        let s = segment("7. अथातो दीर्घञ्जीवितीयम्\nअध्यायं व्याख्यास्यामः");
        assert_eq!(
            s.verses,
            vec![Verse::new(7, "अथातो दीर्घञ्जीवितीयम् अध्यायं व्याख्यास्यामः")]
        );
    }

    #[test]
    fn blank_lines_keep_accumulator() {
        let s = segment("1. सत्यं\n\n\nवचनम्।।1।।\n\n\n2. धर्मः।।2।।");
        assert_eq!(
            s.verses,
            vec![Verse::new(1, "सत्यं वचनम्"), Verse::new(2, "धर्मः")]
        );
    }

    #[test]
    fn lone_cr_and_form_feed_break_lines() {
        let s = segment("1. सत्यं वचनम्।।1।।\r2. धर्मः आचरणम्।।2।।");
        assert_eq!(numbers(&s), vec![1, 2]);

        let s = segment("रामः।।1।।\x0cसीता।।2।।");
        assert_eq!(s.verses, vec![Verse::new(1, "रामः"), Verse::new(2, "सीता")]);
    }

    #[test]
    fn crlf_and_unicode_separators() {
        let s = segment("1. सत्यं।।1।।\r\n2. धर्मः।।2।।\u{2028}3. अर्थः।।3।।\u{85}[4]");
        assert_eq!(numbers(&s), vec![1, 2, 3]);
        assert_eq!(s.verse_groups, vec!["4".to_string()]);
    }

    #[test]
    fn terminator_wins_over_start() {
        // The leading number is ignored; the terminator's number is used.
        let s = segment("5. रामः।।6।।");
        assert_eq!(numbers(&s), vec![6]);
    }

    #[test]
    fn terminator_without_open_verse() {
        let s = segment("रामः गच्छति ।। 3 ।।");
        assert_eq!(s.verses, vec![Verse::new(3, "रामः गच्छति")]);
    }

    #[test]
    fn standalone_devanagari_gets_provisional_number() {
        let s = segment("1. सत्यं।।1।।\nधर्मः चर\nnoise");
        // Second verse never terminates: provisional number = emitted + 1.
        assert_eq!(s.verses, vec![Verse::new(1, "सत्यं"), Verse::new(2, "धर्मः चर")]);
    }

    #[test]
    fn standalone_line_then_terminator_uses_terminator_number() {
        let s = segment("heading\nरामः\nगच्छति।।3।।");
        assert_eq!(s.verses, vec![Verse::new(3, "रामः गच्छति")]);
    }

    #[test]
    fn devanagari_digits_and_double_danda_codepoint() {
        let s = segment("धर्मः ॥ ४ ॥\nअर्थः।।१२।।");
        assert_eq!(s.verses, vec![Verse::new(4, "धर्मः"), Verse::new(12, "अर्थः")]);
    }

    #[test]
    fn duplicate_and_unordered_numbers_are_kept() {
        let s = segment("रामः।।5।।\nसीता।।5।।\nलक्ष्मणः।।2।।");
        assert_eq!(numbers(&s), vec![5, 5, 2]);
    }

    #[test]
    fn terminator_without_devanagari_emits_nothing_but_resets() {
        let s = segment("3. abc ।।3।।\nरामः");
        assert_eq!(s.verses, vec![Verse::new(1, "रामः")]);
    }

    #[test]
    fn bare_number_line_opens_with_leftmost_first_captures() {
        // "12" alone: the number group yields "1", the content group "2".
        let s = segment("12\nरामः");
        assert_eq!(s.verses, vec![Verse::new(1, "रामः")]);
    }

    #[test]
    fn zero_verse_number_falls_back_at_end() {
        let s = segment("0. रामः");
        assert_eq!(numbers(&s), vec![1]);
    }

    #[test]
    fn clean_strips_latin_and_punctuation() {
        assert_eq!(
            clean_sanskrit("  12. रामः, (Rama)  गच्छति।।  "),
            "रामः गच्छति।।"
        );
        assert_eq!(clean_sanskrit("abc 123"), "");
    }

    #[test]
    fn clean_is_idempotent() {
        for x in [
            "",
            "   ",
            "रामः गच्छति",
            " 1. सत्यं\tवचनम्।।1।। [12-15] ",
            "mixed देव text ॥ and\n\nnewlines",
            "ऀ ॿ edge codepoints",
        ] {
            let once = clean_sanskrit(x);
            assert_eq!(clean_sanskrit(&once), once, "input: {x:?}");
        }
    }

    #[test]
    fn devanagari_detection_bounds() {
        assert!(contains_devanagari("a\u{0900}"));
        assert!(contains_devanagari("\u{097F}"));
        assert!(!contains_devanagari("\u{08FF}\u{0980}"));
        assert!(!contains_devanagari("plain"));
    }

    #[test]
    fn parse_decimal_mixed_and_saturating() {
        assert_eq!(parse_decimal("0012"), 12);
        assert_eq!(parse_decimal("१२"), 12);
        assert_eq!(parse_decimal("99999999999999999999999"), u64::MAX);
    }
}
