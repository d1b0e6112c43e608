//! Interpretation stage: one language-model commentary per verse group.
//!
//! For every verse-group label the matching verses are gathered, their text
//! is sent in a single prompt, and the reply is cut into the six fixed
//! sections named in [`SECTION_HEADERS`].
//!
//! Failure policy differs by cause:
//!
//! * a label that does not parse, or selects no verses, becomes an
//!   "Error occurred" record and the run moves on;
//! * a reply that lacks a section gets a "… not available" placeholder for
//!   that section only;
//! * a model call that still fails after the retry budget aborts the whole
//!   run with [`PipelineError::InterpretationFailed`].

use crate::config::RetryPolicy;
use crate::error::PipelineError;
use crate::output::{ChapterDocument, InterpretationDocument, InterpretationRecord, Verse};
use crate::pipeline::llm::{call_with_retry, Interpreter};
use crate::pipeline::segment::parse_decimal;
use crate::progress::{or_noop, ProgressCallback};
use crate::prompts::{interpretation_prompt, SECTION_HEADERS};
use tracing::{debug, info, warn};

const STAGE: &str = "interpret";

/// Which verses a verse-group label refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupSelector {
    /// `"12"`: exactly verse 12.
    Single(u64),
    /// `"12-15"`: verses 12 through 15 inclusive.
    Range(u64, u64),
}

impl GroupSelector {
    /// Parse `"N"` or `"N-M"` (ASCII or Devanagari digits).
    pub fn parse(label: &str) -> Result<Self, String> {
        let number = |s: &str| {
            let s = s.trim();
            if !s.is_empty() && s.chars().all(is_decimal_digit) {
                Ok(parse_decimal(s))
            } else {
                Err(format!("Invalid verse group label '{label}'"))
            }
        };

        if label.contains('-') {
            let mut parts = label.split('-');
            match (parts.next(), parts.next(), parts.next()) {
                (Some(start), Some(end), None) => Ok(GroupSelector::Range(number(start)?, number(end)?)),
                _ => Err(format!("Invalid verse group label '{label}'")),
            }
        } else {
            Ok(GroupSelector::Single(number(label)?))
        }
    }

    pub fn matches(&self, verse_number: u64) -> bool {
        match *self {
            GroupSelector::Single(n) => verse_number == n,
            GroupSelector::Range(start, end) => (start..=end).contains(&verse_number),
        }
    }

    /// The verses this selector picks, in document order.
    pub fn select<'a>(&self, verses: &'a [Verse]) -> Vec<&'a Verse> {
        verses.iter().filter(|v| self.matches(v.verse_number)).collect()
    }
}

fn is_decimal_digit(c: char) -> bool {
    c.is_ascii_digit() || ('\u{0966}'..='\u{096F}').contains(&c)
}

// ── Section splitting ────────────────────────────────────────────────────────

/// The six sections of a model reply; `None` where the heading never appeared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sections([Option<String>; 6]);

const PLACEHOLDERS: [&str; 6] = [
    "Translation not available",
    "Vocabulary not available",
    "Context not available",
    "Interpretation not available",
    "Ayurvedic principles and applications not available",
    "Conclusion not available",
];

/// Cut a reply into sections at lines that are exactly a section heading.
///
/// Text before the first heading is dropped. A repeated heading starts its
/// section over.
pub fn split_sections(response: &str) -> Sections {
    let mut sections = Sections::default();
    let mut current: Option<usize> = None;

    for line in response.split('\n') {
        if let Some(idx) = SECTION_HEADERS.iter().position(|h| *h == line.trim()) {
            sections.0[idx] = Some(String::new());
            current = Some(idx);
        } else if let Some(body) = current.and_then(|idx| sections.0[idx].as_mut()) {
            body.push_str(line);
            body.push('\n');
        }
    }
    sections
}

impl Sections {
    /// Section text, trimmed, or its "not available" placeholder.
    pub fn get(&self, idx: usize) -> String {
        self.0[idx]
            .as_deref()
            .map(str::trim)
            .unwrap_or(PLACEHOLDERS[idx])
            .to_string()
    }

    pub fn into_record(self, group: &str, sanskrit: String) -> InterpretationRecord {
        InterpretationRecord {
            verses: group.to_string(),
            sanskrit,
            translation: self.get(0),
            vocabulary: self.get(1),
            context: self.get(2),
            interpretation: self.get(3),
            ayurvedic_principles: self.get(4),
            conclusion: self.get(5),
        }
    }
}

// ── Stage ────────────────────────────────────────────────────────────────────

/// Interpret every verse group of `doc`.
pub async fn interpret_chapter(
    doc: &ChapterDocument,
    interpreter: &dyn Interpreter,
    retry: RetryPolicy,
    progress: Option<&ProgressCallback>,
) -> Result<InterpretationDocument, PipelineError> {
    let cb = or_noop(progress);
    let groups = &doc.book.verse_groups;
    let total = groups.len();
    let mut results = Vec::with_capacity(total);
    let mut succeeded = 0;
    cb.on_stage_start(STAGE, total);

    for (i, group) in groups.iter().enumerate() {
        info!("Processing verse group {}/{}: {}", i + 1, total, group);

        let verses = match GroupSelector::parse(group) {
            Ok(sel) => sel.select(&doc.book.sanskrit_verses),
            Err(reason) => {
                warn!("Error processing verse group {}: {}", group, reason);
                cb.on_item_error(STAGE, group, i + 1, total, &reason);
                results.push(InterpretationRecord::failed(group, reason));
                continue;
            }
        };
        if verses.is_empty() {
            let reason = format!("No verses found for group {group}");
            warn!("Error processing verse group {}: {}", group, reason);
            cb.on_item_error(STAGE, group, i + 1, total, &reason);
            results.push(InterpretationRecord::failed(group, reason));
            continue;
        }

        let sanskrit = verses
            .iter()
            .map(|v| v.sanskrit.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = interpretation_prompt(&doc.book.info.title, &sanskrit);

        debug!("Sending prompt for verse group {}", group);
        let response = match call_with_retry(interpreter, &prompt, retry).await {
            Ok(r) => r,
            Err(e) => {
                cb.on_item_error(STAGE, group, i + 1, total, &e.to_string());
                return Err(PipelineError::InterpretationFailed {
                    group: group.clone(),
                    attempts: retry.max_attempts,
                    source: e,
                });
            }
        };
        debug!("Received response for verse group {}", group);

        let response = if response.trim().is_empty() {
            warn!("Unexpected response format for verse group {}", group);
            "Response not in expected format".to_string()
        } else {
            response
        };

        results.push(split_sections(&response).into_record(group, sanskrit));
        succeeded += 1;
        cb.on_item_complete(STAGE, group, i + 1, total);
    }

    cb.on_stage_complete(STAGE, total, succeeded);
    Ok(InterpretationDocument {
        timestamp: doc.timestamp.clone(),
        book: doc.book.info.clone(),
        translations: results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_labels() {
        assert_eq!(GroupSelector::parse("12"), Ok(GroupSelector::Single(12)));
        assert_eq!(GroupSelector::parse("12-15"), Ok(GroupSelector::Range(12, 15)));
        assert_eq!(GroupSelector::parse("१२-१५"), Ok(GroupSelector::Range(12, 15)));
        assert!(GroupSelector::parse("1-2-3").is_err());
        assert!(GroupSelector::parse("a").is_err());
        assert!(GroupSelector::parse("-4").is_err());
        assert!(GroupSelector::parse("").is_err());
    }

    #[test]
    fn range_is_inclusive_and_keeps_order() {
        let verses = vec![
            Verse::new(14, "घ"),
            Verse::new(11, "क"),
            Verse::new(12, "ख"),
            Verse::new(15, "ङ"),
            Verse::new(16, "च"),
        ];
        let picked: Vec<u64> = GroupSelector::Range(12, 15)
            .select(&verses)
            .iter()
            .map(|v| v.verse_number)
            .collect();
        assert_eq!(picked, vec![14, 12, 15]);
    }

    #[test]
    fn single_selects_every_duplicate() {
        let verses = vec![Verse::new(5, "क"), Verse::new(5, "ख")];
        assert_eq!(GroupSelector::Single(5).select(&verses).len(), 2);
    }

    #[test]
    fn split_full_response() {
        let reply = "Here is my analysis.\n\
                     1. Translation:\n\
                     Truthful speech.\n\
                     \n\
                     2. Vocabulary and Key Terms:\n\
                     - satya: truth\n\
                     3. Context and Significance:\n\
                     Opening verse.\n\
                     4. Detailed Interpretation:\n\
                     Long text.\n\
                     5. Ayurvedic Principles and Applications:\n\
                     Tridosha.\n\
                     6. Conclusion:\n\
                     Summary.";
        let r = split_sections(reply).into_record("1", "सत्यं".into());
        assert_eq!(r.translation, "Truthful speech.");
        assert_eq!(r.vocabulary, "- satya: truth");
        assert_eq!(r.context, "Opening verse.");
        assert_eq!(r.interpretation, "Long text.");
        assert_eq!(r.ayurvedic_principles, "Tridosha.");
        assert_eq!(r.conclusion, "Summary.");
    }

    #[test]
    fn missing_sections_get_placeholders() {
        let r = split_sections("  1. Translation:  \nOnly this.\n").into_record("2", String::new());
        assert_eq!(r.translation, "Only this.");
        assert_eq!(r.vocabulary, "Vocabulary not available");
        assert_eq!(r.context, "Context not available");
        assert_eq!(r.interpretation, "Interpretation not available");
        assert_eq!(
            r.ayurvedic_principles,
            "Ayurvedic principles and applications not available"
        );
        assert_eq!(r.conclusion, "Conclusion not available");
    }

    #[test]
    fn headings_must_match_exactly() {
        // Markdown-decorated headings are not recognised.
        let r = split_sections("**1. Translation:**\ntext").into_record("3", String::new());
        assert_eq!(r.translation, "Translation not available");
    }

    #[test]
    fn empty_section_is_empty_not_placeholder() {
        let r = split_sections("6. Conclusion:\n").into_record("3", String::new());
        assert_eq!(r.conclusion, "");
    }
}
