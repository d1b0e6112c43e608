//! Plain-text rendering of interpretation results, for reading and proofing.

use crate::output::InterpretationRecord;

/// Line placed between two verse-group entries.
pub fn separator() -> String {
    "=".repeat(50)
}

/// Render one record; `index` is 1-based.
pub fn render_record(index: usize, r: &InterpretationRecord) -> String {
    format!(
        "{index}. Verses {}:\n\n\
         Sanskrit:\n{}\n\n\
         Translation:\n{}\n\n\
         Vocabulary and Key Terms:\n{}\n\n\
         Context and Significance:\n{}\n\n\
         Detailed Interpretation:\n{}\n\n\
         Ayurvedic Principles and Applications:\n{}\n\n\
         Conclusion:\n{}",
        r.verses,
        r.sanskrit,
        r.translation,
        r.vocabulary,
        r.context,
        r.interpretation,
        r.ayurvedic_principles,
        r.conclusion,
    )
}

/// Render all records, joined by a 50-character `=` line.
pub fn render_report(records: &[InterpretationRecord]) -> String {
    let joiner = format!("\n\n{}\n\n", separator());
    let mut text = records
        .iter()
        .enumerate()
        .map(|(i, r)| render_record(i + 1, r))
        .collect::<Vec<_>>()
        .join(&joiner);
    text.push('\n');
    text
}
