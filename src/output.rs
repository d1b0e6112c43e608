//! JSON documents exchanged between stages.
//!
//! Every stage reads the previous stage's file and writes a new one; these
//! types are that file format. Field names match the on-disk JSON exactly.

use serde::{Deserialize, Serialize};

/// One numbered verse of Sanskrit text.
///
/// Produced by [`crate::pipeline::segment`]; the translation stage fills in
/// `transliteration` and `translation`. A field left `None` by a failed call
/// is omitted from the JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verse {
    pub verse_number: u64,
    pub sanskrit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transliteration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
}

impl Verse {
    pub fn new(verse_number: u64, sanskrit: impl Into<String>) -> Self {
        Self {
            verse_number,
            sanskrit: sanskrit.into(),
            transliteration: None,
            translation: None,
        }
    }
}

/// Bibliographic identity of one chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookInfo {
    pub title: String,
    pub volume: u32,
    pub section: u32,
    pub chapter: u32,
    #[serde(default)]
    pub chapter_name: String,
}

impl Default for BookInfo {
    fn default() -> Self {
        Self {
            title: "Charaka Samhita".to_string(),
            volume: 1,
            section: 1,
            chapter: 5,
            chapter_name: String::new(),
        }
    }
}

/// The `book` object of a chapter document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    #[serde(flatten)]
    pub info: BookInfo,
    pub sanskrit_verses: Vec<Verse>,
    pub verse_groups: Vec<String>,
}

/// Output of the OCR stage and input/output of the translation stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterDocument {
    pub timestamp: String,
    pub book: Book,
}

impl ChapterDocument {
    /// Wrap segmented verses in a document stamped with the current local time.
    pub fn new(info: BookInfo, sanskrit_verses: Vec<Verse>, verse_groups: Vec<String>) -> Self {
        Self {
            timestamp: now_timestamp(),
            book: Book {
                info,
                sanskrit_verses,
                verse_groups,
            },
        }
    }
}

/// Interpretation of one verse group, as returned by the language model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpretationRecord {
    /// The verse-group label this record covers, e.g. `"12"` or `"12-15"`.
    pub verses: String,
    pub sanskrit: String,
    pub translation: String,
    pub vocabulary: String,
    pub context: String,
    pub interpretation: String,
    pub ayurvedic_principles: String,
    pub conclusion: String,
}

impl InterpretationRecord {
    /// Record for a group that could not be interpreted (bad label, no verses).
    pub fn failed(group: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        let marker = "Error occurred".to_string();
        Self {
            verses: group.into(),
            sanskrit: format!("Error occurred: {reason}"),
            translation: marker.clone(),
            vocabulary: marker.clone(),
            context: marker.clone(),
            interpretation: marker.clone(),
            ayurvedic_principles: marker.clone(),
            conclusion: marker,
        }
    }
}

/// Output of the interpretation stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterpretationDocument {
    /// Copied from the input chapter document.
    pub timestamp: String,
    pub book: BookInfo,
    pub translations: Vec<InterpretationRecord>,
}

/// Local time in ISO-8601 with microseconds, e.g. `2024-07-01T10:15:30.123456`.
pub fn now_timestamp() -> String {
    chrono::Local::now()
        .naive_local()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn book_flattens_info() {
        let doc = ChapterDocument {
            timestamp: "2024-07-01T10:15:30.000000".into(),
            book: Book {
                info: BookInfo::default(),
                sanskrit_verses: vec![Verse::new(1, "सत्यं वचनम्")],
                verse_groups: vec!["1".into()],
            },
        };
        let v = serde_json::to_value(&doc).unwrap();
        assert_eq!(v["book"]["title"], "Charaka Samhita");
        assert_eq!(v["book"]["chapter"], 5);
        assert_eq!(v["book"]["sanskrit_verses"][0]["verse_number"], 1);
        // Untranslated verses carry no translation keys at all.
        assert!(v["book"]["sanskrit_verses"][0].get("translation").is_none());
    }

    #[test]
    fn reads_document_without_optional_fields() {
        let json = r#"{
            "timestamp": "2024-07-01T10:15:30",
            "book": {
                "title": "Charaka Samhita", "volume": 1, "section": 1,
                "chapter": 3, "chapter_name": "",
                "sanskrit_verses": [{"verse_number": 4, "sanskrit": "धर्मः"}],
                "verse_groups": ["4"]
            }
        }"#;
        let doc: ChapterDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.book.info.chapter, 3);
        assert_eq!(doc.book.sanskrit_verses[0], Verse::new(4, "धर्मः"));
    }

    #[test]
    fn failed_record_marks_every_field() {
        let r = InterpretationRecord::failed("9-10", "No verses found for group 9-10");
        assert_eq!(r.verses, "9-10");
        assert_eq!(r.sanskrit, "Error occurred: No verses found for group 9-10");
        assert_eq!(r.conclusion, "Error occurred");
    }

    #[test]
    fn timestamp_shape() {
        let ts = now_timestamp();
        assert_eq!(ts.len(), "2024-07-01T10:15:30.123456".len(), "got {ts}");
        assert_eq!(&ts[10..11], "T");
    }
}
