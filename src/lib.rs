//! # charaka-pipeline
//!
//! Turn scanned chapters of the Charaka Samhita into structured verse JSON,
//! romanised and translated verses, and per-verse-group commentary written by
//! a language model.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Book/S1-Chapter5.pdf
//!  │
//!  ├─ 1. Extract    Document AI renders pages → ExtractedImage/S1-Chapter5/page_0001.png …
//!  ├─ 2. OCR        Document AI reads each PNG; the text is segmented into verses
//!  │                → ExtractedFromOCR/S1C5/charaka_samhita_output.json
//!  ├─ 3. Translate  IAST transliteration + Cloud Translation per verse
//!  │                → ExtractedFromOCR/S1C5/charaka_samhita_translated.json
//!  └─ 4. Interpret  one LLM commentary per verse group, plus a text report
//!                   → InterpretationByClaude/S1C5/output/…_detailed_full.{json,txt}
//! ```
//!
//! Stages are independent runs connected only by the files above; each one
//! can be re-run on its own.
//!
//! ## Quick Start
//!
//! The segmenter is pure and needs no credentials:
//!
//! ```rust
//! use charaka_pipeline::segment;
//!
//! let text = "[1-2]\nधर्मार्थकाममोक्षाणाम्\nआरोग्यं मूलमुत्तमम् ।।१।।";
//! let out = segment(text);
//! assert_eq!(out.verse_groups, vec!["1-2"]);
//! assert_eq!(out.verses[0].verse_number, 1);
//! ```
//!
//! The whole interpretation stage, with the provider read from the
//! environment:
//!
//! ```rust,no_run
//! use charaka_pipeline::{run, LlmInterpreter, PipelineConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PipelineConfig::builder().section(1).chapter(5).build()?;
//!     let interpreter = LlmInterpreter::from_config(&config)?;
//!     let doc = run::interpret(&config, &interpreter).await?;
//!     eprintln!("{} verse groups interpreted", doc.translations.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `charaka` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! charaka-pipeline = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod run;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    ChapterLayout, DocumentAiConfig, PageRange, PipelineConfig, PipelineConfigBuilder, RetryPolicy,
};
pub use error::{PipelineError, ServiceError};
pub use output::{Book, BookInfo, ChapterDocument, InterpretationDocument, InterpretationRecord, Verse};
pub use pipeline::document_ai::{DocumentAiClient, DocumentProcessor};
pub use pipeline::llm::{Interpreter, LlmInterpreter};
pub use pipeline::segment::{segment, Segmentation};
pub use pipeline::translate::{GoogleTranslateClient, Translator};
pub use pipeline::transliterate::{IastTransliterator, Transliterator};
pub use progress::{NoopProgressCallback, ProgressCallback, StageProgressCallback};
