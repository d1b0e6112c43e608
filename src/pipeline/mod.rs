//! Pipeline stages for turning a scanned chapter into interpreted verses.
//!
//! Each submodule implements one transformation step or one external
//! collaborator. Collaborators sit behind narrow traits
//! ([`document_ai::DocumentProcessor`], [`transliterate::Transliterator`],
//! [`translate::Translator`], [`llm::Interpreter`]) so the stages can be
//! exercised with fakes.
//!
//! ## Data Flow
//!
//! ```text
//! extract ──▶ ocr + segment ──▶ translate ──▶ interpret ──▶ report
//!  (PDF→PNG)   (PNG→verses)     (per verse)   (per group)    (text)
//! ```
//!
//! 1. [`extract`]   : Document AI renders the selected PDF pages to PNG
//! 2. [`ocr`]       : Document AI reads each PNG; [`segment`] splits the text
//!    into verses and verse-group labels (pure, never fails)
//! 3. [`translate`] : IAST romanisation ([`transliterate`]) and machine
//!    translation per verse, failures isolated per verse
//! 4. [`interpret`] : one LLM commentary per verse group via [`llm`], fixed
//!    retry, aborts the run when retries run out
//! 5. [`report`]    : plain-text rendering of the interpretations

pub mod document_ai;
pub mod extract;
pub mod interpret;
pub mod llm;
pub mod ocr;
pub mod report;
pub mod segment;
pub mod translate;
pub mod transliterate;
