//! Configuration types for the verse pipeline.
//!
//! Every stage reads its knobs from one [`PipelineConfig`], built via
//! [`PipelineConfigBuilder`]. Paths are not configured one by one: a
//! [`ChapterLayout`] derives every stage's input and output location from the
//! section and chapter numbers, so consecutive stages agree on where the
//! previous one wrote its file.

use crate::error::PipelineError;
use crate::output::BookInfo;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Default model used for interpretation.
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20240620";

/// Default provider used for interpretation.
pub const DEFAULT_PROVIDER: &str = "anthropic";

/// Configuration for one chapter's run through the pipeline.
///
/// # Example
/// ```rust
/// use charaka_pipeline::{PageRange, PipelineConfig};
///
/// let config = PipelineConfig::builder()
///     .section(1)
///     .chapter(3)
///     .pages(PageRange::new(1, 12))
///     .build()
///     .unwrap();
/// assert!(config.layout.segmented_json(&config.book).ends_with("S1C3/charaka_samhita_output.json"));
/// ```
#[derive(Clone)]
pub struct PipelineConfig {
    /// Title, volume, section, chapter written into every document.
    pub book: BookInfo,

    /// Folder roots; per-chapter paths are derived from `book`.
    pub layout: ChapterLayout,

    /// Pages of the source PDF to extract. Default: 1–10.
    pub pages: PageRange,

    /// Document AI processor used for page extraction and OCR.
    pub document_ai: DocumentAiConfig,

    /// OAuth bearer token for Google Cloud APIs.
    pub google_access_token: Option<String>,

    /// API key for Cloud Translation. Takes precedence over the bearer token.
    pub translate_api_key: Option<String>,

    /// Translation target language. Default: "en".
    pub target_language: String,

    /// LLM provider name for interpretation. Default: "anthropic".
    pub provider_name: String,

    /// Model identifier. Default: [`DEFAULT_MODEL`].
    pub model: String,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Maximum tokens the model may generate per verse group. Default: 4000.
    pub max_tokens: usize,

    /// Retry policy for the interpretation call. Default: 3 attempts, 5 s apart.
    pub retry: RetryPolicy,

    /// Progress events for per-item stages.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            book: BookInfo::default(),
            layout: ChapterLayout::default(),
            pages: PageRange::default(),
            document_ai: DocumentAiConfig::default(),
            google_access_token: None,
            translate_api_key: None,
            target_language: "en".to_string(),
            provider_name: DEFAULT_PROVIDER.to_string(),
            model: DEFAULT_MODEL.to_string(),
            provider: None,
            max_tokens: 4000,
            retry: RetryPolicy::default(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("book", &self.book)
            .field("layout", &self.layout)
            .field("pages", &self.pages)
            .field("document_ai", &self.document_ai)
            .field("google_access_token", &self.google_access_token.as_ref().map(|_| "<redacted>"))
            .field("translate_api_key", &self.translate_api_key.as_ref().map(|_| "<redacted>"))
            .field("target_language", &self.target_language)
            .field("provider_name", &self.provider_name)
            .field("model", &self.model)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("max_tokens", &self.max_tokens)
            .field("retry", &self.retry)
            .finish()
    }
}

impl PipelineConfig {
    /// Create a new builder for `PipelineConfig`.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn book(mut self, book: BookInfo) -> Self {
        self.config.book = book;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.config.book.title = title.into();
        self
    }

    pub fn volume(mut self, volume: u32) -> Self {
        self.config.book.volume = volume;
        self
    }

    pub fn section(mut self, section: u32) -> Self {
        self.config.book.section = section;
        self
    }

    pub fn chapter(mut self, chapter: u32) -> Self {
        self.config.book.chapter = chapter;
        self
    }

    pub fn chapter_name(mut self, name: impl Into<String>) -> Self {
        self.config.book.chapter_name = name.into();
        self
    }

    pub fn layout(mut self, layout: ChapterLayout) -> Self {
        self.config.layout = layout;
        self
    }

    pub fn pages(mut self, pages: PageRange) -> Self {
        self.config.pages = pages;
        self
    }

    pub fn document_ai(mut self, document_ai: DocumentAiConfig) -> Self {
        self.config.document_ai = document_ai;
        self
    }

    pub fn google_access_token(mut self, token: impl Into<String>) -> Self {
        self.config.google_access_token = Some(token.into());
        self
    }

    pub fn translate_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.translate_api_key = Some(key.into());
        self
    }

    pub fn target_language(mut self, lang: impl Into<String>) -> Self {
        self.config.target_language = lang.into();
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = name.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.config.retry = retry;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PipelineConfig, PipelineError> {
        let c = &self.config;
        c.pages.validate()?;
        if c.retry.max_attempts == 0 {
            return Err(PipelineError::InvalidConfig(
                "Retry attempts must be ≥ 1".into(),
            ));
        }
        if c.target_language.trim().is_empty() {
            return Err(PipelineError::InvalidConfig(
                "Target language must not be empty".into(),
            ));
        }
        if c.max_tokens == 0 {
            return Err(PipelineError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Page range ───────────────────────────────────────────────────────────

/// Highest page number a [`PageRange`] may name.
pub const MAX_PAGE: u32 = 10_000;

/// Contiguous, 1-indexed, inclusive page range of the source PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    pub start: u32,
    pub end: u32,
}

impl Default for PageRange {
    fn default() -> Self {
        Self { start: 1, end: 10 }
    }
}

impl PageRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// The 1-indexed page numbers in the range.
    pub fn pages(&self) -> Vec<u32> {
        (self.start..=self.end).collect()
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.start < 1 {
            return Err(PipelineError::InvalidConfig(format!(
                "Pages are 1-indexed, minimum is 1 (got {})",
                self.start
            )));
        }
        if self.start > self.end {
            return Err(PipelineError::InvalidConfig(format!(
                "Invalid page range '{}-{}': start must be <= end",
                self.start, self.end
            )));
        }
        if self.end > MAX_PAGE {
            return Err(PipelineError::InvalidConfig(format!(
                "End page {} is beyond the last supported page {MAX_PAGE}",
                self.end
            )));
        }
        Ok(())
    }
}

// ── Retry policy ─────────────────────────────────────────────────────────

/// Fixed-delay retry: `max_attempts` calls, `delay` between consecutive ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(5),
        }
    }
}

// ── Document AI ──────────────────────────────────────────────────────────

/// Location of the Document AI OCR processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentAiConfig {
    pub project_id: String,
    pub location: String,
    pub processor_id: String,
}

impl Default for DocumentAiConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            location: "us".to_string(),
            processor_id: String::new(),
        }
    }
}

impl DocumentAiConfig {
    /// `https://{location}-documentai.googleapis.com/v1/projects/…/processors/…:process`
    pub fn process_url(&self) -> String {
        format!(
            "https://{loc}-documentai.googleapis.com/v1/projects/{project}/locations/{loc}/processors/{processor}:process",
            loc = self.location,
            project = self.project_id,
            processor = self.processor_id,
        )
    }

    pub fn is_complete(&self) -> bool {
        !self.project_id.is_empty() && !self.location.is_empty() && !self.processor_id.is_empty()
    }
}

// ── Folder layout ────────────────────────────────────────────────────────

/// Root folders of the pipeline's working tree.
///
/// ```text
/// Book/S1-Chapter5.pdf
/// ExtractedImage/S1-Chapter5/page_0001.png …
/// ExtractedFromOCR/S1C5/charaka_samhita_output.json
/// ExtractedFromOCR/S1C5/charaka_samhita_translated.json
/// InterpretationByClaude/S1C5/output/charaka_samhita_translated_detailed_full.{json,txt}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterLayout {
    pub book_root: PathBuf,
    pub image_root: PathBuf,
    pub ocr_root: PathBuf,
    pub interpretation_root: PathBuf,
}

impl Default for ChapterLayout {
    fn default() -> Self {
        Self::rooted_at(PathBuf::new())
    }
}

impl ChapterLayout {
    /// The default folder names placed under `base`.
    pub fn rooted_at(base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        Self {
            book_root: base.join("Book"),
            image_root: base.join("ExtractedImage"),
            ocr_root: base.join("ExtractedFromOCR"),
            interpretation_root: base.join("InterpretationByClaude"),
        }
    }

    pub fn source_pdf(&self, book: &BookInfo) -> PathBuf {
        self.book_root
            .join(format!("S{}-Chapter{}.pdf", book.section, book.chapter))
    }

    pub fn image_dir(&self, book: &BookInfo) -> PathBuf {
        self.image_root
            .join(format!("S{}-Chapter{}", book.section, book.chapter))
    }

    pub fn chapter_dir(&self, book: &BookInfo) -> PathBuf {
        self.ocr_root.join(chapter_key(book))
    }

    pub fn segmented_json(&self, book: &BookInfo) -> PathBuf {
        self.chapter_dir(book).join("charaka_samhita_output.json")
    }

    pub fn ocr_text(&self, book: &BookInfo) -> PathBuf {
        self.chapter_dir(book).join("charaka_samhita_ocr.txt")
    }

    pub fn translated_json(&self, book: &BookInfo) -> PathBuf {
        self.chapter_dir(book).join("charaka_samhita_translated.json")
    }

    pub fn interpretation_dir(&self, book: &BookInfo) -> PathBuf {
        self.interpretation_root.join(chapter_key(book)).join("output")
    }

    pub fn interpretation_json(&self, book: &BookInfo) -> PathBuf {
        self.interpretation_dir(book)
            .join("charaka_samhita_translated_detailed_full.json")
    }

    pub fn interpretation_text(&self, book: &BookInfo) -> PathBuf {
        self.interpretation_dir(book)
            .join("charaka_samhita_translated_detailed_full.txt")
    }
}

fn chapter_key(book: &BookInfo) -> String {
    format!("S{}C{}", book.section, book.chapter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn defaults() {
        let c = PipelineConfig::default();
        assert_eq!(c.pages, PageRange::new(1, 10));
        assert_eq!(c.retry.max_attempts, 3);
        assert_eq!(c.retry.delay, Duration::from_secs(5));
        assert_eq!(c.max_tokens, 4000);
        assert_eq!(c.target_language, "en");
        assert_eq!(c.book.title, "Charaka Samhita");
    }

    #[test]
    fn build_rejects_bad_page_range() {
        assert!(PipelineConfig::builder()
            .pages(PageRange::new(0, 3))
            .build()
            .is_err());
        assert!(PipelineConfig::builder()
            .pages(PageRange::new(5, 4))
            .build()
            .is_err());
        assert!(PipelineConfig::builder()
            .pages(PageRange::new(4, 4))
            .build()
            .is_ok());
    }

    #[test]
    fn build_rejects_zero_attempts() {
        let retry = RetryPolicy {
            max_attempts: 0,
            delay: Duration::ZERO,
        };
        assert!(PipelineConfig::builder().retry(retry).build().is_err());
    }

    #[test]
    fn page_range_expands_inclusive() {
        assert_eq!(PageRange::new(3, 5).pages(), vec![3, 4, 5]);
    }

    #[test]
    fn page_range_end_is_capped() {
        assert!(PageRange::new(1, MAX_PAGE).validate().is_ok());
        assert!(PageRange::new(1, MAX_PAGE + 1).validate().is_err());
        assert!(PageRange::new(u32::MAX, u32::MAX).validate().is_err());
        assert!(PipelineConfig::builder()
            .pages(PageRange::new(1, 4_000_000_000))
            .build()
            .is_err());
    }

    #[test]
    fn layout_paths_follow_section_and_chapter() {
        let layout = ChapterLayout::rooted_at("/data");
        let book = BookInfo {
            section: 1,
            chapter: 3,
            ..BookInfo::default()
        };
        assert_eq!(layout.source_pdf(&book), Path::new("/data/Book/S1-Chapter3.pdf"));
        assert_eq!(layout.image_dir(&book), Path::new("/data/ExtractedImage/S1-Chapter3"));
        assert_eq!(
            layout.translated_json(&book),
            Path::new("/data/ExtractedFromOCR/S1C3/charaka_samhita_translated.json")
        );
        assert_eq!(
            layout.interpretation_text(&book),
            Path::new("/data/InterpretationByClaude/S1C3/output/charaka_samhita_translated_detailed_full.txt")
        );
    }

    #[test]
    fn process_url_shape() {
        let d = DocumentAiConfig {
            project_id: "p1".into(),
            location: "eu".into(),
            processor_id: "abc".into(),
        };
        assert_eq!(
            d.process_url(),
            "https://eu-documentai.googleapis.com/v1/projects/p1/locations/eu/processors/abc:process"
        );
        assert!(d.is_complete());
        assert!(!DocumentAiConfig::default().is_complete());
    }

    #[test]
    fn debug_redacts_secrets() {
        let c = PipelineConfig::builder()
            .google_access_token("ya29.secret")
            .build()
            .unwrap();
        let s = format!("{c:?}");
        assert!(!s.contains("ya29.secret"));
    }
}
