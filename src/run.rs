//! File-level stage entry points.
//!
//! Each function reads the previous stage's output from the paths derived by
//! [`crate::config::ChapterLayout`], runs one stage, and writes its own
//! output. Collaborators are passed in so callers choose real clients or
//! fakes; the CLI builds the real ones from [`PipelineConfig`].
//!
//! Output files are written atomically (temp file in the same folder, then
//! rename), so an aborted run never leaves a half-written JSON behind for
//! the next stage to choke on.

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::output::{ChapterDocument, InterpretationDocument};
use crate::pipeline::document_ai::DocumentProcessor;
use crate::pipeline::extract::{extract_pages, ExtractSummary};
use crate::pipeline::interpret::interpret_chapter;
use crate::pipeline::llm::Interpreter;
use crate::pipeline::ocr::{build_chapter, list_page_images, ocr_pages};
use crate::pipeline::report::render_report;
use crate::pipeline::translate::{translate_chapter, TranslateSummary, Translator};
use crate::pipeline::transliterate::Transliterator;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Stage 1: render the configured pages of the chapter PDF to PNG files.
pub async fn extract(
    config: &PipelineConfig,
    processor: &dyn DocumentProcessor,
) -> Result<ExtractSummary, PipelineError> {
    let pdf_path = config.layout.source_pdf(&config.book);
    let pdf = read_bytes(&pdf_path).await?;
    let out_dir = config.layout.image_dir(&config.book);
    extract_pages(processor, pdf, config.pages, &out_dir).await
}

/// Stage 2: OCR the chapter's page images and write the segmented chapter.
pub async fn ocr(
    config: &PipelineConfig,
    processor: &dyn DocumentProcessor,
) -> Result<ChapterDocument, PipelineError> {
    let start = Instant::now();
    let image_dir = config.layout.image_dir(&config.book);
    let images = list_page_images(&image_dir).await?;
    info!("Found {} page images in {}", images.len(), image_dir.display());

    let text = ocr_pages(processor, &images, config.progress_callback.as_ref()).await?;
    if text.trim().is_empty() {
        return Err(PipelineError::NoOcrContent { folder: image_dir });
    }
    write_text(&config.layout.ocr_text(&config.book), &text)?;

    let doc = build_chapter(config.book.clone(), &text);
    let out = config.layout.segmented_json(&config.book);
    save_json(&out, &doc)?;
    info!(
        "JSON output has been written to {} ({}ms)",
        out.display(),
        start.elapsed().as_millis()
    );
    Ok(doc)
}

/// Stage 2 without OCR: segment an existing text file.
pub async fn segment_text_file(
    config: &PipelineConfig,
    text_path: &Path,
) -> Result<ChapterDocument, PipelineError> {
    let bytes = read_bytes(text_path).await?;
    let text = String::from_utf8_lossy(&bytes);
    let doc = build_chapter(config.book.clone(), &text);
    let out = config.layout.segmented_json(&config.book);
    save_json(&out, &doc)?;
    info!("JSON output has been written to {}", out.display());
    Ok(doc)
}

/// Stage 3: add transliteration and translation to every verse.
pub async fn translate(
    config: &PipelineConfig,
    transliterator: &dyn Transliterator,
    translator: &dyn Translator,
) -> Result<TranslateSummary, PipelineError> {
    let input = config.layout.segmented_json(&config.book);
    let mut doc: ChapterDocument = load_json(&input).await?;
    info!(
        "Starting translation of {} verses from {}",
        doc.book.sanskrit_verses.len(),
        input.display()
    );

    let summary = translate_chapter(
        &mut doc,
        transliterator,
        translator,
        &config.target_language,
        config.progress_callback.as_ref(),
    )
    .await;

    let out = config.layout.translated_json(&config.book);
    save_json(&out, &doc)?;
    info!(
        "Processed JSON saved to {} ({}/{} translated, {}/{} transliterated)",
        out.display(),
        summary.translated,
        summary.verses,
        summary.transliterated,
        summary.verses
    );
    Ok(summary)
}

/// Stage 4: interpret every verse group and write JSON plus a text report.
pub async fn interpret(
    config: &PipelineConfig,
    interpreter: &dyn Interpreter,
) -> Result<InterpretationDocument, PipelineError> {
    let input = config.layout.segmented_json(&config.book);
    let doc: ChapterDocument = load_json(&input).await?;
    info!(
        "Beginning verse processing: {} groups, {} verses",
        doc.book.verse_groups.len(),
        doc.book.sanskrit_verses.len()
    );

    let result = interpret_chapter(
        &doc,
        interpreter,
        config.retry,
        config.progress_callback.as_ref(),
    )
    .await?;
    info!("Verse processing complete");

    let json_path = config.layout.interpretation_json(&config.book);
    save_json(&json_path, &result)?;
    let text_path = config.layout.interpretation_text(&config.book);
    write_text(&text_path, &render_report(&result.translations))?;
    info!(
        "Results saved to {} and {}",
        json_path.display(),
        text_path.display()
    );
    Ok(result)
}

// ── File helpers ─────────────────────────────────────────────────────────────

async fn read_bytes(path: &Path) -> Result<Vec<u8>, PipelineError> {
    match tokio::fs::read(path).await {
        Ok(b) => Ok(b),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(PipelineError::FileNotFound {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(PipelineError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Read and parse a JSON document.
pub async fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, PipelineError> {
    debug!("Attempting to load JSON from {}", path.display());
    let bytes = read_bytes(path).await?;
    let value = serde_json::from_slice(&bytes).map_err(|e| PipelineError::MalformedJson {
        path: path.to_path_buf(),
        source: e,
    })?;
    debug!("Successfully loaded JSON from {}", path.display());
    Ok(value)
}

/// Pretty-print `value` as UTF-8 JSON (non-ASCII kept as-is) to `path`.
pub fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<(), PipelineError> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    write_text(path, &json)
}

/// Atomically write `contents` to `path`, creating parent folders.
pub fn write_text(path: &Path, contents: &str) -> Result<(), PipelineError> {
    let write_err = |e: std::io::Error| PipelineError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(write_err)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(write_err)?;
    tmp.write_all(contents.as_bytes()).map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{BookInfo, Verse};

    #[test]
    fn write_text_creates_parents_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/b/out.txt");
        write_text(&path, "first").unwrap();
        write_text(&path, "second").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
    }

    #[tokio::test]
    async fn json_round_trip_keeps_devanagari_unescaped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        let doc = ChapterDocument::new(BookInfo::default(), vec![Verse::new(1, "सत्यं")], vec![]);
        save_json(&path, &doc).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"sanskrit\": \"सत्यं\""), "got: {raw}");

        let back: ChapterDocument = load_json(&path).await.unwrap();
        assert_eq!(back, doc);
    }

    #[tokio::test]
    async fn load_missing_and_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            load_json::<ChapterDocument>(&missing).await,
            Err(PipelineError::FileNotFound { .. })
        ));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{not json").unwrap();
        assert!(matches!(
            load_json::<ChapterDocument>(&bad).await,
            Err(PipelineError::MalformedJson { .. })
        ));
    }
}
