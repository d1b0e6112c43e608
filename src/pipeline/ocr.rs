//! OCR stage: page images → one text blob → segmented chapter document.

use crate::error::PipelineError;
use crate::output::{BookInfo, ChapterDocument};
use crate::pipeline::document_ai::{DocumentProcessor, ProcessRequest, MIME_PNG};
use crate::pipeline::segment::segment;
use crate::progress::{or_noop, ProgressCallback};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const STAGE: &str = "ocr";

/// `*.png` files directly inside `dir`, sorted by file name.
pub async fn list_page_images(dir: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    let read_err = |e: std::io::Error| {
        if e.kind() == std::io::ErrorKind::NotFound {
            PipelineError::FileNotFound {
                path: dir.to_path_buf(),
            }
        } else {
            PipelineError::ReadFailed {
                path: dir.to_path_buf(),
                source: e,
            }
        }
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(read_err)?;
    let mut images = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(read_err)? {
        let path = entry.path();
        let is_png = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(".png"));
        if is_png && entry.file_type().await.map_err(read_err)?.is_file() {
            images.push(path);
        }
    }
    images.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(images)
}

/// OCR every image in order and join the page texts.
///
/// Each page's text is followed by a blank line so the last line of one page
/// never runs into the first line of the next. Any failed call aborts.
pub async fn ocr_pages(
    processor: &dyn DocumentProcessor,
    images: &[PathBuf],
    progress: Option<&ProgressCallback>,
) -> Result<String, PipelineError> {
    let cb = or_noop(progress);
    let total = images.len();
    cb.on_stage_start(STAGE, total);

    let mut all_text = String::new();
    for (i, path) in images.iter().enumerate() {
        info!("Processing document: {}", path.display());
        let content = tokio::fs::read(path)
            .await
            .map_err(|e| PipelineError::ReadFailed {
                path: path.clone(),
                source: e,
            })?;

        let request = ProcessRequest {
            content,
            mime_type: MIME_PNG.to_string(),
            pages: Vec::new(),
        };
        let label = path.display().to_string();
        let document = match processor.process(request).await {
            Ok(doc) => doc,
            Err(e) => {
                cb.on_item_error(STAGE, &label, i + 1, total, &e.to_string());
                return Err(PipelineError::DocumentProcessing {
                    path: path.clone(),
                    source: e,
                });
            }
        };
        debug!("{}: {} chars", label, document.text.chars().count());
        all_text.push_str(&document.text);
        all_text.push_str("\n\n");
        cb.on_item_complete(STAGE, &label, i + 1, total);
    }

    cb.on_stage_complete(STAGE, total, total);
    Ok(all_text)
}

/// Segment OCR text and wrap it in a timestamped chapter document.
pub fn build_chapter(info: BookInfo, ocr_text: &str) -> ChapterDocument {
    let seg = segment(ocr_text);
    debug!("Extracted Sanskrit verses: {:?}", seg.verses);
    debug!("Extracted verse groups: {:?}", seg.verse_groups);
    info!(
        "Segmented {} verses and {} verse groups",
        seg.verses.len(),
        seg.verse_groups.len()
    );
    ChapterDocument::new(info, seg.verses, seg.verse_groups)
}
