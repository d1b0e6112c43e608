//! Page extraction: source PDF → one PNG per page.
//!
//! The PDF is sent to the document processor with an individual page
//! selector; each returned page image is decoded and re-encoded as PNG under
//! `page_{NNNN}.png`, numbered by the page number the service reports or,
//! failing that, by position from the first requested page. PNG keeps the
//! scanned glyphs lossless for the OCR pass that follows.

use crate::config::PageRange;
use crate::error::PipelineError;
use crate::pipeline::document_ai::{DocumentProcessor, ProcessRequest, MIME_PDF};
use image::ImageFormat;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// What the extraction stage wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    pub pages_requested: usize,
    pub written: Vec<PathBuf>,
}

/// File name for the page at 1-indexed position `page`.
pub fn page_file_name(page: u32) -> String {
    format!("page_{page:04}.png")
}

/// Send `pdf` to the processor and save the returned page images in `out_dir`.
///
/// A failed processor call is logged and yields an empty summary rather than
/// an error: nothing was written and the next stage will report the missing
/// images. Decoding or writing an image that did arrive is fatal.
pub async fn extract_pages(
    processor: &dyn DocumentProcessor,
    pdf: Vec<u8>,
    range: PageRange,
    out_dir: &Path,
) -> Result<ExtractSummary, PipelineError> {
    range.validate()?;
    let pages = range.pages();
    let mut summary = ExtractSummary {
        pages_requested: pages.len(),
        written: Vec::new(),
    };
    info!(
        "Starting PDF to image extraction for pages {} to {}",
        range.start, range.end
    );

    let request = ProcessRequest {
        content: pdf,
        mime_type: MIME_PDF.to_string(),
        pages,
    };
    let document = match processor.process(request).await {
        Ok(doc) => doc,
        Err(e) => {
            error!("Failed to process PDF document: {}", e);
            return Ok(summary);
        }
    };
    info!(
        "Document processing complete. Pages processed: {}",
        document.pages.len()
    );

    tokio::fs::create_dir_all(out_dir)
        .await
        .map_err(|e| PipelineError::OutputWriteFailed {
            path: out_dir.to_path_buf(),
            source: e,
        })?;

    for (i, page) in document.pages.iter().enumerate() {
        let Some(page_num) = page_number(range, i, page.page_number) else {
            warn!("Page at position {} is past the requested range, skipping", i + 1);
            continue;
        };
        let Some(bytes) = page.image.as_deref() else {
            warn!("Page {}: processor returned no image, skipping", page_num);
            continue;
        };

        let png = reencode_png(bytes).map_err(|e| PipelineError::ImageDecode {
            page: page_num,
            detail: e.to_string(),
        })?;

        let path = out_dir.join(page_file_name(page_num));
        tokio::fs::write(&path, &png)
            .await
            .map_err(|e| PipelineError::OutputWriteFailed {
                path: path.clone(),
                source: e,
            })?;
        info!("Saved {}", path.display());
        summary.written.push(path);
    }

    info!("PDF to image extraction completed");
    Ok(summary)
}

/// Number for the `index`-th returned page: the service's own page number
/// when it sent one, else the offset from the first requested page.
fn page_number(range: PageRange, index: usize, reported: u32) -> Option<u32> {
    if reported != 0 {
        return Some(reported);
    }
    u32::try_from(index)
        .ok()
        .and_then(|i| range.start.checked_add(i))
}

fn reencode_png(bytes: &[u8]) -> Result<Vec<u8>, image::ImageError> {
    let img = image::load_from_memory(bytes)?;
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::pipeline::document_ai::{DocumentPage, ProcessedDocument};
    use async_trait::async_trait;
    use image::{DynamicImage, Rgba, RgbaImage};

    fn png() -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255])));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    /// Returns `count` unnumbered pages whatever was asked for.
    struct Unnumbered {
        count: usize,
    }

    #[async_trait]
    impl DocumentProcessor for Unnumbered {
        async fn process(&self, _request: ProcessRequest) -> Result<ProcessedDocument, ServiceError> {
            Ok(ProcessedDocument {
                text: String::new(),
                pages: (0..self.count)
                    .map(|_| DocumentPage {
                        page_number: 0,
                        image: Some(png()),
                    })
                    .collect(),
            })
        }
    }

    #[test]
    fn page_number_prefers_reported_then_offset() {
        let range = PageRange::new(5, 6);
        assert_eq!(page_number(range, 0, 9), Some(9));
        assert_eq!(page_number(range, 1, 0), Some(6));
        assert_eq!(page_number(PageRange::new(u32::MAX, u32::MAX), 1, 0), None);
    }

    #[tokio::test]
    async fn extra_pages_past_the_range_do_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        let range = PageRange::new(crate::config::MAX_PAGE, crate::config::MAX_PAGE);
        let summary = extract_pages(&Unnumbered { count: 2 }, Vec::new(), range, dir.path())
            .await
            .unwrap();
        assert_eq!(summary.pages_requested, 1);
        assert_eq!(summary.written.len(), 2);
        assert!(dir.path().join("page_10001.png").exists());
    }

    #[tokio::test]
    async fn oversized_range_is_rejected_before_any_call() {
        let dir = tempfile::tempdir().unwrap();
        let err = extract_pages(
            &Unnumbered { count: 2 },
            Vec::new(),
            PageRange::new(u32::MAX, u32::MAX),
            dir.path(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidConfig(_)), "got {err:?}");
    }

    #[test]
    fn page_names_are_zero_padded() {
        assert_eq!(page_file_name(1), "page_0001.png");
        assert_eq!(page_file_name(123), "page_0123.png");
    }

    #[test]
    fn reencode_accepts_png() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255])));
        let mut src = Vec::new();
        img.write_to(&mut Cursor::new(&mut src), ImageFormat::Png)
            .unwrap();
        let out = reencode_png(&src).expect("valid png");
        assert_eq!(&out[..4], &[0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn reencode_rejects_garbage() {
        assert!(reencode_png(b"not an image").is_err());
    }
}
