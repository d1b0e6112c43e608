//! Google Document AI client: page images and OCR text from one REST call.
//!
//! Both the page-extraction stage (PDF in, one rendered image per page out)
//! and the OCR stage (PNG in, text out) use the same `:process` endpoint, so
//! they share [`DocumentProcessor`]. Tests substitute a fake implementation.
//!
//! ## Wire format
//!
//! ```text
//! POST https://{loc}-documentai.googleapis.com/v1/projects/{p}/locations/{loc}/processors/{id}:process
//! { "rawDocument": { "content": <base64>, "mimeType": "application/pdf" },
//!   "processOptions": { "individualPageSelector": { "pages": [1, 2, 3] } } }
//!
//! → { "document": { "text": "…", "pages": [ { "pageNumber": 1,
//!       "image": { "content": <base64>, "mimeType": "image/png" } } ] } }
//! ```

use crate::config::DocumentAiConfig;
use crate::error::{PipelineError, ServiceError};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_PNG: &str = "image/png";

/// A document to send for processing.
#[derive(Debug, Clone)]
pub struct ProcessRequest {
    pub content: Vec<u8>,
    pub mime_type: String,
    /// 1-indexed pages to process; empty means every page.
    pub pages: Vec<u32>,
}

/// What the processor returned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessedDocument {
    pub text: String,
    pub pages: Vec<DocumentPage>,
}

/// One processed page, with its rendered image when the service sent one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPage {
    pub page_number: u32,
    pub image: Option<Vec<u8>>,
}

/// Anything that can OCR a document and render its pages.
#[async_trait]
pub trait DocumentProcessor: Send + Sync {
    async fn process(&self, request: ProcessRequest) -> Result<ProcessedDocument, ServiceError>;
}

/// [`DocumentProcessor`] backed by the Document AI REST API.
pub struct DocumentAiClient {
    http: reqwest::Client,
    url: String,
    access_token: String,
}

impl DocumentAiClient {
    /// Build a client for the configured processor.
    pub fn new(config: &DocumentAiConfig, access_token: Option<&str>) -> Result<Self, PipelineError> {
        if !config.is_complete() {
            return Err(PipelineError::InvalidConfig(
                "Document AI project, location and processor id must all be set".into(),
            ));
        }
        let access_token = access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                PipelineError::InvalidConfig(
                    "A Google access token is required for Document AI.\n\
                     Try: export GOOGLE_ACCESS_TOKEN=$(gcloud auth print-access-token)"
                        .into(),
                )
            })?
            .to_string();

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| PipelineError::InvalidConfig(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            url: config.process_url(),
            access_token,
        })
    }
}

#[async_trait]
impl DocumentProcessor for DocumentAiClient {
    async fn process(&self, request: ProcessRequest) -> Result<ProcessedDocument, ServiceError> {
        let body = RequestBody::from(&request);
        debug!(
            "Document AI request: {} bytes of {}, {} pages selected",
            request.content.len(),
            request.mime_type,
            request.pages.len()
        );

        let response = self
            .http
            .post(&self.url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ServiceError::from_status(status.as_u16(), &text));
        }

        let parsed: ResponseBody = response.json().await?;
        let doc = parsed.into_processed()?;
        debug!(
            "Document AI response: {} chars of text, {} pages",
            doc.text.chars().count(),
            doc.pages.len()
        );
        Ok(doc)
    }
}

// ── Wire types ───────────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestBody<'a> {
    raw_document: RawDocument<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    process_options: Option<ProcessOptions<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RawDocument<'a> {
    content: String,
    mime_type: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProcessOptions<'a> {
    individual_page_selector: IndividualPageSelector<'a>,
}

#[derive(Serialize)]
struct IndividualPageSelector<'a> {
    pages: &'a [u32],
}

impl<'a> From<&'a ProcessRequest> for RequestBody<'a> {
    fn from(r: &'a ProcessRequest) -> Self {
        RequestBody {
            raw_document: RawDocument {
                content: STANDARD.encode(&r.content),
                mime_type: &r.mime_type,
            },
            process_options: (!r.pages.is_empty()).then_some(ProcessOptions {
                individual_page_selector: IndividualPageSelector { pages: &r.pages },
            }),
        }
    }
}

#[derive(Deserialize)]
struct ResponseBody {
    document: Option<WireDocument>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireDocument {
    #[serde(default)]
    text: String,
    #[serde(default)]
    pages: Vec<WirePage>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePage {
    #[serde(default)]
    page_number: u32,
    image: Option<WireImage>,
}

#[derive(Deserialize)]
struct WireImage {
    #[serde(default)]
    content: String,
}

impl ResponseBody {
    fn into_processed(self) -> Result<ProcessedDocument, ServiceError> {
        let doc = self.document.ok_or_else(|| {
            ServiceError::MalformedResponse("response has no 'document' field".into())
        })?;

        let pages = doc
            .pages
            .into_iter()
            .map(|p| {
                let image = match p.image {
                    Some(img) if !img.content.is_empty() => {
                        Some(STANDARD.decode(img.content.as_bytes()).map_err(|e| {
                            ServiceError::MalformedResponse(format!(
                                "page {}: image is not valid base64: {e}",
                                p.page_number
                            ))
                        })?)
                    }
                    _ => None,
                };
                Ok(DocumentPage {
                    page_number: p.page_number,
                    image,
                })
            })
            .collect::<Result<Vec<_>, ServiceError>>()?;

        Ok(ProcessedDocument {
            text: doc.text,
            pages,
        })
    }
}
