//! Error types for the charaka-pipeline library.
//!
//! Two error types mirror the two ways a stage can go wrong:
//!
//! * [`PipelineError`]: **Fatal**: the stage cannot continue (input JSON
//!   missing, output folder not writable, interpretation retries exhausted).
//!   Returned as `Err(PipelineError)` from the [`crate::run`] entry points.
//!
//! * [`ServiceError`]: **Per call**: one request to an external service
//!   (document processing, translation, language model) failed. Whether it
//!   is fatal depends on the stage: the translation stage logs it and leaves
//!   the verse field empty, the interpretation stage retries and then turns
//!   it into [`PipelineError::InterpretationFailed`].

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the charaka-pipeline library.
#[derive(Debug, Error)]
pub enum PipelineError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// An input file or folder was not found.
    #[error("Input not found: '{path}'\nRun the previous stage first or check the path.")]
    FileNotFound { path: PathBuf },

    /// Reading an input file failed.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An input file was read but is not the expected JSON shape.
    #[error("Malformed JSON in '{path}': {source}")]
    MalformedJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A page image returned by the document service could not be decoded.
    #[error("Page {page}: image decode failed: {detail}")]
    ImageDecode { page: u32, detail: String },

    /// OCR produced no text at all, so there is nothing to segment.
    #[error("No OCR content extracted from '{folder}'")]
    NoOcrContent { folder: PathBuf },

    // ── Service errors ────────────────────────────────────────────────────
    /// The document-processing service failed in a stage that cannot skip it.
    #[error("Document processing failed for '{path}': {source}")]
    DocumentProcessing {
        path: PathBuf,
        #[source]
        source: ServiceError,
    },

    /// The configured LLM provider could not be created.
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The interpretation call failed on every attempt; the run is aborted.
    #[error("Interpretation of verse group '{group}' failed after {attempts} attempts: {source}")]
    InterpretationFailed {
        group: String,
        attempts: u32,
        #[source]
        source: ServiceError,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serialising an output document failed.
    #[error("Failed to serialise output: {0}")]
    Serialize(#[from] serde_json::Error),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// A failed call to an external collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// Connection, DNS, TLS or timeout failure before a response arrived.
    #[error("network error: {0}")]
    Network(String),

    /// HTTP 401/403 or a missing credential.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// HTTP 429.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Any other non-success HTTP status.
    #[error("service returned HTTP {status}: {detail}")]
    Api { status: u16, detail: String },

    /// A 2xx response whose body is not what the API documents.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Input the collaborator cannot handle at all.
    #[error("unsupported input: {0}")]
    Unsupported(String),
}

impl ServiceError {
    /// Map an HTTP status and body excerpt onto the error kinds.
    pub fn from_status(status: u16, body: &str) -> Self {
        let detail = truncate(body, 300);
        match status {
            401 | 403 => ServiceError::Auth(detail),
            429 => ServiceError::RateLimited(detail),
            _ => ServiceError::Api { status, detail },
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            return ServiceError::from_status(status.as_u16(), &e.to_string());
        }
        if e.is_decode() {
            ServiceError::MalformedResponse(e.to_string())
        } else {
            ServiceError::Network(e.to_string())
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}\u{2026}", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert!(matches!(ServiceError::from_status(401, "nope"), ServiceError::Auth(_)));
        assert!(matches!(ServiceError::from_status(403, ""), ServiceError::Auth(_)));
        assert!(matches!(
            ServiceError::from_status(429, "slow down"),
            ServiceError::RateLimited(_)
        ));
        assert_eq!(
            ServiceError::from_status(500, "boom"),
            ServiceError::Api {
                status: 500,
                detail: "boom".into()
            }
        );
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(1000);
        match ServiceError::from_status(502, &body) {
            ServiceError::Api { detail, .. } => {
                assert!(detail.chars().count() <= 301, "got {} chars", detail.len());
                assert!(detail.ends_with('\u{2026}'));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn interpretation_failed_display() {
        let e = PipelineError::InterpretationFailed {
            group: "12-15".into(),
            attempts: 3,
            source: ServiceError::Network("connection reset".into()),
        };
        let msg = e.to_string();
        assert!(msg.contains("12-15"), "got: {msg}");
        assert!(msg.contains("3 attempts"), "got: {msg}");
    }

    #[test]
    fn no_ocr_content_display() {
        let e = PipelineError::NoOcrContent {
            folder: PathBuf::from("ExtractedImage/S1-Chapter5"),
        };
        assert!(e.to_string().contains("S1-Chapter5"));
    }
}
