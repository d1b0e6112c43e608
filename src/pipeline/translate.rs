//! Translation stage: attach a romanisation and an English translation to
//! every verse.
//!
//! Each verse is handled on its own. A failed transliteration or translation
//! is logged and leaves that one field empty; the loop always runs to the
//! end, so one bad verse never costs the rest of the chapter.

use crate::error::{PipelineError, ServiceError};
use crate::output::ChapterDocument;
use crate::pipeline::transliterate::Transliterator;
use crate::progress::{or_noop, ProgressCallback};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

const STAGE: &str = "translate";

/// Machine translation of one text into a target language.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, ServiceError>;
}

/// Counts from one run of [`translate_chapter`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranslateSummary {
    pub verses: usize,
    pub transliterated: usize,
    pub translated: usize,
    /// Verses where both calls succeeded.
    pub complete: usize,
}

/// Transliterate and translate every verse of `doc` in place.
pub async fn translate_chapter(
    doc: &mut ChapterDocument,
    transliterator: &dyn Transliterator,
    translator: &dyn Translator,
    target_language: &str,
    progress: Option<&ProgressCallback>,
) -> TranslateSummary {
    let cb = or_noop(progress);
    let total = doc.book.sanskrit_verses.len();
    let mut summary = TranslateSummary {
        verses: total,
        ..Default::default()
    };
    cb.on_stage_start(STAGE, total);

    for (i, verse) in doc.book.sanskrit_verses.iter_mut().enumerate() {
        let label = format!("verse {}", verse.verse_number);
        let mut failures = Vec::new();

        debug!("Attempting to transliterate text: {}...", preview(&verse.sanskrit));
        verse.transliteration = match transliterator.transliterate(&verse.sanskrit) {
            Ok(t) => {
                summary.transliterated += 1;
                Some(t)
            }
            Err(e) => {
                error!("Error transliterating verse {}: {}", verse.verse_number, e);
                failures.push(format!("transliteration: {e}"));
                None
            }
        };

        debug!("Attempting to translate text: {}...", preview(&verse.sanskrit));
        verse.translation = match translator.translate(&verse.sanskrit, target_language).await {
            Ok(t) => {
                summary.translated += 1;
                Some(t)
            }
            Err(e) => {
                error!("Error translating verse {}: {}", verse.verse_number, e);
                failures.push(format!("translation: {e}"));
                None
            }
        };

        info!("Processed verse {}", verse.verse_number);
        if failures.is_empty() {
            summary.complete += 1;
            cb.on_item_complete(STAGE, &label, i + 1, total);
        } else {
            cb.on_item_error(STAGE, &label, i + 1, total, &failures.join("; "));
        }
    }

    cb.on_stage_complete(STAGE, total, summary.complete);
    summary
}

fn preview(text: &str) -> String {
    text.chars().take(50).collect()
}

// ── Google Cloud Translation (v2 REST) ───────────────────────────────────────

const TRANSLATE_URL: &str = "https://translation.googleapis.com/language/translate/v2";

enum Credential {
    ApiKey(String),
    Bearer(String),
}

/// [`Translator`] backed by the Cloud Translation v2 REST API.
pub struct GoogleTranslateClient {
    http: reqwest::Client,
    url: String,
    credential: Credential,
}

impl GoogleTranslateClient {
    /// Build a client from an API key or, failing that, an OAuth bearer token.
    pub fn new(api_key: Option<&str>, access_token: Option<&str>) -> Result<Self, PipelineError> {
        let credential = match (
            api_key.filter(|k| !k.is_empty()),
            access_token.filter(|t| !t.is_empty()),
        ) {
            (Some(key), _) => Credential::ApiKey(key.to_string()),
            (None, Some(token)) => Credential::Bearer(token.to_string()),
            (None, None) => {
                return Err(PipelineError::InvalidConfig(
                    "Cloud Translation needs GOOGLE_TRANSLATE_API_KEY or GOOGLE_ACCESS_TOKEN".into(),
                ))
            }
        };
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| PipelineError::InvalidConfig(format!("HTTP client: {e}")))?;
        Ok(Self {
            http,
            url: TRANSLATE_URL.to_string(),
            credential,
        })
    }
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    target: &'a str,
    format: &'static str,
}

#[derive(Deserialize)]
struct TranslateResponse {
    data: TranslateData,
}

#[derive(Deserialize)]
struct TranslateData {
    #[serde(default)]
    translations: Vec<Translation>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
}

impl TranslateResponse {
    fn into_text(self) -> Result<String, ServiceError> {
        self.data
            .translations
            .into_iter()
            .next()
            .map(|t| t.translated_text)
            .ok_or_else(|| ServiceError::MalformedResponse("no translations in response".into()))
    }
}

#[async_trait]
impl Translator for GoogleTranslateClient {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, ServiceError> {
        let body = TranslateRequest {
            q: text,
            target: target_language,
            format: "text",
        };
        let request = self.http.post(&self.url).json(&body);
        let request = match &self.credential {
            Credential::ApiKey(key) => request.query(&[("key", key)]),
            Credential::Bearer(token) => request.bearer_auth(token),
        };

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ServiceError::from_status(status.as_u16(), &text));
        }
        let parsed: TranslateResponse = response.json().await?;
        parsed.into_text()
    }
}
