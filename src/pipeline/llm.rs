//! Language-model interaction: send one prompt, get one reply.
//!
//! All prompt text lives in [`crate::prompts`]; this module only owns the
//! provider call and its retry loop.
//!
//! ## Retry Strategy
//!
//! A fixed number of attempts with a fixed pause between them (3 × 5 s by
//! default). There is no backoff growth and no jitter: the stage is strictly
//! sequential, so there is never a herd of workers to spread out.

use crate::config::{PipelineConfig, RetryPolicy};
use crate::error::{PipelineError, ServiceError};
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::sleep;
use tracing::{debug, error, info};

/// Turns a prompt into the model's free-text answer.
#[async_trait]
pub trait Interpreter: Send + Sync {
    async fn interpret(&self, prompt: &str) -> Result<String, ServiceError>;
}

/// [`Interpreter`] backed by any edgequake-llm provider.
pub struct LlmInterpreter {
    provider: Arc<dyn LLMProvider>,
    max_tokens: usize,
}

impl LlmInterpreter {
    pub fn new(provider: Arc<dyn LLMProvider>, max_tokens: usize) -> Self {
        Self {
            provider,
            max_tokens,
        }
    }

    /// Use the configured provider, or create one by name and model.
    ///
    /// The named provider reads its API key (`ANTHROPIC_API_KEY`, …) from the
    /// environment.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, PipelineError> {
        let provider = match &config.provider {
            Some(p) => Arc::clone(p),
            None => ProviderFactory::create_llm_provider(&config.provider_name, &config.model)
                .map_err(|e| PipelineError::ProviderNotConfigured {
                    provider: config.provider_name.clone(),
                    hint: format!("{e}"),
                })?,
        };
        Ok(Self::new(provider, config.max_tokens))
    }
}

#[async_trait]
impl Interpreter for LlmInterpreter {
    async fn interpret(&self, prompt: &str) -> Result<String, ServiceError> {
        let start = Instant::now();
        let messages = vec![ChatMessage::user(prompt)];
        let options = build_options(self.max_tokens);

        let response = self
            .provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| classify_llm_error(&e.to_string()))?;

        debug!(
            "{} input tokens, {} output tokens, {:?}",
            response.prompt_tokens,
            response.completion_tokens,
            start.elapsed()
        );
        Ok(response.content)
    }
}

/// Build `CompletionOptions` for an interpretation call.
fn build_options(max_tokens: usize) -> CompletionOptions {
    CompletionOptions {
        max_tokens: Some(max_tokens),
        ..Default::default()
    }
}

/// Sort a provider error message into the service error kinds.
fn classify_llm_error(msg: &str) -> ServiceError {
    let lower = msg.to_lowercase();
    if lower.contains("401")
        || lower.contains("403")
        || lower.contains("unauthori")
        || lower.contains("api key")
        || lower.contains("authentication")
    {
        ServiceError::Auth(msg.to_string())
    } else if lower.contains("429") || lower.contains("rate limit") {
        ServiceError::RateLimited(msg.to_string())
    } else if lower.contains("parse") || lower.contains("deserial") || lower.contains("invalid response") {
        ServiceError::MalformedResponse(msg.to_string())
    } else {
        ServiceError::Network(msg.to_string())
    }
}

/// Call the interpreter up to `policy.max_attempts` times.
///
/// Sleeps `policy.delay` between attempts and returns the last error once
/// every attempt has failed.
pub async fn call_with_retry(
    interpreter: &dyn Interpreter,
    prompt: &str,
    policy: RetryPolicy,
) -> Result<String, ServiceError> {
    let mut last_err =
        ServiceError::Unsupported("retry policy allows no attempts".to_string());

    for attempt in 1..=policy.max_attempts {
        debug!("Sending API request, attempt {}", attempt);
        match interpreter.interpret(prompt).await {
            Ok(content) => {
                debug!("API request successful");
                return Ok(content);
            }
            Err(e) => {
                error!("API request failed: {}", e);
                last_err = e;
                if attempt < policy.max_attempts {
                    info!("Retrying in {} seconds...", policy.delay.as_secs_f32());
                    sleep(policy.delay).await;
                } else {
                    error!("Max retries reached. Giving up.");
                }
            }
        }
    }

    Err(last_err)
}
