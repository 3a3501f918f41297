//! Figure description through a vision LLM.
//!
//! ## Retry Strategy
//!
//! Transient provider errors (rate limits, network failures, timeouts, 5xx)
//! are retried with exponential backoff, `retry_backoff_ms * 2^attempt`:
//! with 500 ms base and 3 retries the wait sequence is 500 ms → 1 s → 2 s per
//! figure. Anything else, an empty completion included, fails at once.

use super::ImageDescriber;
use crate::config::VlmDescriberConfig;
use crate::error::{ParseError, ServiceError};
use crate::pipeline::encode::to_image_data;
use crate::prompts::{FIGURE_SYSTEM_PROMPT, FIGURE_USER_PROMPT};
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, LlmError, ProviderFactory};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

const DEFAULT_MODEL: &str = "gpt-4.1-nano";

/// [`ImageDescriber`] backed by an `edgequake-llm` provider.
pub struct VlmDescriber {
    provider: Arc<dyn LLMProvider>,
    config: VlmDescriberConfig,
}

impl VlmDescriber {
    /// Resolve the provider from `config` or the environment.
    pub fn new(config: VlmDescriberConfig) -> Result<Self, ParseError> {
        let provider = resolve_provider(&config)?;
        Ok(Self { provider, config })
    }

    /// Use an already-constructed provider.
    pub fn with_provider(provider: Arc<dyn LLMProvider>, config: VlmDescriberConfig) -> Self {
        Self { provider, config }
    }

    fn messages(&self, png: &[u8]) -> Vec<ChatMessage> {
        let (system_prompt, user_prompt) = message_prompts(&self.config);
        vec![
            ChatMessage::system(system_prompt),
            ChatMessage::user_with_images(user_prompt, vec![to_image_data(png)]),
        ]
    }
}

#[async_trait]
impl ImageDescriber for VlmDescriber {
    async fn describe(&self, png: &[u8]) -> Result<String, ServiceError> {
        let start = Instant::now();
        let messages = self.messages(png);
        let options = build_options(&self.config);

        let mut last_err: Option<ServiceError> = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let backoff = self.config.retry_backoff_ms * 2u64.pow(attempt - 1);
                warn!(
                    "Figure description: retry {}/{} after {}ms",
                    attempt, self.config.max_retries, backoff
                );
                sleep(Duration::from_millis(backoff)).await;
            }

            let err = match self.provider.chat(&messages, Some(&options)).await {
                Ok(response) => {
                    debug!(
                        "Figure described: {} input tokens, {} output tokens, {:?}",
                        response.prompt_tokens,
                        response.completion_tokens,
                        start.elapsed()
                    );
                    let content = response.content.trim();
                    if content.is_empty() {
                        ServiceError::EmptyResponse
                    } else {
                        return Ok(content.to_string());
                    }
                }
                Err(e) => provider_error(self.provider.name(), e),
            };

            warn!("Figure description attempt {} failed: {}", attempt + 1, err);
            if !err.is_transient() {
                return Err(err);
            }
            last_err = Some(err);
        }

        Err(ServiceError::Provider {
            retries: self.config.max_retries,
            detail: last_err
                .map(|e| e.to_string())
                .unwrap_or_else(|| "Unknown error".to_string()),
        })
    }
}

/// Map an SDK error onto the service error taxonomy, so that
/// [`ServiceError::is_transient`] decides whether to retry.
fn provider_error(provider: &str, e: LlmError) -> ServiceError {
    match e {
        LlmError::RateLimited(body) => ServiceError::Status { status: 429, body },
        LlmError::NetworkError(reason) | LlmError::ProviderError(reason) => ServiceError::Request {
            url: provider.to_string(),
            reason,
        },
        LlmError::Timeout => ServiceError::Request {
            url: provider.to_string(),
            reason: "request timed out".to_string(),
        },
        LlmError::ApiError(body) => match server_status(&body) {
            Some(status) => ServiceError::Status { status, body },
            None => ServiceError::Provider {
                retries: 0,
                detail: format!("API error: {body}"),
            },
        },
        other => ServiceError::Provider {
            retries: 0,
            detail: other.to_string(),
        },
    }
}

/// 5xx status quoted in a provider API error message, if any.
fn server_status(message: &str) -> Option<u16> {
    [500, 502, 503, 504]
        .into_iter()
        .find(|code| message.contains(&code.to_string()))
}

fn message_prompts(config: &VlmDescriberConfig) -> (&str, &str) {
    let system_prompt = config
        .system_prompt
        .as_deref()
        .unwrap_or(FIGURE_SYSTEM_PROMPT);
    (system_prompt, FIGURE_USER_PROMPT)
}

fn build_options(config: &VlmDescriberConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}

fn create_vision_provider(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, ParseError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        ParseError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Resolve the LLM provider, from most-specific to least-specific:
/// the pre-built provider, a named provider, `EDGEQUAKE_LLM_PROVIDER` +
/// `EDGEQUAKE_MODEL`, `OPENAI_API_KEY`, then full auto-detection.
fn resolve_provider(config: &VlmDescriberConfig) -> Result<Arc<dyn LLMProvider>, ParseError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);

    if let Some(ref name) = config.provider_name {
        return create_vision_provider(name, model);
    }

    if let (Ok(prov), Ok(env_model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !env_model.is_empty() {
            return create_vision_provider(&prov, &env_model);
        }
    }

    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            return create_vision_provider("openai", model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| ParseError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!("no provider could be auto-detected from environment: {}", e),
        })?;

    Ok(llm_provider)
}
