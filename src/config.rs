//! Configuration types for document parsing.
//!
//! Parser behaviour is controlled through [`ParserConfig`], built via its
//! [`ParserConfigBuilder`]. Service clients take their endpoint and a
//! [`Credential`] directly; the knobs here govern how the analysis result is
//! reconciled into pages.

use crate::error::ParseError;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::sync::Arc;

/// Configuration for parsing a document into pages.
///
/// # Example
/// ```rust
/// use docintel_pages::{ParserConfig, TableMarkup};
///
/// let config = ParserConfig::builder()
///     .table_markup(TableMarkup::Bare)
///     .figure_concurrency(2)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ParserConfig {
    /// Layout model used by the analysis service. Default: `prebuilt-layout`.
    pub model_id: String,

    /// Replace figures with AI-generated descriptions. Default: true.
    ///
    /// When off, figures are neither requested from the analysis service nor
    /// reconciled; their characters stay as plain text.
    pub describe_figures: bool,

    /// How tables are wrapped. Default: [`TableMarkup::Figure`].
    pub table_markup: TableMarkup,

    /// Maximum concurrent describer calls for the figures of one page. Default: 4.
    ///
    /// Results are merged in page order regardless of completion order.
    pub figure_concurrency: usize,

    /// PDF user password, used when rasterising figures or decoding locally.
    pub password: Option<String>,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Optional per-page progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            model_id: "prebuilt-layout".to_string(),
            describe_figures: true,
            table_markup: TableMarkup::default(),
            figure_concurrency: 4,
            password: None,
            download_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ParserConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserConfig")
            .field("model_id", &self.model_id)
            .field("describe_figures", &self.describe_figures)
            .field("table_markup", &self.table_markup)
            .field("figure_concurrency", &self.figure_concurrency)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ParseProgressCallback>"),
            )
            .finish()
    }
}

impl ParserConfig {
    /// Create a new builder for `ParserConfig`.
    pub fn builder() -> ParserConfigBuilder {
        ParserConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ParserConfig`].
#[derive(Debug)]
pub struct ParserConfigBuilder {
    config: ParserConfig,
}

impl ParserConfigBuilder {
    pub fn model_id(mut self, model_id: impl Into<String>) -> Self {
        self.config.model_id = model_id.into();
        self
    }

    pub fn describe_figures(mut self, v: bool) -> Self {
        self.config.describe_figures = v;
        self
    }

    pub fn table_markup(mut self, markup: TableMarkup) -> Self {
        self.config.table_markup = markup;
        self
    }

    pub fn figure_concurrency(mut self, n: usize) -> Self {
        self.config.figure_concurrency = n.max(1);
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ParserConfig, ParseError> {
        let c = &self.config;
        if c.model_id.trim().is_empty() {
            return Err(ParseError::InvalidConfig("model_id must not be empty".into()));
        }
        if c.figure_concurrency == 0 {
            return Err(ParseError::InvalidConfig(
                "figure_concurrency must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}

/// Settings for the vision-LLM figure describer.
///
/// Provider resolution runs from most to least specific: a pre-built
/// `provider`, then `provider_name` + `model`, then the environment.
#[derive(Clone)]
pub struct VlmDescriberConfig {
    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    pub provider_name: Option<String>,

    /// Model identifier. If None, uses `gpt-4.1-nano`.
    pub model: Option<String>,

    /// Sampling temperature. Default: 0.1.
    pub temperature: f32,

    /// Maximum tokens per description. Default: 1024.
    pub max_tokens: usize,

    /// Retries per figure after the first attempt. Default: 3.
    pub max_retries: u32,

    /// Initial retry backoff, doubled per attempt. Default: 500.
    pub retry_backoff_ms: u64,

    /// Replaces the built-in figure-description prompt.
    pub system_prompt: Option<String>,
}

impl Default for VlmDescriberConfig {
    fn default() -> Self {
        Self {
            provider: None,
            provider_name: None,
            model: None,
            temperature: 0.1,
            max_tokens: 1024,
            max_retries: 3,
            retry_backoff_ms: 500,
            system_prompt: None,
        }
    }
}

impl fmt::Debug for VlmDescriberConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VlmDescriberConfig")
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("provider_name", &self.provider_name)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .field("system_prompt", &self.system_prompt.as_ref().map(|p| p.len()))
            .finish()
    }
}

impl VlmDescriberConfig {
    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.provider_name = Some(name.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.max_tokens = n.max(1);
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.retry_backoff_ms = ms;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Wrapping used for rendered tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableMarkup {
    /// `<figure><table>…</table></figure>` (default).
    #[default]
    Figure,
    /// Legacy bare `<table>…</table>`.
    Bare,
}

/// How a service client authenticates.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Resource key sent as `Ocp-Apim-Subscription-Key`.
    ApiKey(String),
    /// Pre-acquired Entra ID access token sent as `Authorization: Bearer`.
    BearerToken(String),
}

impl Credential {
    pub(crate) fn apply(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            Credential::ApiKey(key) => request.header("Ocp-Apim-Subscription-Key", key),
            Credential::BearerToken(token) => request.bearer_auth(token),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::ApiKey(_) => f.write_str("Credential::ApiKey(<redacted>)"),
            Credential::BearerToken(_) => f.write_str("Credential::BearerToken(<redacted>)"),
        }
    }
}
