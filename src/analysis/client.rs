//! HTTP client for the Document Intelligence layout model.
//!
//! The analyse call is asynchronous on the service side: the POST returns
//! `202 Accepted` with an `Operation-Location` header, which is then polled
//! under a [`PollPolicy`] until the analysis succeeds or fails. A `429` while
//! polling honours the server's `Retry-After`.

use super::model::AnalyzeResult;
use super::{AnalyzeOptions, DocumentAnalyzer};
use crate::config::Credential;
use crate::error::ServiceError;
use crate::poll::{poll_until, OperationState, PollPolicy, PollStatus};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

pub const API_VERSION: &str = "2024-11-30";

/// Per-request HTTP timeout; the overall operation is bounded by the poll policy.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct DocumentIntelligenceClient {
    client: Client,
    endpoint: String,
    credential: Credential,
    poll: PollPolicy,
}

impl DocumentIntelligenceClient {
    pub fn new(endpoint: &str, credential: Credential) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ServiceError::Request {
                url: endpoint.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            credential,
            poll: PollPolicy::document_analysis(),
        })
    }

    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
        self.poll = policy;
        self
    }

    fn analyze_url(&self, options: &AnalyzeOptions) -> String {
        analyze_url(&self.endpoint, options)
    }

    async fn submit(&self, data: &[u8], options: &AnalyzeOptions) -> Result<String, ServiceError> {
        let url = self.analyze_url(options);
        let body = serde_json::json!({ "base64Source": STANDARD.encode(data) });

        let response = self
            .credential
            .apply(self.client.post(&url))
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::Request {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Status { status, body });
        }

        operation_location(response.headers())
    }

    async fn check(&self, operation_url: &str) -> Result<PollStatus<AnalyzeResult>, ServiceError> {
        let response = self
            .credential
            .apply(self.client.get(operation_url))
            .send()
            .await
            .map_err(|e| ServiceError::Request {
                url: operation_url.to_string(),
                reason: e.to_string(),
            })?;

        if response.status().as_u16() == 429 {
            return Ok(PollStatus::RetryAfter(retry_after(response.headers())));
        }

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Status { status, body });
        }

        let operation: AnalyzeOperation = response
            .json()
            .await
            .map_err(|e| ServiceError::Decode(e.to_string()))?;
        operation.into_status()
    }
}

#[async_trait]
impl DocumentAnalyzer for DocumentIntelligenceClient {
    #[tracing::instrument(skip(self, document), fields(bytes = document.len(), model = %options.model_id))]
    async fn analyze(
        &self,
        document: &[u8],
        options: &AnalyzeOptions,
    ) -> Result<AnalyzeResult, ServiceError> {
        let operation_url = self.submit(document, options).await?;
        debug!("Analysis accepted, polling {}", operation_url);

        let result = poll_until(&self.poll, |_| self.check(&operation_url)).await?;
        info!(
            pages = result.pages.len(),
            tables = result.tables.len(),
            figures = result.figures.len(),
            "Document analysis complete"
        );
        Ok(result)
    }
}

/// Model that supports figure output; used whenever figures are requested.
const LAYOUT_MODEL_ID: &str = "prebuilt-layout";

/// Build the analyse URL. Offsets are requested in code points so they index
/// a `Vec<char>` of the content directly.
///
/// Figure extraction only exists on the layout model, so `model_id` applies
/// to figure-less requests only.
pub(crate) fn analyze_url(endpoint: &str, options: &AnalyzeOptions) -> String {
    let model_id = if options.include_figures {
        LAYOUT_MODEL_ID
    } else {
        options.model_id.as_str()
    };
    let mut url = format!(
        "{}/documentintelligence/documentModels/{}:analyze?api-version={}&stringIndexType=unicodeCodePoint",
        endpoint, model_id, API_VERSION
    );
    if options.include_figures {
        url.push_str("&outputContentFormat=markdown&output=figures&features=ocrHighResolution");
    }
    url
}

pub(crate) fn operation_location(headers: &reqwest::header::HeaderMap) -> Result<String, ServiceError> {
    headers
        .get("Operation-Location")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .ok_or(ServiceError::MissingOperationLocation)
}

/// `Retry-After` in seconds, defaulting to 2 s when absent or unparsable.
pub(crate) fn retry_after(headers: &reqwest::header::HeaderMap) -> Duration {
    let secs = headers
        .get("Retry-After")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(2);
    Duration::from_secs(secs)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeOperation {
    status: String,
    #[serde(default)]
    analyze_result: Option<AnalyzeResult>,
    #[serde(default)]
    error: Option<ServiceErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ServiceErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

impl AnalyzeOperation {
    fn into_status(self) -> Result<PollStatus<AnalyzeResult>, ServiceError> {
        match OperationState::parse(&self.status) {
            OperationState::Succeeded => self
                .analyze_result
                .map(PollStatus::Succeeded)
                .ok_or(ServiceError::EmptyResponse),
            OperationState::Failed | OperationState::Canceled => {
                let reason = self
                    .error
                    .map(|e| format!("{}: {}", e.code, e.message))
                    .unwrap_or_else(|| self.status.clone());
                Ok(PollStatus::Failed(reason))
            }
            OperationState::NotStarted | OperationState::Running => Ok(PollStatus::Running),
        }
    }
}
