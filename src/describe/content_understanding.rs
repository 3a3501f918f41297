//! Figure description through Azure Content Understanding.
//!
//! A custom analyzer (`image_schema_analyzer`) derived from `prebuilt-image`
//! extracts a title, an image type and a Markdown description from each
//! figure. The analyzer must exist before the first description; create it
//! once with [`ContentUnderstandingDescriber::create_analyzer`], which treats
//! `409 Conflict` as "already there".

use super::ImageDescriber;
use crate::analysis::client::{operation_location, retry_after};
use crate::config::Credential;
use crate::error::ServiceError;
use crate::poll::{poll_until, OperationState, PollPolicy, PollStatus};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info};

pub const CU_API_VERSION: &str = "2024-12-01-preview";

pub const ANALYZER_ID: &str = "image_schema_analyzer";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Analyzer definition sent on creation.
pub static IMAGE_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "analyzerId": ANALYZER_ID,
        "name": "Image understanding",
        "description": "Extract detailed structured information from images extracted from documents.",
        "baseAnalyzerId": "prebuilt-image",
        "scenario": "image",
        "config": { "returnDetails": false },
        "fieldSchema": {
            "name": "ImageInformation",
            "descriptions": "Structured information from images.",
            "fields": {
                "Title": {
                    "type": "string",
                    "description": "Title for the image (either taken from the image directly or a good short title based off content)"
                },
                "ImageType": {
                    "type": "string",
                    "description": "The type of image.",
                    "kind": "classify",
                    "enum": [
                        "chart", "diagram", "table", "figure", "photo", "screenshot",
                        "logo", "icon", "map", "infographic", "other"
                    ]
                },
                "MarkdownDescription": {
                    "type": "string",
                    "description": "Description of the image in markdown format. Start with a 2-sentence summary. If the image is a chart, diagram, or table, include the underlying data in tabular markdown format, with valid syntax and accurate numbers. If the image is a chart, describe any axis or legends."
                }
            }
        }
    })
});

/// [`ImageDescriber`] backed by a Content Understanding analyzer.
pub struct ContentUnderstandingDescriber {
    client: Client,
    endpoint: String,
    credential: Credential,
    analyzer_id: String,
    poll: PollPolicy,
}

impl ContentUnderstandingDescriber {
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
            analyzer_id: ANALYZER_ID.to_string(),
            poll: PollPolicy::image_analysis(),
        })
    }

    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
        self.poll = policy;
        self
    }

    fn analyzer_url(&self) -> String {
        format!(
            "{}/contentunderstanding/analyzers/{}?api-version={}",
            self.endpoint, self.analyzer_id, CU_API_VERSION
        )
    }

    fn analyze_url(&self) -> String {
        format!(
            "{}/contentunderstanding/analyzers/{}:analyze?api-version={}",
            self.endpoint, self.analyzer_id, CU_API_VERSION
        )
    }

    /// Create the image analyzer and wait until it is ready.
    #[tracing::instrument(skip(self), fields(analyzer = %self.analyzer_id))]
    pub async fn create_analyzer(&self) -> Result<(), ServiceError> {
        let url = self.analyzer_url();
        let response = self
            .credential
            .apply(self.client.put(&url))
            .json(&*IMAGE_SCHEMA)
            .send()
            .await
            .map_err(|e| ServiceError::Request {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        match response.status() {
            StatusCode::CONFLICT => {
                info!("Analyzer '{}' already exists", self.analyzer_id);
                return Ok(());
            }
            StatusCode::CREATED => {}
            status => {
                let body = response.text().await.unwrap_or_default();
                return Err(ServiceError::Status {
                    status: status.as_u16(),
                    body,
                });
            }
        }

        let operation_url = operation_location(response.headers())?;
        poll_until(&self.poll, |_| self.check_creation(&operation_url)).await?;

        info!("Analyzer '{}' created", self.analyzer_id);
        Ok(())
    }

    async fn submit(&self, png: &[u8]) -> Result<String, ServiceError> {
        let url = self.analyze_url();
        let response = self
            .credential
            .apply(self.client.post(&url))
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(png.to_vec())
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

    async fn get_operation(&self, operation_url: &str) -> Result<CuOperation, ServiceError> {
        let response = self
            .credential
            .apply(self.client.get(operation_url))
            .send()
            .await
            .map_err(|e| ServiceError::Request {
                url: operation_url.to_string(),
                reason: e.to_string(),
            })?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Ok(CuOperation::throttled(retry_after(response.headers())));
        }

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Status { status, body });
        }

        response
            .json()
            .await
            .map_err(|e| ServiceError::Decode(e.to_string()))
    }

    async fn check_creation(&self, operation_url: &str) -> Result<PollStatus<()>, ServiceError> {
        let operation = self.get_operation(operation_url).await?;
        if let Some(d) = operation.retry {
            return Ok(PollStatus::RetryAfter(d));
        }
        Ok(match OperationState::parse(&operation.status) {
            OperationState::Succeeded => PollStatus::Succeeded(()),
            OperationState::Failed | OperationState::Canceled => {
                PollStatus::Failed(operation.failure_reason())
            }
            OperationState::NotStarted | OperationState::Running => PollStatus::Running,
        })
    }

    async fn check(&self, operation_url: &str) -> Result<PollStatus<Value>, ServiceError> {
        let operation = self.get_operation(operation_url).await?;
        if let Some(d) = operation.retry {
            return Ok(PollStatus::RetryAfter(d));
        }
        match OperationState::parse(&operation.status) {
            OperationState::Succeeded => operation
                .result
                .map(PollStatus::Succeeded)
                .ok_or(ServiceError::EmptyResponse),
            OperationState::Failed | OperationState::Canceled => {
                Ok(PollStatus::Failed(operation.failure_reason()))
            }
            OperationState::NotStarted | OperationState::Running => Ok(PollStatus::Running),
        }
    }
}

#[async_trait]
impl ImageDescriber for ContentUnderstandingDescriber {
    #[tracing::instrument(skip(self, png), fields(bytes = png.len()))]
    async fn describe(&self, png: &[u8]) -> Result<String, ServiceError> {
        let operation_url = self.submit(png).await?;
        debug!("Image analysis accepted, polling {}", operation_url);

        let result = poll_until(&self.poll, |_| self.check(&operation_url)).await?;
        description_from_result(&result)
    }
}

#[derive(Debug, Default, Deserialize)]
struct CuOperation {
    #[serde(default)]
    status: String,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
    #[serde(skip)]
    retry: Option<Duration>,
}

impl CuOperation {
    fn throttled(delay: Duration) -> Self {
        Self {
            retry: Some(delay),
            ..Default::default()
        }
    }

    fn failure_reason(&self) -> String {
        self.error
            .as_ref()
            .map(|e| e.to_string())
            .unwrap_or_else(|| self.status.clone())
    }
}

/// Pull the description out of `result.contents[0].fields`.
///
/// The `MarkdownDescription` string wins; otherwise the fields object is
/// returned as JSON so nothing the analyzer found is lost.
fn description_from_result(result: &Value) -> Result<String, ServiceError> {
    let fields = result
        .pointer("/contents/0/fields")
        .ok_or(ServiceError::EmptyResponse)?;

    if let Some(text) = fields
        .pointer("/MarkdownDescription/valueString")
        .and_then(Value::as_str)
    {
        return Ok(text.to_string());
    }

    Ok(fields.to_string())
}
