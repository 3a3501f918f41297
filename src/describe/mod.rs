//! Figure describers: turn a cropped figure image into text.
//!
//! Two implementations ship with the crate:
//!
//! * [`content_understanding::ContentUnderstandingDescriber`]: the Azure
//!   Content Understanding `image_schema_analyzer`.
//! * [`vlm::VlmDescriber`]: any vision LLM reachable through `edgequake-llm`.
//!
//! The parser only sees the [`ImageDescriber`] trait.

pub mod content_understanding;
pub mod vlm;

pub use content_understanding::ContentUnderstandingDescriber;
pub use vlm::VlmDescriber;

use crate::error::ServiceError;
use async_trait::async_trait;

/// Describes a PNG-encoded figure.
///
/// Implementations may retry internally; an error returned here fails the
/// document being parsed.
#[async_trait]
pub trait ImageDescriber: Send + Sync {
    async fn describe(&self, png: &[u8]) -> Result<String, ServiceError>;
}
