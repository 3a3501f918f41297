//! Remote document analysis: the result model and the service client.
//!
//! The parser only depends on the [`DocumentAnalyzer`] trait; the bundled
//! [`client::DocumentIntelligenceClient`] is one implementation of it, and
//! tests substitute canned results.

pub mod client;
pub mod model;

pub use client::DocumentIntelligenceClient;
pub use model::{
    AnalyzeResult, BoundingRegion, Caption, CellKind, DocumentFigure, DocumentPage,
    DocumentTable, Span, TableCell,
};

use crate::error::ServiceError;
use async_trait::async_trait;

/// What to ask of the analysis service for one document.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzeOptions {
    /// Layout model to run, e.g. `prebuilt-layout`. Ignored when
    /// `include_figures` is set: figure requests always go to `prebuilt-layout`.
    pub model_id: String,
    /// Request figure detection (and the markdown content format figures
    /// are reported against).
    pub include_figures: bool,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            model_id: "prebuilt-layout".to_string(),
            include_figures: true,
        }
    }
}

/// Produces an [`AnalyzeResult`] for raw document bytes.
#[async_trait]
pub trait DocumentAnalyzer: Send + Sync {
    async fn analyze(
        &self,
        document: &[u8],
        options: &AnalyzeOptions,
    ) -> Result<AnalyzeResult, ServiceError>;
}
