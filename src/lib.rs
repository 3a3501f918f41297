//! # docintel-pages
//!
//! Turn documents into page-level text records for search indexing.
//!
//! A layout analysis service returns one flat content buffer plus tables and
//! figures expressed as character spans into it. This crate reconciles that
//! into one text stream per page in which every character is plain text,
//! part of a table, or part of a figure, and each table or figure appears
//! exactly once:
//!
//! * tables become HTML (`<figure><table>…</table></figure>`),
//! * figures are cropped from the rendered page and replaced by an
//!   AI-generated description (`<figure><figcaption>…</figcaption></figure>`).
//!
//! ## Pipeline Overview
//!
//! ```text
//! document bytes
//!  │
//!  ├─ 1. Analyze   remote layout analysis (once, on first poll)
//!  ├─ 2. Mask      per-page character classification; figures win overlaps
//!  ├─ 3. Render    tables → HTML, figures → crop (pdfium) → describer
//!  ├─ 4. Assemble  plain chars + region markup, each region once
//!  └─ 5. Emit      Page { page_num, offset, text } with cumulative offsets
//! ```
//!
//! [`LocalPdfParser`] is the no-service fallback: plain per-page text from
//! pdfium under the same [`Page`] contract.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docintel_pages::{
//!     parse_stream, Credential, DocumentAnalysisParser, DocumentIntelligenceClient,
//!     ParserConfig,
//! };
//! use futures::StreamExt;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let analyzer = DocumentIntelligenceClient::new(
//!         "https://my-di.cognitiveservices.azure.com",
//!         Credential::ApiKey(std::env::var("AZURE_DI_KEY")?),
//!     )?;
//!     let config = ParserConfig::builder().describe_figures(false).build()?;
//!     let parser = DocumentAnalysisParser::new(Arc::new(analyzer), config);
//!
//!     let mut pages = parse_stream("document.pdf", &parser).await?;
//!     while let Some(page) = pages.next().await {
//!         let page = page?;
//!         println!("page {} @ {}: {}", page.page_num, page.offset, page.text);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## pdfium
//!
//! Figure cropping and [`LocalPdfParser`] need the pdfium shared library.
//! Set `PDFIUM_LIB_PATH` to the library file, or put it in the working
//! directory or on the system library path.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analysis;
pub mod config;
pub mod convert;
pub mod describe;
pub mod error;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod poll;
pub mod progress;
pub mod prompts;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analysis::{AnalyzeOptions, AnalyzeResult, DocumentAnalyzer, DocumentIntelligenceClient};
pub use config::{Credential, ParserConfig, ParserConfigBuilder, TableMarkup, VlmDescriberConfig};
pub use convert::{collect_pages, parse_to_pages, parse_to_pages_sync, write_pages_json};
pub use describe::{ContentUnderstandingDescriber, ImageDescriber, VlmDescriber};
pub use error::{ParseError, ServiceError};
pub use output::Page;
pub use parser::{DocumentAnalysisParser, LocalPdfParser, PageStream, Parser};
pub use pipeline::input::DocumentSource;
pub use pipeline::render::PageRasterizer;
pub use poll::PollPolicy;
pub use progress::{NoopProgressCallback, ParseProgressCallback, ProgressCallback};
pub use stream::parse_stream;
