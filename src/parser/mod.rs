//! Document parsers: turn a [`DocumentSource`] into a lazy stream of pages.
//!
//! * [`document::DocumentAnalysisParser`]: sends the document to a layout
//!   analysis service and reconciles tables and figures into the page text.
//! * [`local::LocalPdfParser`]: plain per-page text straight from pdfium,
//!   no remote calls.
//!
//! Both produce the same [`Page`] contract: pages in ascending order, each
//! stamped with the cumulative character offset of the text emitted before it.

pub mod document;
pub mod local;

pub use document::DocumentAnalysisParser;
pub use local::LocalPdfParser;

use crate::config::ParserConfig;
use crate::error::ParseError;
use crate::output::Page;
use crate::pipeline::input::DocumentSource;
use futures::Stream;
use std::pin::Pin;

/// A boxed stream of pages.
///
/// Finite and forward-only. Nothing happens until it is first polled; the
/// first `Err` item is also the last item, and dropping the stream stops any
/// further service calls.
pub type PageStream = Pin<Box<dyn Stream<Item = Result<Page, ParseError>> + Send>>;

/// Something that can parse a document into pages.
pub trait Parser: Send + Sync {
    /// Start parsing `source`. Work starts on the first poll.
    fn parse(&self, source: DocumentSource) -> PageStream;

    /// The configuration this parser was built with.
    fn config(&self) -> &ParserConfig;
}
