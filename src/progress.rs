//! Progress-callback trait for per-page parse events.
//!
//! Inject an [`Arc<dyn ParseProgressCallback>`] via
//! [`crate::config::ParserConfigBuilder::progress_callback`] to receive events
//! as the parser walks a document. Callers can forward them to a channel, a
//! log, or a progress bar without the library knowing how.
//!
//! # Example
//!
//! ```rust
//! use docintel_pages::{ParseProgressCallback, ParserConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     pages: AtomicUsize,
//! }
//!
//! impl ParseProgressCallback for CountingCallback {
//!     fn on_page_complete(&self, page_num: usize, total_pages: usize, text_len: usize) {
//!         self.pages.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Page {}/{} done ({} chars)", page_num + 1, total_pages, text_len);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { pages: AtomicUsize::new(0) });
//!
//! let config = ParserConfig::builder()
//!     .progress_callback(counter as Arc<dyn ParseProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by a parser as it processes each page.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Page numbers are 0-indexed, matching
/// [`crate::output::Page::page_num`].
pub trait ParseProgressCallback: Send + Sync {
    /// Called once the page count is known, before the first page.
    fn on_document_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called before a page is masked and assembled.
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called after a figure description came back.
    ///
    /// May be called concurrently for figures on the same page.
    fn on_figure_described(&self, page_num: usize, figure_id: &str) {
        let _ = (page_num, figure_id);
    }

    /// Called when a page record is about to be yielded.
    ///
    /// * `text_len`: character count of the page text
    fn on_page_complete(&self, page_num: usize, total_pages: usize, text_len: usize) {
        let _ = (page_num, total_pages, text_len);
    }

    /// Called once after the last page was yielded.
    fn on_document_complete(&self, total_pages: usize) {
        let _ = total_pages;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ParseProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ParserConfig`].
pub type ProgressCallback = Arc<dyn ParseProgressCallback>;
