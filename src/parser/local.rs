//! Local parser: whole-page text straight from pdfium.
//!
//! No analysis service and no figure descriptions; tables come out as
//! whatever text pdfium extracts for them. Page text is passed through
//! untrimmed.

use super::{PageStream, Parser};
use crate::config::ParserConfig;
use crate::error::ParseError;
use crate::output::{OffsetCounter, Page};
use crate::pipeline::input::DocumentSource;
use crate::pipeline::render::{extract_page_texts, PageText};
use futures::stream::{self, StreamExt};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info};

/// Parses PDFs locally with pdfium.
///
/// Uses `password` and `progress_callback` from its [`ParserConfig`]; the
/// analysis-specific settings are ignored.
pub struct LocalPdfParser {
    config: ParserConfig,
}

impl LocalPdfParser {
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }
}

impl Default for LocalPdfParser {
    fn default() -> Self {
        Self::new(ParserConfig::default())
    }
}

impl Parser for LocalPdfParser {
    fn parse(&self, source: DocumentSource) -> PageStream {
        let run = LocalRun {
            config: self.config.clone(),
            source,
            pages: None,
            counter: OffsetCounter::default(),
            total: 0,
        };

        Box::pin(stream::try_unfold(run, |mut run| async move {
            let page = run.next_page().await?;
            Ok(page.map(|p| (p, run)))
        }))
    }

    fn config(&self) -> &ParserConfig {
        &self.config
    }
}

struct LocalRun {
    config: ParserConfig,
    source: DocumentSource,
    pages: Option<ReceiverStream<Result<PageText, ParseError>>>,
    counter: OffsetCounter,
    total: usize,
}

impl LocalRun {
    async fn next_page(&mut self) -> Result<Option<Page>, ParseError> {
        if self.pages.is_none() {
            self.source.ensure_pdf()?;
            info!("Starting local parse: {}", self.source.name);
            self.pages = Some(extract_page_texts(
                self.source.name.clone(),
                self.source.bytes.clone(),
                self.config.password.clone(),
            ));
        }
        let Some(pages) = self.pages.as_mut() else {
            return Ok(None);
        };

        let Some(extracted) = pages.next().await else {
            if let Some(ref cb) = self.config.progress_callback {
                cb.on_document_complete(self.total);
            }
            info!("Local parse complete: {} ({} pages)", self.source.name, self.total);
            return Ok(None);
        };
        let PageText { index, total, text } = extracted?;

        if let Some(ref cb) = self.config.progress_callback {
            if index == 0 {
                cb.on_document_start(total);
            }
            cb.on_page_start(index, total);
        }
        self.total = total;

        let page = self.counter.emit(index, text);

        if let Some(ref cb) = self.config.progress_callback {
            cb.on_page_complete(page.page_num, total, page.char_len());
        }
        debug!(
            "Page {} extracted: offset {}, {} chars",
            page.page_num,
            page.offset,
            page.char_len()
        );
        Ok(Some(page))
    }
}
