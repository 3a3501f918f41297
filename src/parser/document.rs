//! Analysis-backed parser: reconcile a layout analysis into page text.
//!
//! ```text
//! first poll ──▶ analyze (remote, once)
//!                   │
//!     per page ─────┼─▶ frame ─▶ classify ─▶ assemble ─▶ Page{offset}
//!                   │            (tables, then figures win)
//!                   └─▶ done
//! ```
//!
//! The whole analysis result stays in memory for the life of the stream;
//! only the offset counter and the page raster cross page boundaries.

use super::{PageStream, Parser};
use crate::analysis::{AnalyzeOptions, AnalyzeResult, DocumentAnalyzer};
use crate::config::ParserConfig;
use crate::describe::ImageDescriber;
use crate::error::ParseError;
use crate::output::{OffsetCounter, Page};
use crate::pipeline::assemble::{FigureRenderer, PageAssembler};
use crate::pipeline::input::DocumentSource;
use crate::pipeline::mask::PageFrame;
use crate::pipeline::render::{PageRasterizer, PdfiumRasterizer};
use futures::stream;
use std::sync::Arc;
use tracing::{debug, info};

/// Builds the rasteriser figures are cropped from.
pub type RasterizerFactory =
    Arc<dyn Fn(&DocumentSource) -> Arc<dyn PageRasterizer> + Send + Sync>;

/// Parses documents through a [`DocumentAnalyzer`].
///
/// # Example
/// ```rust,no_run
/// use docintel_pages::{
///     collect_pages, ContentUnderstandingDescriber, Credential, DocumentAnalysisParser,
///     DocumentIntelligenceClient, DocumentSource, Parser, ParserConfig,
/// };
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let key = Credential::ApiKey(std::env::var("AZURE_DI_KEY")?);
/// let analyzer = DocumentIntelligenceClient::new("https://my-di.cognitiveservices.azure.com", key.clone())?;
/// let describer = ContentUnderstandingDescriber::new("https://my-ai.services.ai.azure.com", key)?;
/// describer.create_analyzer().await?;
///
/// let parser = DocumentAnalysisParser::new(Arc::new(analyzer), ParserConfig::default())
///     .with_describer(Arc::new(describer));
///
/// let source = DocumentSource::new("report.pdf", std::fs::read("report.pdf")?);
/// for page in collect_pages(parser.parse(source)).await? {
///     println!("page {} @ {}: {} chars", page.page_num, page.offset, page.char_len());
/// }
/// # Ok(())
/// # }
/// ```
pub struct DocumentAnalysisParser {
    analyzer: Arc<dyn DocumentAnalyzer>,
    describer: Option<Arc<dyn ImageDescriber>>,
    rasterizer: RasterizerFactory,
    config: ParserConfig,
}

impl DocumentAnalysisParser {
    /// Figures are cropped from pdfium renders of the source PDF unless
    /// [`with_rasterizer_factory`](Self::with_rasterizer_factory) says otherwise.
    pub fn new(analyzer: Arc<dyn DocumentAnalyzer>, config: ParserConfig) -> Self {
        let password = config.password.clone();
        let rasterizer: RasterizerFactory = Arc::new(move |source: &DocumentSource| {
            Arc::new(PdfiumRasterizer::new(
                source.name.clone(),
                Arc::clone(&source.bytes),
                password.clone(),
            )) as Arc<dyn PageRasterizer>
        });
        Self {
            analyzer,
            describer: None,
            rasterizer,
            config,
        }
    }

    /// Required when `describe_figures` is on.
    pub fn with_describer(mut self, describer: Arc<dyn ImageDescriber>) -> Self {
        self.describer = Some(describer);
        self
    }

    pub fn with_rasterizer_factory(mut self, factory: RasterizerFactory) -> Self {
        self.rasterizer = factory;
        self
    }
}

impl Parser for DocumentAnalysisParser {
    fn parse(&self, source: DocumentSource) -> PageStream {
        let run = Run {
            analyzer: Arc::clone(&self.analyzer),
            describer: self.describer.clone(),
            rasterizer: Arc::clone(&self.rasterizer),
            config: self.config.clone(),
            source,
            analyzed: None,
            next: 0,
            counter: OffsetCounter::default(),
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

/// Per-document parse state carried between polls.
struct Run {
    analyzer: Arc<dyn DocumentAnalyzer>,
    describer: Option<Arc<dyn ImageDescriber>>,
    rasterizer: RasterizerFactory,
    config: ParserConfig,
    source: DocumentSource,
    analyzed: Option<Analyzed>,
    next: usize,
    counter: OffsetCounter,
}

struct Analyzed {
    result: AnalyzeResult,
    content: Vec<char>,
    raster: Option<Arc<dyn PageRasterizer>>,
}

impl Run {
    async fn analyze(&self) -> Result<Analyzed, ParseError> {
        if self.config.describe_figures && self.describer.is_none() {
            return Err(ParseError::InvalidConfig(
                "describe_figures is on but no figure describer was provided".into(),
            ));
        }

        info!("Starting parse: {}", self.source.name);
        let options = AnalyzeOptions {
            model_id: self.config.model_id.clone(),
            include_figures: self.config.describe_figures,
        };
        let result = self.analyzer.analyze(&self.source.bytes, &options).await?;

        let content = result.content.chars().collect();
        let raster = self
            .config
            .describe_figures
            .then(|| (self.rasterizer)(&self.source));

        if let Some(ref cb) = self.config.progress_callback {
            cb.on_document_start(result.pages.len());
        }

        Ok(Analyzed {
            result,
            content,
            raster,
        })
    }

    async fn next_page(&mut self) -> Result<Option<Page>, ParseError> {
        if self.analyzed.is_none() {
            let analyzed = self.analyze().await?;
            self.analyzed = Some(analyzed);
        }
        let Some(analyzed) = self.analyzed.as_ref() else {
            return Ok(None);
        };

        let total = analyzed.result.pages.len();
        let Some(doc_page) = analyzed.result.pages.get(self.next) else {
            if let Some(ref cb) = self.config.progress_callback {
                cb.on_document_complete(total);
            }
            info!("Parse complete: {} ({} pages)", self.source.name, total);
            return Ok(None);
        };

        let frame = PageFrame::from_page(doc_page);
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_page_start(frame.page_num(), total);
        }

        let tables = analyzed.result.tables_on_page(frame.page_number);
        let figures = if self.config.describe_figures {
            analyzed.result.figures_on_page(frame.page_number)
        } else {
            Vec::new()
        };

        let figure_renderer = match (&analyzed.raster, &self.describer) {
            (Some(raster), Some(describer)) => Some(FigureRenderer {
                raster: raster.as_ref(),
                describer: describer.as_ref(),
                concurrency: self.config.figure_concurrency,
            }),
            _ => None,
        };
        let assembler = PageAssembler {
            table_markup: self.config.table_markup,
            figures: figure_renderer,
            progress: self.config.progress_callback.as_ref(),
        };

        let text = assembler
            .assemble(&frame, &analyzed.content, &tables, &figures)
            .await?;

        let page = self.counter.emit(frame.page_num(), text);
        self.next += 1;

        if let Some(ref cb) = self.config.progress_callback {
            cb.on_page_complete(page.page_num, total, page.char_len());
        }
        debug!(
            "Page {} emitted: offset {}, {} chars",
            page.page_num,
            page.offset,
            page.char_len()
        );
        Ok(Some(page))
    }
}
