//! Integration tests for the analysis-backed parser.
//!
//! The analysis service, the rasteriser and the figure describer are all
//! replaced by in-memory stubs, so these run without network access or a
//! pdfium library.

use async_trait::async_trait;
use docintel_pages::parser::document::RasterizerFactory;
use docintel_pages::{
    collect_pages, write_pages_json, AnalyzeOptions, AnalyzeResult, DocumentAnalysisParser,
    DocumentAnalyzer, DocumentSource, ImageDescriber, Page, PageRasterizer, ParseError,
    ParseProgressCallback, Parser, ParserConfig, ServiceError, TableMarkup,
};
use futures::StreamExt;
use image::{DynamicImage, Rgba, RgbaImage};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

struct CannedAnalyzer {
    result: Result<AnalyzeResult, u16>,
    calls: AtomicUsize,
    options: Mutex<Option<AnalyzeOptions>>,
}

impl CannedAnalyzer {
    fn new(result: serde_json::Value) -> Arc<Self> {
        Arc::new(Self {
            result: Ok(serde_json::from_value(result).expect("valid analyze result")),
            calls: AtomicUsize::new(0),
            options: Mutex::new(None),
        })
    }

    fn failing(status: u16) -> Arc<Self> {
        Arc::new(Self {
            result: Err(status),
            calls: AtomicUsize::new(0),
            options: Mutex::new(None),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentAnalyzer for CannedAnalyzer {
    async fn analyze(
        &self,
        _document: &[u8],
        options: &AnalyzeOptions,
    ) -> Result<AnalyzeResult, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.options.lock().expect("lock") = Some(options.clone());
        match &self.result {
            Ok(result) => Ok(result.clone()),
            Err(status) => Err(ServiceError::Status {
                status: *status,
                body: "InvalidRequest".into(),
            }),
        }
    }
}

/// Every page is a blank US-letter sheet at 300 DPI.
struct WhitePage;

#[async_trait]
impl PageRasterizer for WhitePage {
    async fn render_page(&self, _page_index: usize, _scale: f32) -> Result<DynamicImage, ParseError> {
        Ok(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            2550,
            3300,
            Rgba([255, 255, 255, 255]),
        )))
    }
}

fn white_pages() -> RasterizerFactory {
    Arc::new(|_source: &DocumentSource| -> Arc<dyn PageRasterizer> { Arc::new(WhitePage) })
}

/// Describes a crop by its pixel width. Crops 300 px wide are slow, so a
/// one-inch figure finishes after any wider figure submitted with it.
#[derive(Default)]
struct WidthDescriber {
    calls: AtomicUsize,
}

#[async_trait]
impl ImageDescriber for WidthDescriber {
    async fn describe(&self, png: &[u8]) -> Result<String, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let img = image::load_from_memory(png).map_err(|e| ServiceError::Decode(e.to_string()))?;
        if img.width() == 300 {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        Ok(format!("{}px", img.width()))
    }
}

fn source() -> DocumentSource {
    DocumentSource::new("sample.pdf", b"%PDF-1.7 stub".to_vec())
}

fn tables_only() -> ParserConfig {
    ParserConfig::builder()
        .describe_figures(false)
        .build()
        .expect("valid config")
}

fn with_figures(describer: Arc<WidthDescriber>, analyzer: Arc<CannedAnalyzer>) -> DocumentAnalysisParser {
    DocumentAnalysisParser::new(analyzer, ParserConfig::default())
        .with_describer(describer)
        .with_rasterizer_factory(white_pages())
}

/// Square figure polygon, `size` inches wide, top-left at (1, 1).
fn square(size: f64) -> Vec<f64> {
    let (x0, y0, x1, y1) = (1.0, 1.0, 1.0 + size, 1.0 + size);
    vec![x0, y0, x1, y0, x1, y1, x0, y1]
}

async fn parse_all(parser: &dyn Parser) -> Result<Vec<Page>, ParseError> {
    collect_pages(parser.parse(source())).await
}

// ── Reconciliation ───────────────────────────────────────────────────────────

#[tokio::test]
async fn hello_world_table_is_rendered_once() {
    init_tracing();
    let analyzer = CannedAnalyzer::new(json!({
        "content": "Hello World",
        "pages": [{ "pageNumber": 1, "spans": [{ "offset": 0, "length": 11 }] }],
        "tables": [{
            "rowCount": 1,
            "columnCount": 2,
            "cells": [
                { "rowIndex": 0, "columnIndex": 0, "content": "Wor" },
                { "rowIndex": 0, "columnIndex": 1, "content": "ld" }
            ],
            "boundingRegions": [{ "pageNumber": 1, "polygon": [0, 0, 1, 0, 1, 1, 0, 1] }],
            "spans": [{ "offset": 6, "length": 5 }]
        }]
    }));
    let parser = DocumentAnalysisParser::new(analyzer, tables_only());

    let pages = parse_all(&parser).await.expect("parse");

    assert_eq!(pages.len(), 1);
    assert_eq!(
        pages[0],
        Page::new(
            0,
            0,
            "Hello <figure><table><tr><td>Wor</td><td>ld</td></tr></table></figure>"
        )
    );
}

#[tokio::test]
async fn bare_table_markup_is_honoured() {
    let analyzer = CannedAnalyzer::new(json!({
        "content": "x T y",
        "pages": [{ "pageNumber": 1, "spans": [{ "offset": 0, "length": 5 }] }],
        "tables": [{
            "rowCount": 1,
            "columnCount": 1,
            "cells": [{ "kind": "columnHeader", "rowIndex": 0, "columnIndex": 0, "content": "a<b" }],
            "boundingRegions": [{ "pageNumber": 1, "polygon": [] }],
            "spans": [{ "offset": 2, "length": 1 }]
        }]
    }));
    let config = ParserConfig::builder()
        .describe_figures(false)
        .table_markup(TableMarkup::Bare)
        .build()
        .expect("valid config");
    let parser = DocumentAnalysisParser::new(analyzer, config);

    let pages = parse_all(&parser).await.expect("parse");
    assert_eq!(pages[0].text, "x <table><tr><th>a&lt;b</th></tr></table> y");
}

#[tokio::test]
async fn offsets_accumulate_emitted_characters() {
    let content = format!("{}{}", "a".repeat(100), "b".repeat(50));
    let analyzer = CannedAnalyzer::new(json!({
        "content": content,
        "pages": [
            { "pageNumber": 1, "spans": [{ "offset": 0, "length": 100 }] },
            { "pageNumber": 2, "spans": [{ "offset": 100, "length": 50 }] }
        ]
    }));
    let parser = DocumentAnalysisParser::new(analyzer, tables_only());

    let pages = parse_all(&parser).await.expect("parse");

    assert_eq!(pages.len(), 2);
    assert_eq!((pages[0].page_num, pages[0].offset), (0, 0));
    assert_eq!((pages[1].page_num, pages[1].offset), (1, 100));
    for pair in pages.windows(2) {
        assert_eq!(pair[1].offset, pair[0].offset + pair[0].text.chars().count());
    }
}

#[tokio::test]
async fn offsets_count_inserted_markup() {
    let analyzer = CannedAnalyzer::new(json!({
        "content": "ab|cd",
        "pages": [
            { "pageNumber": 1, "spans": [{ "offset": 0, "length": 2 }] },
            { "pageNumber": 2, "spans": [{ "offset": 3, "length": 2 }] }
        ],
        "tables": [{
            "rowCount": 1,
            "columnCount": 1,
            "cells": [{ "rowIndex": 0, "columnIndex": 0, "content": "é" }],
            "boundingRegions": [{ "pageNumber": 1, "polygon": [] }],
            "spans": [{ "offset": 1, "length": 1 }]
        }]
    }));
    let parser = DocumentAnalysisParser::new(analyzer, tables_only());

    let pages = parse_all(&parser).await.expect("parse");

    let first = "a<figure><table><tr><td>é</td></tr></table></figure>";
    assert_eq!(pages[0].text, first);
    assert_eq!(pages[1].offset, first.chars().count());
    assert_eq!(pages[1].text, "cd");
}

#[tokio::test]
async fn page_without_regions_is_trimmed_slice() {
    let analyzer = CannedAnalyzer::new(json!({
        "content": "  \n Plain words here.\t \nNext",
        "pages": [
            { "pageNumber": 1, "spans": [{ "offset": 0, "length": 24 }] },
            { "pageNumber": 2, "spans": [{ "offset": 24, "length": 4 }] }
        ]
    }));
    let parser = DocumentAnalysisParser::new(analyzer, tables_only());

    let pages = parse_all(&parser).await.expect("parse");
    assert_eq!(pages[0].text, "Plain words here.");
    assert_eq!(pages[1].text, "Next");
}

#[tokio::test]
async fn page_break_markers_are_stripped() {
    let content = "First page.\n<!-- PageBreak -->\nSecond page.";
    let first_len = "First page.\n<!-- PageBreak -->\n".chars().count();
    let analyzer = CannedAnalyzer::new(json!({
        "content": content,
        "pages": [
            { "pageNumber": 1, "spans": [{ "offset": 0, "length": first_len }] },
            { "pageNumber": 2, "spans": [{ "offset": first_len, "length": 12 }] }
        ]
    }));
    let parser = DocumentAnalysisParser::new(analyzer, tables_only());

    let pages = parse_all(&parser).await.expect("parse");
    assert_eq!(pages[0].text, "First page.");
    assert_eq!(pages[1].text, "Second page.");
    assert!(pages.iter().all(|p| !p.text.contains("PageBreak")));
}

#[tokio::test]
async fn page_without_spans_is_empty() {
    let analyzer = CannedAnalyzer::new(json!({
        "content": "only page two",
        "pages": [
            { "pageNumber": 1, "spans": [] },
            { "pageNumber": 2, "spans": [{ "offset": 0, "length": 13 }] }
        ]
    }));
    let parser = DocumentAnalysisParser::new(analyzer, tables_only());

    let pages = parse_all(&parser).await.expect("parse");
    assert_eq!(pages[0], Page::new(0, 0, ""));
    assert_eq!(pages[1], Page::new(1, 0, "only page two"));
}

#[tokio::test]
async fn tables_are_assigned_by_first_bounding_region() {
    let analyzer = CannedAnalyzer::new(json!({
        "content": "abcd",
        "pages": [
            { "pageNumber": 1, "spans": [{ "offset": 0, "length": 2 }] },
            { "pageNumber": 2, "spans": [{ "offset": 2, "length": 2 }] }
        ],
        "tables": [{
            "rowCount": 1,
            "columnCount": 1,
            "cells": [{ "rowIndex": 0, "columnIndex": 0, "content": "T" }],
            "boundingRegions": [
                { "pageNumber": 2, "polygon": [] },
                { "pageNumber": 1, "polygon": [] }
            ],
            "spans": [{ "offset": 1, "length": 2 }]
        }]
    }));
    let parser = DocumentAnalysisParser::new(analyzer, tables_only());

    let pages = parse_all(&parser).await.expect("parse");
    assert_eq!(pages[0].text, "ab");
    assert_eq!(
        pages[1].text,
        "<figure><table><tr><td>T</td></tr></table></figure>d"
    );
}

// ── Figures ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn figure_wins_overlap_with_table() {
    let analyzer = CannedAnalyzer::new(json!({
        "content": "0123456789",
        "pages": [{ "pageNumber": 1, "spans": [{ "offset": 0, "length": 10 }] }],
        "tables": [{
            "rowCount": 1,
            "columnCount": 1,
            "cells": [{ "rowIndex": 0, "columnIndex": 0, "content": "t" }],
            "boundingRegions": [{ "pageNumber": 1, "polygon": [] }],
            "spans": [{ "offset": 2, "length": 6 }]
        }],
        "figures": [{
            "id": "1.1",
            "boundingRegions": [{ "pageNumber": 1, "polygon": square(2.0) }],
            "spans": [{ "offset": 2, "length": 6 }],
            "caption": { "content": "Figure 1: " }
        }]
    }));
    let describer = Arc::new(WidthDescriber::default());
    let parser = with_figures(describer.clone(), analyzer);

    let pages = parse_all(&parser).await.expect("parse");

    assert_eq!(
        pages[0].text,
        "01<figure><figcaption>Figure 1: 600px</figcaption></figure>89"
    );
    assert!(!pages[0].text.contains("<table>"));
    assert_eq!(describer.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn figure_over_disjoint_spans_is_described_once() {
    let analyzer = CannedAnalyzer::new(json!({
        "content": "A fig B fig C",
        "pages": [{ "pageNumber": 1, "spans": [{ "offset": 0, "length": 13 }] }],
        "figures": [{
            "id": "1.1",
            "boundingRegions": [{ "pageNumber": 1, "polygon": square(2.0) }],
            "spans": [{ "offset": 2, "length": 3 }, { "offset": 8, "length": 3 }]
        }]
    }));
    let describer = Arc::new(WidthDescriber::default());
    let parser = with_figures(describer.clone(), analyzer);

    let pages = parse_all(&parser).await.expect("parse");

    assert_eq!(
        pages[0].text,
        "A <figure><figcaption>600px</figcaption></figure> B  C"
    );
    assert_eq!(pages[0].text.matches("<figure>").count(), 1);
    assert_eq!(describer.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn concurrent_descriptions_merge_in_page_order() {
    // The first figure is the slow one-inch crop; it must still come first.
    let analyzer = CannedAnalyzer::new(json!({
        "content": "[a] [b] [c]",
        "pages": [{ "pageNumber": 1, "spans": [{ "offset": 0, "length": 11 }] }],
        "figures": [
            {
                "id": "1.1",
                "boundingRegions": [{ "pageNumber": 1, "polygon": square(1.0) }],
                "spans": [{ "offset": 0, "length": 3 }]
            },
            {
                "id": "1.2",
                "boundingRegions": [{ "pageNumber": 1, "polygon": square(2.0) }],
                "spans": [{ "offset": 4, "length": 3 }]
            },
            {
                "id": "1.3",
                "boundingRegions": [{ "pageNumber": 1, "polygon": square(3.0) }],
                "spans": [{ "offset": 8, "length": 3 }]
            }
        ]
    }));
    let describer = Arc::new(WidthDescriber::default());
    let parser = with_figures(describer.clone(), analyzer);

    let pages = parse_all(&parser).await.expect("parse");

    assert_eq!(
        pages[0].text,
        "<figure><figcaption>300px</figcaption></figure> \
<figure><figcaption>600px</figcaption></figure> \
<figure><figcaption>900px</figcaption></figure>"
    );
    assert_eq!(describer.calls.load(Ordering::SeqCst), 3);
}

#[derive(Default)]
struct CountingPages {
    renders: Mutex<Vec<usize>>,
}

#[async_trait]
impl PageRasterizer for CountingPages {
    async fn render_page(&self, page_index: usize, scale: f32) -> Result<DynamicImage, ParseError> {
        self.renders.lock().expect("lock").push(page_index);
        WhitePage.render_page(page_index, scale).await
    }
}

#[tokio::test]
async fn each_page_is_rendered_once_for_all_its_figures() {
    let analyzer = CannedAnalyzer::new(json!({
        "content": "[a] [b] [c]",
        "pages": [
            { "pageNumber": 1, "spans": [{ "offset": 0, "length": 7 }] },
            { "pageNumber": 2, "spans": [{ "offset": 8, "length": 3 }] }
        ],
        "figures": [
            {
                "id": "1.1",
                "boundingRegions": [{ "pageNumber": 1, "polygon": square(1.0) }],
                "spans": [{ "offset": 0, "length": 3 }]
            },
            {
                "id": "1.2",
                "boundingRegions": [{ "pageNumber": 1, "polygon": square(2.0) }],
                "spans": [{ "offset": 4, "length": 3 }]
            },
            {
                "id": "2.1",
                "boundingRegions": [{ "pageNumber": 2, "polygon": square(3.0) }],
                "spans": [{ "offset": 8, "length": 3 }]
            }
        ]
    }));
    let pages_rendered = Arc::new(CountingPages::default());
    let raster = Arc::clone(&pages_rendered);
    let factory: RasterizerFactory =
        Arc::new(move |_source: &DocumentSource| -> Arc<dyn PageRasterizer> { raster.clone() });
    let describer = Arc::new(WidthDescriber::default());
    let parser = DocumentAnalysisParser::new(analyzer, ParserConfig::default())
        .with_describer(describer.clone())
        .with_rasterizer_factory(factory);

    let pages = parse_all(&parser).await.expect("parse");

    assert_eq!(pages.len(), 2);
    assert_eq!(describer.calls.load(Ordering::SeqCst), 3);
    assert_eq!(*pages_rendered.renders.lock().expect("lock"), vec![0, 1]);
}

#[tokio::test]
async fn degenerate_figure_ends_the_stream_after_earlier_pages() {
    let analyzer = CannedAnalyzer::new(json!({
        "content": "page one|fig",
        "pages": [
            { "pageNumber": 1, "spans": [{ "offset": 0, "length": 8 }] },
            { "pageNumber": 2, "spans": [{ "offset": 9, "length": 3 }] }
        ],
        "figures": [{
            "id": "2.1",
            "boundingRegions": [{ "pageNumber": 2, "polygon": [1, 1, 1, 1, 1, 2, 1, 2] }],
            "spans": [{ "offset": 9, "length": 3 }]
        }]
    }));
    let parser = with_figures(Arc::new(WidthDescriber::default()), analyzer);

    let mut stream = parser.parse(source());

    let first = stream.next().await.expect("first item").expect("first page");
    assert_eq!(first.text, "page one");

    match stream.next().await {
        Some(Err(ParseError::DegenerateFigureRegion { figure, page, .. })) => {
            assert_eq!(figure, "2.1");
            assert_eq!(page, 2);
        }
        other => panic!("expected degenerate figure error, got {other:?}"),
    }
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn figures_are_ignored_when_descriptions_are_off() {
    let analyzer = CannedAnalyzer::new(json!({
        "content": "see figure",
        "pages": [{ "pageNumber": 1, "spans": [{ "offset": 0, "length": 10 }] }],
        "figures": [{
            "id": "1.1",
            "boundingRegions": [{ "pageNumber": 1, "polygon": square(1.0) }],
            "spans": [{ "offset": 4, "length": 6 }]
        }]
    }));
    let parser = DocumentAnalysisParser::new(analyzer.clone(), tables_only());

    let pages = parse_all(&parser).await.expect("parse");

    assert_eq!(pages[0].text, "see figure");
    let options = analyzer.options.lock().expect("lock").clone().expect("options");
    assert!(!options.include_figures);
    assert_eq!(options.model_id, "prebuilt-layout");
}

#[tokio::test]
async fn describing_figures_without_describer_is_a_config_error() {
    let analyzer = CannedAnalyzer::new(json!({ "content": "", "pages": [] }));
    let parser = DocumentAnalysisParser::new(analyzer.clone(), ParserConfig::default());

    let err = parse_all(&parser).await.unwrap_err();
    assert!(matches!(err, ParseError::InvalidConfig(_)));
    assert_eq!(analyzer.calls(), 0);
}

// ── Laziness and failure ─────────────────────────────────────────────────────

#[tokio::test]
async fn analysis_happens_on_first_poll() {
    let analyzer = CannedAnalyzer::new(json!({
        "content": "x",
        "pages": [{ "pageNumber": 1, "spans": [{ "offset": 0, "length": 1 }] }]
    }));
    let parser = DocumentAnalysisParser::new(analyzer.clone(), tables_only());

    let mut stream = parser.parse(source());
    assert_eq!(analyzer.calls(), 0);

    stream.next().await.expect("item").expect("page");
    assert_eq!(analyzer.calls(), 1);
    assert!(stream.next().await.is_none());
    assert_eq!(analyzer.calls(), 1);
}

#[tokio::test]
async fn dropping_the_stream_stops_further_descriptions() {
    let analyzer = CannedAnalyzer::new(json!({
        "content": "AAAABBBB",
        "pages": [
            { "pageNumber": 1, "spans": [{ "offset": 0, "length": 4 }] },
            { "pageNumber": 2, "spans": [{ "offset": 4, "length": 4 }] }
        ],
        "figures": [
            {
                "id": "1.1",
                "boundingRegions": [{ "pageNumber": 1, "polygon": square(2.0) }],
                "spans": [{ "offset": 0, "length": 4 }]
            },
            {
                "id": "2.1",
                "boundingRegions": [{ "pageNumber": 2, "polygon": square(2.0) }],
                "spans": [{ "offset": 4, "length": 4 }]
            }
        ]
    }));
    let describer = Arc::new(WidthDescriber::default());
    let parser = with_figures(describer.clone(), analyzer);

    let mut stream = parser.parse(source());
    stream.next().await.expect("item").expect("page");
    drop(stream);

    assert_eq!(describer.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn analysis_failure_is_reported_as_analysis_error() {
    let analyzer = CannedAnalyzer::failing(400);
    let parser = DocumentAnalysisParser::new(analyzer, tables_only());

    match parse_all(&parser).await {
        Err(ParseError::Analysis(ServiceError::Status { status, .. })) => assert_eq!(status, 400),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn stream_is_usable_from_a_blocking_caller() {
    let analyzer = CannedAnalyzer::new(json!({
        "content": "sync",
        "pages": [{ "pageNumber": 1, "spans": [{ "offset": 0, "length": 4 }] }]
    }));
    let parser = DocumentAnalysisParser::new(analyzer, tables_only());

    let pages = tokio_test::block_on(parse_all(&parser)).expect("parse");
    assert_eq!(pages, vec![Page::new(0, 0, "sync")]);
}

// ── Progress and export ──────────────────────────────────────────────────────

#[derive(Default)]
struct EventLog {
    events: Mutex<Vec<String>>,
}

impl EventLog {
    fn push(&self, event: String) {
        self.events.lock().expect("lock").push(event);
    }
}

impl ParseProgressCallback for EventLog {
    fn on_document_start(&self, total_pages: usize) {
        self.push(format!("start {total_pages}"));
    }

    fn on_page_start(&self, page_num: usize, _total_pages: usize) {
        self.push(format!("page {page_num}"));
    }

    fn on_figure_described(&self, page_num: usize, figure_id: &str) {
        self.push(format!("figure {page_num} {figure_id}"));
    }

    fn on_page_complete(&self, page_num: usize, _total_pages: usize, text_len: usize) {
        self.push(format!("done {page_num} {text_len}"));
    }

    fn on_document_complete(&self, total_pages: usize) {
        self.push(format!("complete {total_pages}"));
    }
}

#[tokio::test]
async fn progress_events_follow_the_parse() {
    let analyzer = CannedAnalyzer::new(json!({
        "content": "ab",
        "pages": [
            { "pageNumber": 1, "spans": [{ "offset": 0, "length": 1 }] },
            { "pageNumber": 2, "spans": [{ "offset": 1, "length": 1 }] }
        ],
        "figures": [{
            "id": "2.1",
            "boundingRegions": [{ "pageNumber": 2, "polygon": square(1.0) }],
            "spans": [{ "offset": 1, "length": 1 }]
        }]
    }));
    let log = Arc::new(EventLog::default());
    let config = ParserConfig::builder()
        .progress_callback(log.clone())
        .build()
        .expect("valid config");
    let parser = DocumentAnalysisParser::new(analyzer, config)
        .with_describer(Arc::new(WidthDescriber::default()))
        .with_rasterizer_factory(white_pages());

    let pages = parse_all(&parser).await.expect("parse");
    let figure_len = pages[1].text.chars().count();

    assert_eq!(
        *log.events.lock().expect("lock"),
        vec![
            "start 2".to_string(),
            "page 0".to_string(),
            "done 0 1".to_string(),
            "page 1".to_string(),
            "figure 1 2.1".to_string(),
            format!("done 1 {figure_len}"),
            "complete 2".to_string(),
        ]
    );
}

#[tokio::test]
async fn parsed_pages_export_as_json() {
    let analyzer = CannedAnalyzer::new(json!({
        "content": "one two",
        "pages": [
            { "pageNumber": 1, "spans": [{ "offset": 0, "length": 3 }] },
            { "pageNumber": 2, "spans": [{ "offset": 4, "length": 3 }] }
        ]
    }));
    let parser = DocumentAnalysisParser::new(analyzer, tables_only());
    let pages = parse_all(&parser).await.expect("parse");

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("pages.json");
    write_pages_json(&pages, &path).await.expect("write");

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).expect("read")).expect("json");
    assert_eq!(
        value,
        json!([
            { "page_num": 0, "offset": 0, "text": "one" },
            { "page_num": 1, "offset": 3, "text": "two" }
        ])
    );
}
