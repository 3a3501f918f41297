//! Document analysis result types.
//!
//! These mirror the `analyzeResult` JSON returned by the layout model, in
//! camelCase, so a service response deserialises straight into
//! [`AnalyzeResult`]. Only the fields the reconciliation engine reads are
//! modelled; unknown fields are ignored.
//!
//! All offsets and lengths are in Unicode scalar values (`char`s). The client
//! asks the service for `stringIndexType=unicodeCodePoint` so that this holds
//! for real responses too.

use serde::{Deserialize, Serialize};

/// A contiguous range of the document's content buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub offset: usize,
    pub length: usize,
}

impl Span {
    pub fn new(offset: usize, length: usize) -> Self {
        Self { offset, length }
    }

    /// Exclusive end offset, saturating for offsets near `usize::MAX`.
    pub fn end(&self) -> usize {
        self.offset.saturating_add(self.length)
    }
}

/// Where on a page a table or figure sits.
///
/// `polygon` holds four corner points as eight numbers
/// (`x0,y0, x1,y1, x2,y2, x3,y3`) clockwise from top-left, in inches for
/// PDF input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingRegion {
    /// 1-indexed page number.
    pub page_number: usize,
    #[serde(default)]
    pub polygon: Vec<f64>,
}

/// One page of the analysed document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPage {
    /// 1-indexed page number.
    pub page_number: usize,
    #[serde(default)]
    pub spans: Vec<Span>,
}

/// Role of a table cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CellKind {
    #[default]
    Content,
    RowHeader,
    ColumnHeader,
    StubHead,
    Description,
    #[serde(other)]
    Unknown,
}

impl CellKind {
    /// Header cells render as `<th>`.
    pub fn is_header(self) -> bool {
        matches!(self, CellKind::RowHeader | CellKind::ColumnHeader)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCell {
    #[serde(default)]
    pub kind: CellKind,
    pub row_index: usize,
    pub column_index: usize,
    #[serde(default)]
    pub row_span: Option<usize>,
    #[serde(default)]
    pub column_span: Option<usize>,
    #[serde(default)]
    pub content: String,
}

impl TableCell {
    /// A plain content cell spanning one row and one column.
    pub fn new(row_index: usize, column_index: usize, content: impl Into<String>) -> Self {
        Self {
            kind: CellKind::Content,
            row_index,
            column_index,
            row_span: None,
            column_span: None,
            content: content.into(),
        }
    }

    pub fn with_kind(mut self, kind: CellKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_spans(mut self, row_span: usize, column_span: usize) -> Self {
        self.row_span = Some(row_span);
        self.column_span = Some(column_span);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentTable {
    pub row_count: usize,
    pub column_count: usize,
    #[serde(default)]
    pub cells: Vec<TableCell>,
    #[serde(default)]
    pub bounding_regions: Vec<BoundingRegion>,
    #[serde(default)]
    pub spans: Vec<Span>,
}

impl DocumentTable {
    /// 1-indexed page of the first bounding region, if any.
    pub fn page_number(&self) -> Option<usize> {
        self.bounding_regions.first().map(|r| r.page_number)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caption {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentFigure {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub spans: Vec<Span>,
    #[serde(default)]
    pub bounding_regions: Vec<BoundingRegion>,
    #[serde(default)]
    pub caption: Option<Caption>,
}

impl DocumentFigure {
    pub fn page_number(&self) -> Option<usize> {
        self.bounding_regions.first().map(|r| r.page_number)
    }

    /// Caption text, or the empty string.
    pub fn title(&self) -> &str {
        self.caption.as_ref().map(|c| c.content.as_str()).unwrap_or("")
    }

    /// Identifier used in logs and errors.
    pub fn label(&self) -> String {
        self.id.clone().unwrap_or_else(|| "<unnamed>".to_string())
    }
}

/// The full result of analysing one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResult {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub pages: Vec<DocumentPage>,
    #[serde(default)]
    pub tables: Vec<DocumentTable>,
    #[serde(default)]
    pub figures: Vec<DocumentFigure>,
}

impl AnalyzeResult {
    /// Tables whose first bounding region is on `page_number`, in discovery order.
    pub fn tables_on_page(&self, page_number: usize) -> Vec<&DocumentTable> {
        self.tables
            .iter()
            .filter(|t| t.page_number() == Some(page_number))
            .collect()
    }

    /// Figures whose first bounding region is on `page_number`, in discovery order.
    pub fn figures_on_page(&self, page_number: usize) -> Vec<&DocumentFigure> {
        self.figures
            .iter()
            .filter(|f| f.page_number() == Some(page_number))
            .collect()
    }
}
