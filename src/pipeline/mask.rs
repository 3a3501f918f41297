//! Span masking: tag every character of a page with the region that owns it.
//!
//! The analysis result describes tables and figures as lists of character
//! spans into the document-wide content buffer. [`classify`] projects those
//! spans onto one page and produces one [`ClassificationSlot`] per page
//! character. The page assembler then walks the slots once.
//!
//! Overlaps resolve by application order: tables are written first, then
//! figures, so a character covered by both belongs to the figure. Spans that
//! reach outside the page are clipped silently; the service's offsets are
//! occasionally a little off at page boundaries and that must not fail a
//! document.

use crate::analysis::{DocumentFigure, DocumentPage, DocumentTable, Span};

/// Ownership tag of a single page character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassificationSlot {
    Plain,
    Table(usize),
    Figure(usize),
}

/// The slice of the content buffer that belongs to one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageFrame {
    /// 1-indexed page number as reported by the analysis service.
    pub page_number: usize,
    pub content_offset: usize,
    pub content_length: usize,
}

impl PageFrame {
    /// Frame a page by its first span. A page without spans is empty.
    pub fn from_page(page: &DocumentPage) -> Self {
        let span = page.spans.first().copied().unwrap_or(Span::new(0, 0));
        Self {
            page_number: page.page_number,
            content_offset: span.offset,
            content_length: span.length,
        }
    }

    /// 0-indexed page number used in output records.
    pub fn page_num(&self) -> usize {
        self.page_number.saturating_sub(1)
    }

    fn end(&self) -> usize {
        self.content_offset.saturating_add(self.content_length)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    Table,
    Figure,
}

/// A table or figure on a page, identified by its index among the regions
/// of the same kind on that page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region<'a> {
    pub kind: RegionKind,
    pub index: usize,
    pub spans: &'a [Span],
}

impl<'a> Region<'a> {
    pub fn tables(tables: &[&'a DocumentTable]) -> Vec<Region<'a>> {
        tables
            .iter()
            .enumerate()
            .map(|(index, &t)| Region {
                kind: RegionKind::Table,
                index,
                spans: &t.spans,
            })
            .collect()
    }

    pub fn figures(figures: &[&'a DocumentFigure]) -> Vec<Region<'a>> {
        figures
            .iter()
            .enumerate()
            .map(|(index, &f)| Region {
                kind: RegionKind::Figure,
                index,
                spans: &f.spans,
            })
            .collect()
    }

    fn slot(&self) -> ClassificationSlot {
        match self.kind {
            RegionKind::Table => ClassificationSlot::Table(self.index),
            RegionKind::Figure => ClassificationSlot::Figure(self.index),
        }
    }
}

/// Build the page's classification array.
///
/// Returns exactly `frame.content_length` slots. Table regions are applied
/// first, figure regions second; within a kind, later regions overwrite
/// earlier ones.
pub fn classify(
    frame: &PageFrame,
    table_regions: &[Region<'_>],
    figure_regions: &[Region<'_>],
) -> Vec<ClassificationSlot> {
    let mut slots = vec![ClassificationSlot::Plain; frame.content_length];

    for region in table_regions.iter().chain(figure_regions) {
        let tag = region.slot();
        for span in region.spans {
            let start = span.offset.max(frame.content_offset);
            let end = span.end().min(frame.end());
            for absolute in start..end {
                slots[absolute - frame.content_offset] = tag;
            }
        }
    }

    slots
}
