//! Page assembly: walk the classification slots and splice in region markup.
//!
//! Plain characters are copied from the content buffer; the first slot of
//! each table or figure emits that region's rendered markup and its remaining
//! slots are skipped, so a region split over several spans still appears
//! exactly once, at its first position.
//!
//! Tables render synchronously. Figures need a raster crop and a describer
//! call each, so they run concurrently (up to `figure_concurrency`) before
//! the walk; results are keyed by region and merged in page order. The page
//! is rendered once and every figure is cropped from that render.

use super::figure::render_figure;
use super::mask::{classify, ClassificationSlot, PageFrame, Region};
use super::postprocess::clean_page_text;
use super::render::{PageCache, PageRasterizer};
use super::table::render_table;
use crate::analysis::{DocumentFigure, DocumentTable};
use crate::config::TableMarkup;
use crate::describe::ImageDescriber;
use crate::error::ParseError;
use crate::progress::ProgressCallback;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// What a page assembler needs to turn figures into text.
#[derive(Clone, Copy)]
pub struct FigureRenderer<'a> {
    pub raster: &'a dyn PageRasterizer,
    pub describer: &'a dyn ImageDescriber,
    pub concurrency: usize,
}

/// Builds the text of one page from its slice of the content buffer.
pub struct PageAssembler<'a> {
    pub table_markup: TableMarkup,
    /// `None` when figure descriptions are off; figures must then be empty.
    pub figures: Option<FigureRenderer<'a>>,
    pub progress: Option<&'a ProgressCallback>,
}

impl<'a> PageAssembler<'a> {
    /// Assemble one page.
    ///
    /// `content` is the whole document's content buffer as chars; `tables`
    /// and `figures` are the regions whose first bounding region lies on
    /// this page.
    pub async fn assemble(
        &self,
        frame: &PageFrame,
        content: &[char],
        tables: &[&DocumentTable],
        figures: &[&DocumentFigure],
    ) -> Result<String, ParseError> {
        let slots = classify(frame, &Region::tables(tables), &Region::figures(figures));
        let order = regions_in_order(&slots);

        let mut rendered: HashMap<ClassificationSlot, String> = HashMap::with_capacity(order.len());
        for &slot in &order {
            if let ClassificationSlot::Table(i) = slot {
                rendered.insert(slot, render_table(tables[i], self.table_markup));
            }
        }

        let figure_indices: Vec<usize> = order
            .iter()
            .filter_map(|slot| match slot {
                ClassificationSlot::Figure(i) => Some(*i),
                _ => None,
            })
            .collect();
        for (i, html) in self.render_figures(frame, figures, &figure_indices).await? {
            rendered.insert(ClassificationSlot::Figure(i), html);
        }

        let mut text = String::with_capacity(frame.content_length);
        let mut emitted: HashSet<ClassificationSlot> = HashSet::with_capacity(order.len());
        for (i, slot) in slots.iter().enumerate() {
            match slot {
                ClassificationSlot::Plain => {
                    if let Some(&ch) = content.get(frame.content_offset + i) {
                        text.push(ch);
                    }
                }
                region => {
                    if emitted.insert(*region) {
                        if let Some(html) = rendered.get(region) {
                            text.push_str(html);
                        }
                    }
                }
            }
        }

        debug!(
            "Page {}: {} tables, {} figures, {} chars",
            frame.page_number,
            tables.len(),
            figure_indices.len(),
            text.chars().count()
        );
        Ok(clean_page_text(&text))
    }

    async fn render_figures(
        &self,
        frame: &PageFrame,
        figures: &[&DocumentFigure],
        indices: &[usize],
    ) -> Result<Vec<(usize, String)>, ParseError> {
        if indices.is_empty() {
            return Ok(Vec::new());
        }
        let renderer = self.figures.ok_or_else(|| {
            ParseError::InvalidConfig("figures present but no figure describer configured".into())
        })?;
        let cache = PageCache::new(renderer.raster);
        let raster: &dyn PageRasterizer = &cache;

        stream::iter(indices.iter().copied())
            .map(|i| async move {
                let figure = figures[i];
                let html = render_figure(figure, raster, renderer.describer).await?;
                if let Some(cb) = self.progress {
                    cb.on_figure_described(frame.page_num(), &figure.label());
                }
                Ok::<_, ParseError>((i, html))
            })
            .buffered(renderer.concurrency.max(1))
            .try_collect()
            .await
    }
}

/// Distinct regions in order of first appearance on the page.
fn regions_in_order(slots: &[ClassificationSlot]) -> Vec<ClassificationSlot> {
    let mut seen = HashSet::new();
    slots
        .iter()
        .filter(|s| **s != ClassificationSlot::Plain)
        .filter(|s| seen.insert(**s))
        .copied()
        .collect()
}
