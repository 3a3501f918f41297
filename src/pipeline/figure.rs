//! Figure rendering: crop the figure out of its page and describe it.
//!
//! Bounding polygons are in inches on the page (8 values, four corners
//! clockwise from top-left). Pages are rendered at [`RENDER_SCALE`], i.e.
//! 300 DPI from pdfium's 72-points-per-inch space, so one inch is 300 px.

use super::encode::encode_png;
use super::render::PageRasterizer;
use crate::analysis::DocumentFigure;
use crate::describe::ImageDescriber;
use crate::error::ParseError;
use tracing::debug;

/// Render scale applied to pages before cropping figures.
pub const RENDER_SCALE: f32 = 300.0 / 72.0;

const POINTS_PER_INCH: f64 = 72.0;

/// Axis-aligned figure box in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl BoundingBox {
    /// Top-left is `polygon[0..2]`, bottom-right is `polygon[4..6]`.
    pub fn from_polygon(polygon: &[f64]) -> Option<Self> {
        if polygon.len() < 6 {
            return None;
        }
        Some(Self {
            x0: polygon[0],
            y0: polygon[1],
            x1: polygon[4],
            y1: polygon[5],
        })
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// Pixel rectangle `(x, y, w, h)` on a page rendered at `scale`, clipped to
    /// the `img_w` × `img_h` raster. `None` when nothing is left after clipping.
    pub fn pixel_rect(&self, scale: f32, img_w: u32, img_h: u32) -> Option<(u32, u32, u32, u32)> {
        let px = POINTS_PER_INCH * scale as f64;
        let clamp_x = |v: f64| v.clamp(0.0, img_w as f64);
        let clamp_y = |v: f64| v.clamp(0.0, img_h as f64);

        let left = clamp_x((self.x0 * px).round()) as u32;
        let top = clamp_y((self.y0 * px).round()) as u32;
        let right = clamp_x((self.x1 * px).round()) as u32;
        let bottom = clamp_y((self.y1 * px).round()) as u32;

        if right <= left || bottom <= top {
            return None;
        }
        Some((left, top, right - left, bottom - top))
    }
}

/// Crop a figure out of its page and PNG-encode it.
///
/// `page_number` is 1-indexed. Every failure here is fatal for the document.
pub async fn crop_figure(
    raster: &dyn PageRasterizer,
    figure: &str,
    page_number: usize,
    bbox: &BoundingBox,
) -> Result<Vec<u8>, ParseError> {
    if bbox.width() <= 0.0 || bbox.height() <= 0.0 {
        return Err(ParseError::DegenerateFigureRegion {
            figure: figure.to_string(),
            page: page_number,
            detail: format!("{:.3}x{:.3} in", bbox.width(), bbox.height()),
        });
    }

    let page_index = page_number
        .checked_sub(1)
        .ok_or_else(|| ParseError::MissingBoundingRegion {
            figure: figure.to_string(),
        })?;

    let page = raster.render_page(page_index, RENDER_SCALE).await?;
    if page.width() == 0 || page.height() == 0 {
        return Err(ParseError::RasterisationFailed {
            page: page_number,
            detail: "rendered page has zero size".to_string(),
        });
    }

    let (x, y, w, h) = bbox
        .pixel_rect(RENDER_SCALE, page.width(), page.height())
        .ok_or_else(|| ParseError::DegenerateFigureRegion {
            figure: figure.to_string(),
            page: page_number,
            detail: format!(
                "box lies outside the {}x{} px page",
                page.width(),
                page.height()
            ),
        })?;

    debug!("Figure {}: cropping {}x{}+{}+{} px", figure, w, h, x, y);
    let cropped = page.crop_imm(x, y, w, h);

    encode_png(&cropped).map_err(|e| ParseError::ImageEncodeFailed {
        figure: figure.to_string(),
        detail: e.to_string(),
    })
}

/// Crop, describe and wrap one figure.
///
/// Produces `<figure><figcaption>{title}{description}</figcaption></figure>`
/// where `title` is the figure's caption, or empty.
pub async fn render_figure(
    figure: &DocumentFigure,
    raster: &dyn PageRasterizer,
    describer: &dyn ImageDescriber,
) -> Result<String, ParseError> {
    let label = figure.label();
    let region = figure
        .bounding_regions
        .first()
        .ok_or_else(|| ParseError::MissingBoundingRegion {
            figure: label.clone(),
        })?;
    let bbox = BoundingBox::from_polygon(&region.polygon).ok_or_else(|| {
        ParseError::MissingBoundingRegion {
            figure: label.clone(),
        }
    })?;

    let png = crop_figure(raster, &label, region.page_number, &bbox).await?;

    let description = describer
        .describe(&png)
        .await
        .map_err(|source| ParseError::Describe {
            figure: label.clone(),
            source,
        })?;

    Ok(format!(
        "<figure><figcaption>{}{}</figcaption></figure>",
        figure.title(),
        description
    ))
}
