//! PDF rasterisation and local text extraction via pdfium.
//!
//! pdfium is not async-safe, so every call runs inside
//! `tokio::task::spawn_blocking` and opens its own document handle from the
//! shared, read-only PDF bytes. Nothing pdfium-owned ever crosses an await.
//!
//! Figure cropping only needs [`PageRasterizer`]; [`PdfiumRasterizer`] is the
//! production implementation and tests plug in in-memory images.

use crate::error::ParseError;
use async_trait::async_trait;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info};

/// Renders whole pages of the source document to images.
#[async_trait]
pub trait PageRasterizer: Send + Sync {
    /// Render the 0-indexed page at `scale` × its size in points.
    async fn render_page(&self, page_index: usize, scale: f32) -> Result<DynamicImage, ParseError>;
}

/// Bind to the pdfium shared library.
///
/// `PDFIUM_LIB_PATH` names a library file to load; otherwise the platform
/// library in the working directory is tried, then the system library.
pub fn bind_pdfium() -> Result<Pdfium, ParseError> {
    let bindings = match std::env::var("PDFIUM_LIB_PATH") {
        Ok(path) if !path.is_empty() => Pdfium::bind_to_library(&path),
        _ => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| ParseError::PdfiumBindingFailed(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}

/// Map a pdfium load failure onto the matching input error.
fn load_error(name: &str, password: Option<&str>, e: PdfiumError) -> ParseError {
    let err_str = format!("{:?}", e);
    if err_str.contains("Password") || err_str.contains("password") {
        if password.is_some() {
            ParseError::WrongPassword {
                name: name.to_string(),
            }
        } else {
            ParseError::PasswordRequired {
                name: name.to_string(),
            }
        }
    } else {
        ParseError::CorruptPdf {
            name: name.to_string(),
            detail: err_str,
        }
    }
}

/// Rasteriser backed by pdfium over an in-memory PDF.
#[derive(Clone)]
pub struct PdfiumRasterizer {
    name: String,
    bytes: Arc<[u8]>,
    password: Option<String>,
}

impl PdfiumRasterizer {
    pub fn new(name: impl Into<String>, bytes: Arc<[u8]>, password: Option<String>) -> Self {
        Self {
            name: name.into(),
            bytes,
            password,
        }
    }
}

#[async_trait]
impl PageRasterizer for PdfiumRasterizer {
    async fn render_page(&self, page_index: usize, scale: f32) -> Result<DynamicImage, ParseError> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || {
            render_page_blocking(
                &this.name,
                &this.bytes,
                this.password.as_deref(),
                page_index,
                scale,
            )
        })
        .await
        .map_err(|e| ParseError::Internal(format!("Render task panicked: {}", e)))?
    }
}

fn render_page_blocking(
    name: &str,
    bytes: &[u8],
    password: Option<&str>,
    page_index: usize,
    scale: f32,
) -> Result<DynamicImage, ParseError> {
    let pdfium = bind_pdfium()?;
    let document = pdfium
        .load_pdf_from_byte_slice(bytes, password)
        .map_err(|e| load_error(name, password, e))?;

    let pages = document.pages();
    let total = pages.len() as usize;
    if page_index >= total {
        return Err(ParseError::PageOutOfRange {
            page: page_index + 1,
            total,
        });
    }

    let page = pages
        .get(page_index as u16)
        .map_err(|e| ParseError::RasterisationFailed {
            page: page_index + 1,
            detail: format!("{:?}", e),
        })?;

    let render_config = PdfRenderConfig::new().scale_page_by_factor(scale);
    let bitmap =
        page.render_with_config(&render_config)
            .map_err(|e| ParseError::RasterisationFailed {
                page: page_index + 1,
                detail: format!("{:?}", e),
            })?;

    let image = bitmap.as_image();
    debug!(
        "Rendered page {} → {}x{} px",
        page_index + 1,
        image.width(),
        image.height()
    );
    Ok(image)
}

/// Renders each page at most once and hands out copies.
///
/// Figures on the same page are cropped from one render. Concurrent callers
/// asking for the same page wait for the first render instead of starting
/// their own.
pub struct PageCache<'a> {
    inner: &'a dyn PageRasterizer,
    pages: Mutex<HashMap<(usize, u32), Arc<DynamicImage>>>,
}

impl<'a> PageCache<'a> {
    pub fn new(inner: &'a dyn PageRasterizer) -> Self {
        Self {
            inner,
            pages: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl<'a> PageRasterizer for PageCache<'a> {
    async fn render_page(&self, page_index: usize, scale: f32) -> Result<DynamicImage, ParseError> {
        let key = (page_index, scale.to_bits());
        let mut pages = self.pages.lock().await;
        if let Some(image) = pages.get(&key) {
            return Ok(image.as_ref().clone());
        }
        let image = Arc::new(self.inner.render_page(page_index, scale).await?);
        pages.insert(key, Arc::clone(&image));
        Ok(image.as_ref().clone())
    }
}

/// Full text of one page, as extracted by pdfium.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    /// 0-indexed page number.
    pub index: usize,
    /// Page count of the document.
    pub total: usize,
    pub text: String,
}

/// Stream each page's full text, in page order.
///
/// Extraction runs on a blocking thread that hands pages over a channel of
/// capacity one, so at most one page is extracted ahead of the consumer.
/// Dropping the stream stops extraction at the next page.
pub fn extract_page_texts(
    name: impl Into<String>,
    bytes: Arc<[u8]>,
    password: Option<String>,
) -> ReceiverStream<Result<PageText, ParseError>> {
    let (tx, rx) = mpsc::channel(1);
    let name = name.into();

    tokio::task::spawn_blocking(move || {
        if let Err(e) = extract_blocking(&name, &bytes, password.as_deref(), &tx) {
            // The consumer may already be gone; nothing else to report to.
            let _ = tx.blocking_send(Err(e));
        }
    });

    ReceiverStream::new(rx)
}

fn extract_blocking(
    name: &str,
    bytes: &[u8],
    password: Option<&str>,
    tx: &mpsc::Sender<Result<PageText, ParseError>>,
) -> Result<(), ParseError> {
    let pdfium = bind_pdfium()?;
    let document = pdfium
        .load_pdf_from_byte_slice(bytes, password)
        .map_err(|e| load_error(name, password, e))?;

    let pages = document.pages();
    let total = pages.len() as usize;
    info!("PDF loaded: {} pages", total);

    for (idx, page) in pages.iter().enumerate() {
        let text = page
            .text()
            .map_err(|e| ParseError::CorruptPdf {
                name: name.to_string(),
                detail: format!("text extraction failed on page {}: {:?}", idx + 1, e),
            })?
            .all();

        if tx
            .blocking_send(Ok(PageText {
                index: idx,
                total,
                text,
            }))
            .is_err()
        {
            debug!("Consumer dropped after page {}; stopping extraction", idx + 1);
            break;
        }
    }

    Ok(())
}
