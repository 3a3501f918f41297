//! Error types for the docintel-pages library.
//!
//! Two error types reflect two layers:
//!
//! * [`ParseError`]: **fatal** for a document. Every public parse entry
//!   point returns it, and a page stream that yields it ends immediately
//!   afterwards. Pages already yielded stay valid.
//!
//! * [`ServiceError`]: a failure talking to one of the remote services
//!   (document analysis, image description). The service clients return it;
//!   the parser wraps it into [`ParseError::Analysis`] or
//!   [`ParseError::Describe`] so callers can tell which collaborator failed.
//!
//! Malformed spans are deliberately *not* an error: offsets that fall outside
//! a page are clamped away by the span masker.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the docintel-pages library.
#[derive(Debug, Error)]
pub enum ParseError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Document not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'")]
    DownloadTimeout { url: String, secs: u64 },

    /// The local parser was handed something that is not a PDF.
    #[error("Document '{name}' is not a valid PDF\nFirst bytes: {magic:?}")]
    NotAPdf { name: String, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{name}' is corrupt: {detail}")]
    CorruptPdf { name: String, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{name}' is encrypted and requires a password.")]
    PasswordRequired { name: String },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{name}'")]
    WrongPassword { name: String },

    /// A figure or page referenced a page the document does not have.
    #[error("Page {page} is out of range (document has {total} pages)")]
    PageOutOfRange { page: usize, total: usize },

    /// pdfium-render returned an error for a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium or install pdfium system-wide."
    )]
    PdfiumBindingFailed(String),

    // ── Reconciliation errors ─────────────────────────────────────────────
    /// A figure's bounding box has no area once mapped onto its page.
    #[error("Figure {figure} on page {page} has a degenerate bounding box: {detail}")]
    DegenerateFigureRegion {
        figure: String,
        page: usize,
        detail: String,
    },

    /// A figure carries no usable bounding region, so it cannot be cropped.
    #[error("Figure {figure} has no usable bounding region")]
    MissingBoundingRegion { figure: String },

    /// The cropped figure raster could not be PNG-encoded.
    #[error("Failed to encode figure {figure} as PNG: {detail}")]
    ImageEncodeFailed { figure: String, detail: String },

    // ── Service errors ────────────────────────────────────────────────────
    /// The document analysis call failed; no pages can be produced.
    #[error("Document analysis failed: {0}")]
    Analysis(#[source] ServiceError),

    /// The image describer failed for a figure.
    #[error("Describing figure {figure} failed: {source}")]
    Describe {
        figure: String,
        #[source]
        source: ServiceError,
    },

    /// No usable vision provider for the VLM describer.
    #[error(
        "Vision provider '{provider}' is not configured: {hint}\n\
Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or pass a provider explicitly."
    )]
    ProviderNotConfigured { provider: String, hint: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A failure while talking to a remote analysis or description service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The HTTP request could not be sent or the connection dropped.
    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    /// The service answered with a non-success status.
    #[error("service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// A long-running operation was accepted but no poll URL was returned.
    #[error("response is missing the Operation-Location header")]
    MissingOperationLocation,

    /// The response body did not match the expected shape.
    #[error("could not decode service response: {0}")]
    Decode(String),

    /// The long-running operation reached the `failed` terminal state.
    #[error("operation failed: {0}")]
    OperationFailed(String),

    /// Polling ran out of attempts or wall-clock budget.
    #[error("operation still running after {attempts} polls ({elapsed_ms}ms)")]
    TimedOut { attempts: u32, elapsed_ms: u64 },

    /// The service succeeded but returned nothing usable.
    #[error("service returned an empty result")]
    EmptyResponse,

    /// A provider-side failure that is not HTTP shaped (e.g. an LLM SDK error).
    #[error("provider error after {retries} retries: {detail}")]
    Provider { retries: u32, detail: String },
}

impl ServiceError {
    /// Transient failures worth another attempt by a describer's retry loop.
    pub fn is_transient(&self) -> bool {
        match self {
            ServiceError::Request { .. } | ServiceError::TimedOut { .. } => true,
            ServiceError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<ServiceError> for ParseError {
    fn from(e: ServiceError) -> Self {
        ParseError::Analysis(e)
    }
}
