//! Eager (full-document) entry points and page export.
//!
//! These wait for every page and return them together. Use
//! [`crate::stream::parse_stream`] or [`crate::parser::Parser::parse`]
//! directly to handle pages as they arrive.

use crate::error::ParseError;
use crate::output::Page;
use crate::parser::{PageStream, Parser};
use crate::stream::parse_stream;
use futures::TryStreamExt;
use std::path::Path;
use tracing::info;

/// Drain a page stream, stopping at the first error.
pub async fn collect_pages(stream: PageStream) -> Result<Vec<Page>, ParseError> {
    stream.try_collect().await
}

/// Parse a local path or URL and return every page.
pub async fn parse_to_pages(
    input_str: impl AsRef<str>,
    parser: &dyn Parser,
) -> Result<Vec<Page>, ParseError> {
    let pages = collect_pages(parse_stream(input_str, parser).await?).await?;
    info!("Parsed {} pages", pages.len());
    Ok(pages)
}

/// Synchronous wrapper around [`parse_to_pages`].
///
/// Creates a temporary tokio runtime internally.
pub fn parse_to_pages_sync(
    input_str: impl AsRef<str>,
    parser: &dyn Parser,
) -> Result<Vec<Page>, ParseError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ParseError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(parse_to_pages(input_str, parser))
}

/// Write pages as a JSON array of `{page_num, offset, text}`.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn write_pages_json(pages: &[Page], output_path: impl AsRef<Path>) -> Result<(), ParseError> {
    let path = output_path.as_ref();
    let write_err = |e: std::io::Error| ParseError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    let json = serde_json::to_vec_pretty(pages)
        .map_err(|e| ParseError::Internal(format!("Failed to serialise pages: {}", e)))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = path.with_extension("json.tmp");
    tokio::fs::write(&tmp_path, &json).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;

    info!("Wrote {} pages to {}", pages.len(), path.display());
    Ok(())
}
