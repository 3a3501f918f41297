//! Streaming parse API: resolve an input and emit pages as they are ready.
//!
//! Large documents take a while: the analysis call alone can run for
//! minutes, and every figure costs a describer round-trip. Streaming lets
//! callers index or persist each page as soon as it exists instead of
//! buffering the whole document. Pages always arrive in page order.

use crate::error::ParseError;
use crate::parser::{PageStream, Parser};
use crate::pipeline::input;
use tracing::info;

/// Resolve a local path or HTTP(S) URL and start parsing it.
///
/// # Returns
/// - `Ok(PageStream)`: lazily yields `Result<Page, ParseError>`
/// - `Err(ParseError)`: the input could not be read or downloaded
///
/// # Example
/// ```rust,no_run
/// use docintel_pages::{parse_stream, LocalPdfParser};
/// use futures::StreamExt;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let parser = LocalPdfParser::default();
/// let mut pages = parse_stream("document.pdf", &parser).await?;
/// while let Some(page) = pages.next().await {
///     let page = page?;
///     println!("Page {}: {} chars", page.page_num, page.char_len());
/// }
/// # Ok(())
/// # }
/// ```
pub async fn parse_stream(
    input_str: impl AsRef<str>,
    parser: &dyn Parser,
) -> Result<PageStream, ParseError> {
    let input_str = input_str.as_ref();
    info!("Starting streaming parse: {}", input_str);

    let source = input::resolve_input(input_str, parser.config().download_timeout_secs).await?;
    Ok(parser.parse(source))
}
