//! Input resolution: load a user-supplied path or URL into memory.
//!
//! Both parsers work on an in-memory [`DocumentSource`]: the analysis service
//! takes the bytes as its request body and pdfium opens them with
//! `load_pdf_from_byte_slice`, so nothing is staged on disk.

use crate::error::ParseError;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// A document's display name and full contents.
#[derive(Clone)]
pub struct DocumentSource {
    /// File name, used in logs and error messages.
    pub name: String,
    pub bytes: Arc<[u8]>,
}

impl DocumentSource {
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Fail with [`ParseError::NotAPdf`] unless the bytes start with `%PDF`.
    pub fn ensure_pdf(&self) -> Result<(), ParseError> {
        if self.bytes.starts_with(b"%PDF") {
            return Ok(());
        }
        let mut magic = [0u8; 4];
        let n = self.bytes.len().min(4);
        magic[..n].copy_from_slice(&self.bytes[..n]);
        Err(ParseError::NotAPdf {
            name: self.name.clone(),
            magic,
        })
    }
}

impl std::fmt::Debug for DocumentSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentSource")
            .field("name", &self.name)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve the input string to an in-memory document.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<DocumentSource, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::InvalidInput {
            input: input.to_string(),
        });
    }
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        read_local(input).await
    }
}

async fn read_local(path_str: &str) -> Result<DocumentSource, ParseError> {
    let path = PathBuf::from(path_str);

    let bytes = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => ParseError::PermissionDenied { path: path.clone() },
        _ => ParseError::FileNotFound { path: path.clone() },
    })?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path_str.to_string());

    debug!("Read local document: {} ({} bytes)", path.display(), bytes.len());
    Ok(DocumentSource::new(name, bytes))
}

async fn download_url(url: &str, timeout_secs: u64) -> Result<DocumentSource, ParseError> {
    info!("Downloading document from: {}", url);

    let parsed = reqwest::Url::parse(url).map_err(|_| ParseError::InvalidInput {
        input: url.to_string(),
    })?;

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| ParseError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let timeout_or_failure = |e: reqwest::Error| {
        if e.is_timeout() {
            ParseError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            ParseError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    };

    let response = client.get(parsed.clone()).send().await.map_err(timeout_or_failure)?;

    if !response.status().is_success() {
        return Err(ParseError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response.bytes().await.map_err(timeout_or_failure)?;

    info!("Downloaded {} bytes", bytes.len());
    Ok(DocumentSource::new(filename_from_url(&parsed), bytes.to_vec()))
}

/// Last path segment when it looks like a file name, else `downloaded.pdf`.
fn filename_from_url(url: &reqwest::Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|last| !last.is_empty() && last.contains('.'))
        .map(str::to_string)
        .unwrap_or_else(|| "downloaded.pdf".to_string())
}
