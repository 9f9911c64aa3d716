pub mod browser;
pub mod http;

use crate::parsers::{self, DocKind};
use crate::records::PageRecord;
use async_trait::async_trait;
use std::fmt;
use std::time::{Duration, Instant};

pub use browser::BrowserFetcher;
pub use http::HttpFetcher;

/// Retrieves a single URL. Never fails: every failure mode is captured
/// into the returned record's `error` field. Retry policy, if any,
/// belongs to the caller.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str, depth: u32) -> PageRecord;
}

/// Short classification of a fetch failure, stored in
/// [`PageRecord::error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    Timeout,
    Forbidden,
    NotFound,
    HttpStatus(u16),
    Ssl,
    Network,
    Unknown,
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchErrorKind::Timeout => write!(f, "timeout"),
            FetchErrorKind::Forbidden => write!(f, "forbidden (HTTP 403)"),
            FetchErrorKind::NotFound => write!(f, "not found (HTTP 404)"),
            FetchErrorKind::HttpStatus(code) => write!(f, "http status {}", code),
            FetchErrorKind::Ssl => write!(f, "ssl"),
            FetchErrorKind::Network => write!(f, "network"),
            FetchErrorKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// Maps a reqwest error onto the failure taxonomy.
pub fn classify_reqwest_error(error: &reqwest::Error) -> FetchErrorKind {
    if error.is_timeout() {
        FetchErrorKind::Timeout
    } else if error.is_connect() {
        // TLS failures surface as connect errors; tell them apart by text
        let text = error.to_string().to_lowercase();
        if text.contains("certificate") || text.contains("ssl") || text.contains("tls") {
            FetchErrorKind::Ssl
        } else {
            FetchErrorKind::Network
        }
    } else if error.is_request() || error.is_body() {
        FetchErrorKind::Network
    } else {
        FetchErrorKind::Unknown
    }
}

/// Maps a non-2xx status onto the failure taxonomy.
pub fn classify_status(status: reqwest::StatusCode) -> FetchErrorKind {
    match status.as_u16() {
        403 => FetchErrorKind::Forbidden,
        404 => FetchErrorKind::NotFound,
        code => FetchErrorKind::HttpStatus(code),
    }
}

/// Builds the shared HTTP client used for document downloads and
/// browserless page fetches.
pub fn build_http_client(timeout_ms: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(concat!("deep-trawl/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_millis(timeout_ms))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .build()
        .unwrap_or_default()
}

/// Downloads raw bytes for a non-HTML document and returns them with the
/// classification refined by the response Content-Type.
pub async fn download_document(
    client: &reqwest::Client,
    url: &str,
    kind: DocKind,
) -> Result<(DocKind, Vec<u8>), FetchErrorKind> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| classify_reqwest_error(&e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(classify_status(status));
    }

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    let refined = kind.refine(&content_type);

    let bytes = response
        .bytes()
        .await
        .map_err(|e| classify_reqwest_error(&e))?;
    Ok((refined, bytes.to_vec()))
}

/// Decodes downloaded document bytes into plain text per kind.
/// HTML bytes are not handled here; they go through the ContentExtractor.
pub fn extract_document_text(kind: DocKind, bytes: &[u8]) -> Result<String, String> {
    match kind {
        DocKind::Pdf => parsers::docs::extract_pdf(bytes),
        DocKind::Json => parsers::docs::extract_json(&String::from_utf8_lossy(bytes)),
        DocKind::Xml => parsers::docs::extract_xml(&String::from_utf8_lossy(bytes)),
        DocKind::Yaml => Ok(parsers::docs::extract_yaml(&String::from_utf8_lossy(bytes))),
        DocKind::Html => Err("html goes through the content extractor".to_string()),
    }
}

/// Builds a page record from rendered HTML via the ContentExtractor.
pub fn page_from_html(url: &str, depth: u32, html: &str, fetch_time_ms: u64) -> PageRecord {
    let processing_start = Instant::now();

    let base = match url::Url::parse(url) {
        Ok(u) => u,
        Err(_) => {
            return PageRecord::failed(
                url.to_string(),
                depth,
                FetchErrorKind::Unknown.to_string(),
                fetch_time_ms,
            );
        }
    };

    let extracted = parsers::html::extract(html, &base);
    let processing_time_ms = processing_start.elapsed().as_millis() as u64;

    PageRecord::fetched(
        url.to_string(),
        extracted.title,
        extracted.text,
        extracted.links,
        depth,
        fetch_time_ms,
        processing_time_ms,
    )
}

/// Builds a page record for a non-HTML document. Document types carry no
/// outbound links.
pub fn page_from_document(
    url: &str,
    depth: u32,
    kind: DocKind,
    bytes: &[u8],
    fetch_time_ms: u64,
) -> PageRecord {
    let processing_start = Instant::now();

    match extract_document_text(kind, bytes) {
        Ok(text) => {
            let capped = crate::utils::truncate_chars(&text, parsers::html::CONTENT_CAP);
            let processing_time_ms = processing_start.elapsed().as_millis() as u64;
            // Document title falls back to the final path segment
            let title = url
                .rsplit('/')
                .next()
                .unwrap_or(url)
                .split('?')
                .next()
                .unwrap_or("")
                .to_string();
            PageRecord::fetched(
                url.to_string(),
                title,
                capped,
                Vec::new(),
                depth,
                fetch_time_ms,
                processing_time_ms,
            )
        }
        Err(detail) => {
            ::log::debug!("Document extraction failed for {}: {}", url, detail);
            PageRecord::failed(
                url.to_string(),
                depth,
                FetchErrorKind::Unknown.to_string(),
                fetch_time_ms,
            )
        }
    }
}
