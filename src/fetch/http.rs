use crate::fetch::{self, Fetcher, classify_reqwest_error, classify_status};
use crate::parsers::DocKind;
use crate::records::PageRecord;
use async_trait::async_trait;
use std::time::Instant;

/// Plain HTTP fetcher: every URL is a straight GET, no browser. Suitable
/// for documentation sites and APIs that render server-side; pages that
/// need JavaScript come back as whatever the server sent.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(per_page_timeout_ms: u64) -> Self {
        Self {
            client: fetch::build_http_client(per_page_timeout_ms),
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, depth: u32) -> PageRecord {
        let kind = DocKind::from_url(url);
        let fetch_start = Instant::now();

        // Non-HTML documents share the download path with the browser fetcher
        if !kind.needs_browser() {
            return match fetch::download_document(&self.client, url, kind).await {
                Ok((refined, bytes)) => {
                    let fetch_time_ms = fetch_start.elapsed().as_millis() as u64;
                    if refined == DocKind::Html {
                        fetch::page_from_html(
                            url,
                            depth,
                            &String::from_utf8_lossy(&bytes),
                            fetch_time_ms,
                        )
                    } else {
                        fetch::page_from_document(url, depth, refined, &bytes, fetch_time_ms)
                    }
                }
                Err(kind) => {
                    ::log::debug!("Document fetch failed for {}: {}", url, kind);
                    PageRecord::failed(
                        url.to_string(),
                        depth,
                        kind.to_string(),
                        fetch_start.elapsed().as_millis() as u64,
                    )
                }
            };
        }

        let response = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                let kind = classify_reqwest_error(&e);
                ::log::debug!("GET failed for {}: {} ({})", url, kind, e);
                return PageRecord::failed(
                    url.to_string(),
                    depth,
                    kind.to_string(),
                    fetch_start.elapsed().as_millis() as u64,
                );
            }
        };

        let status = response.status();
        if !status.is_success() {
            let kind = classify_status(status);
            return PageRecord::failed(
                url.to_string(),
                depth,
                kind.to_string(),
                fetch_start.elapsed().as_millis() as u64,
            );
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        let refined = kind.refine(&content_type);

        match response.bytes().await {
            Ok(bytes) => {
                let fetch_time_ms = fetch_start.elapsed().as_millis() as u64;
                if refined == DocKind::Html {
                    fetch::page_from_html(
                        url,
                        depth,
                        &String::from_utf8_lossy(&bytes),
                        fetch_time_ms,
                    )
                } else {
                    fetch::page_from_document(url, depth, refined, &bytes, fetch_time_ms)
                }
            }
            Err(e) => {
                let kind = classify_reqwest_error(&e);
                PageRecord::failed(
                    url.to_string(),
                    depth,
                    kind.to_string(),
                    fetch_start.elapsed().as_millis() as u64,
                )
            }
        }
    }
}
