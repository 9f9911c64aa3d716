use crate::fetch::{self, Fetcher, FetchErrorKind};
use crate::parsers::DocKind;
use crate::records::PageRecord;
use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder, Locator};
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::timeout;

/// Scroll-to-bottom rounds attempted while waiting for lazy content.
const SCROLL_ROUNDS: usize = 5;

/// Pause between scroll rounds, giving lazy loaders a chance to fire.
const SCROLL_PAUSE_MS: u64 = 250;

/// Poll interval while waiting for the document to become ready.
const READY_POLL_MS: u64 = 100;

/// Controls that typically reveal more content when clicked.
const LOAD_MORE_SELECTORS: &[&str] = &[
    "button.load-more",
    ".load-more",
    "button.show-more",
    ".show-more",
];

/// WebDriver endpoints tried when the configured one is unreachable.
const FALLBACK_WEBDRIVER_URLS: &[&str] = &[
    "http://localhost:4444",
    "http://localhost:9515",
    "http://127.0.0.1:4444",
];

/// Browser-backed fetcher: HTML pages are rendered through a WebDriver
/// session so script-built content and lazy-loaded sections are visible;
/// non-HTML documents are downloaded directly.
///
/// Sessions are pooled and reused across fetches. Size the concurrency
/// gate at or below the pool's natural growth so fetches are bounded by
/// the gate, not by session checkout.
pub struct BrowserFetcher {
    webdriver_url: String,
    per_page_timeout: Duration,
    pool: Mutex<VecDeque<Client>>,
    http: reqwest::Client,
}

impl BrowserFetcher {
    pub fn new(webdriver_url: String, per_page_timeout_ms: u64) -> Self {
        Self {
            webdriver_url,
            per_page_timeout: Duration::from_millis(per_page_timeout_ms),
            pool: Mutex::new(VecDeque::new()),
            http: fetch::build_http_client(per_page_timeout_ms),
        }
    }

    /// Close every pooled session. Call once the crawl is done.
    pub async fn shutdown(&self) {
        let mut pool = self.pool.lock().await;
        while let Some(client) = pool.pop_front() {
            if let Err(e) = client.close().await {
                ::log::warn!("Failed to close WebDriver session: {}", e);
            }
        }
    }

    /// Check a session out of the pool, connecting a fresh one on demand.
    async fn checkout(&self) -> Option<Client> {
        if let Some(client) = self.pool.lock().await.pop_front() {
            return Some(client);
        }
        self.connect().await
    }

    async fn checkin(&self, client: Client) {
        self.pool.lock().await.push_back(client);
    }

    /// Connect to the configured WebDriver, falling back to the usual
    /// local endpoints when it is unreachable.
    async fn connect(&self) -> Option<Client> {
        match ClientBuilder::native().connect(&self.webdriver_url).await {
            Ok(client) => return Some(client),
            Err(e) => {
                ::log::error!(
                    "Failed to connect to WebDriver at {}: {}",
                    self.webdriver_url,
                    e
                );
            }
        }

        for url in FALLBACK_WEBDRIVER_URLS {
            if *url == self.webdriver_url {
                continue;
            }
            ::log::info!("Trying fallback WebDriver URL: {}", url);
            if let Ok(client) = ClientBuilder::native().connect(url).await {
                return Some(client);
            }
        }

        ::log::error!(
            "No WebDriver server reachable; set WEBDRIVER_URL or start one at {}",
            self.webdriver_url
        );
        None
    }

    /// Load a page and return its rendered HTML.
    async fn browse(&self, url: &str) -> Result<String, FetchErrorKind> {
        let client = self.checkout().await.ok_or(FetchErrorKind::Network)?;

        match self.drive(&client, url).await {
            Ok(html) => {
                self.checkin(client).await;
                Ok(html)
            }
            Err(kind) => {
                // A lost session is unusable; anything else can be reused
                if kind == FetchErrorKind::Network {
                    let _ = client.close().await;
                } else {
                    self.checkin(client).await;
                }
                Err(kind)
            }
        }
    }

    async fn drive(&self, client: &Client, url: &str) -> Result<String, FetchErrorKind> {
        match timeout(self.per_page_timeout, client.goto(url)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(classify_cmd_error(&e)),
            Err(_) => return Err(FetchErrorKind::Timeout),
        }

        self.wait_dom_ready(client).await?;
        self.expand_dynamic_content(client).await;

        client.source().await.map_err(|e| classify_cmd_error(&e))
    }

    /// Wait for DOM-ready rather than network-idle, so slow trackers and
    /// ad beacons do not stall the fetch.
    async fn wait_dom_ready(&self, client: &Client) -> Result<(), FetchErrorKind> {
        let deadline = Instant::now() + self.per_page_timeout;

        loop {
            match client.execute("return document.readyState", vec![]).await {
                Ok(state) => {
                    if matches!(state.as_str(), Some("interactive") | Some("complete")) {
                        return Ok(());
                    }
                }
                Err(e) => return Err(classify_cmd_error(&e)),
            }

            if Instant::now() >= deadline {
                return Err(FetchErrorKind::Timeout);
            }
            tokio::time::sleep(Duration::from_millis(READY_POLL_MS)).await;
        }
    }

    /// Bounded lazy-content expansion: scroll to the bottom a few times
    /// and click visible "load more" controls. Failures here are ignored;
    /// whatever rendered is what gets extracted.
    async fn expand_dynamic_content(&self, client: &Client) {
        let mut last_height: i64 = 0;

        for _ in 0..SCROLL_ROUNDS {
            let _ = client
                .execute("window.scrollTo(0, document.body.scrollHeight)", vec![])
                .await;
            tokio::time::sleep(Duration::from_millis(SCROLL_PAUSE_MS)).await;

            let height = client
                .execute("return document.body.scrollHeight", vec![])
                .await
                .ok()
                .and_then(|v| v.as_i64())
                .unwrap_or(0);

            if height <= last_height {
                // Scrolling stopped producing content; try a load-more button
                let mut clicked = false;
                for selector in LOAD_MORE_SELECTORS {
                    if let Ok(element) = client.find(Locator::Css(selector)).await {
                        if element.click().await.is_ok() {
                            clicked = true;
                            break;
                        }
                    }
                }
                if !clicked {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(SCROLL_PAUSE_MS)).await;
            }
            last_height = height;
        }
    }
}

/// Maps a WebDriver command error onto the failure taxonomy.
fn classify_cmd_error(error: &fantoccini::error::CmdError) -> FetchErrorKind {
    let text = error.to_string().to_lowercase();
    if text.contains("timeout") || text.contains("timed out") {
        FetchErrorKind::Timeout
    } else if text.contains("unable to find session") || text.contains("invalid session") {
        // Session loss reads as a transport failure to the caller
        FetchErrorKind::Network
    } else if text.contains("certificate") || text.contains("ssl") {
        FetchErrorKind::Ssl
    } else if text.contains("net::") || text.contains("dns") || text.contains("connection") {
        FetchErrorKind::Network
    } else {
        FetchErrorKind::Unknown
    }
}

#[async_trait]
impl Fetcher for BrowserFetcher {
    async fn fetch(&self, url: &str, depth: u32) -> PageRecord {
        let kind = DocKind::from_url(url);
        let fetch_start = Instant::now();

        if !kind.needs_browser() {
            return match fetch::download_document(&self.http, url, kind).await {
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
                Err(kind) => PageRecord::failed(
                    url.to_string(),
                    depth,
                    kind.to_string(),
                    fetch_start.elapsed().as_millis() as u64,
                ),
            };
        }

        // The outer timeout covers navigation plus expansion overhead so a
        // wedged session can never hang the batch
        let outer = self.per_page_timeout * 2;
        let result = match timeout(outer, self.browse(url)).await {
            Ok(r) => r,
            Err(_) => Err(FetchErrorKind::Timeout),
        };

        match result {
            Ok(html) => {
                let fetch_time_ms = fetch_start.elapsed().as_millis() as u64;
                fetch::page_from_html(url, depth, &html, fetch_time_ms)
            }
            Err(kind) => {
                ::log::debug!("Browser fetch failed for {}: {}", url, kind);
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
