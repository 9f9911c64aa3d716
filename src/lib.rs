//! deep-trawl: a bounded-depth research crawler.
//!
//! Seeds (search results or explicit URLs) are fetched, their outbound
//! links expanded breadth-first under a crawl budget, with optional
//! AI-assisted frontier pruning along the way.

pub mod ai;
pub mod config;
pub mod crawl;
pub mod fetch;
pub mod filter;
pub mod parsers;
pub mod records;
pub mod utils;

use std::sync::Arc;
use thiserror::Error;

pub use ai::{HeuristicFilter, LlmFilter, RelevanceFilter};
pub use config::{CrawlBudget, CrawlConfig};
pub use crawl::{CrawlOptions, CrawlOrchestrator};
pub use fetch::{BrowserFetcher, Fetcher, HttpFetcher};
pub use filter::{LinkFilter, LinkFilterConfig};
pub use records::{CrawlResult, CrawlStats, LinkRecord, PageRecord, SearchHit};

/// Structural crawl failures. Per-URL and per-AI-call problems never
/// surface here; they are absorbed into records and fallbacks.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("No seed pages to expand from")]
    EmptySeeds,

    #[error("Invalid seed URL: {0}")]
    InvalidSeed(String),

    #[error("Invalid filter pattern: {0}")]
    FilterPattern(#[from] regex::Error),
}

/// Builder for configuring and running a crawl.
pub struct DeepCrawl {
    query: String,
    seed_urls: Vec<String>,
    config: CrawlConfig,
    filter_config: LinkFilterConfig,
    fetcher: Option<Arc<dyn Fetcher>>,
    relevance: Option<Arc<dyn RelevanceFilter>>,
}

impl DeepCrawl {
    /// Create a new crawl for the given research query.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            seed_urls: Vec::new(),
            config: CrawlConfig::default(),
            filter_config: LinkFilterConfig::default(),
            fetcher: None,
            relevance: None,
        }
    }

    /// Seed the crawl with explicit URLs.
    pub fn with_seed_urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.seed_urls.extend(urls.into_iter().map(Into::into));
        self
    }

    /// Seed the crawl from search provider hits.
    pub fn with_seed_hits(mut self, hits: &[SearchHit]) -> Self {
        self.seed_urls.extend(hits.iter().map(|h| h.url.clone()));
        self
    }

    /// Apply a full configuration (budget, fetcher choice, AI options).
    pub fn with_config(mut self, config: CrawlConfig) -> Self {
        self.config = config;
        self
    }

    /// Override just the crawl budget.
    pub fn with_budget(mut self, budget: CrawlBudget) -> Self {
        self.config.budget = budget;
        self
    }

    /// Use the WebDriver browser fetcher (default) or plain HTTP.
    pub fn use_browser(mut self, yes: bool) -> Self {
        self.config.use_browser = yes;
        self
    }

    pub fn with_webdriver_url(mut self, url: impl Into<String>) -> Self {
        self.config.webdriver_url = url.into();
        self
    }

    /// Supply a custom fetcher, replacing the built-in ones.
    pub fn with_fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Supply a custom relevance filter, replacing the built-in ones.
    pub fn with_relevance_filter(mut self, filter: Arc<dyn RelevanceFilter>) -> Self {
        self.relevance = Some(filter);
        self
    }

    /// Enable AI quality filtering of frontier links.
    pub fn with_quality_criterion(mut self, criterion: impl Into<String>) -> Self {
        self.config.quality_criterion = Some(criterion.into());
        self
    }

    /// Rank frontier links instead of taking discovery order.
    pub fn rank_links(mut self, yes: bool) -> Self {
        self.config.rank_links = yes;
        self
    }

    /// Let the relevance filter stop the crawl before the depth budget.
    pub fn adaptive_stop(mut self, yes: bool) -> Self {
        self.config.adaptive_stop = yes;
        self
    }

    /// Restrict frontier links with regex patterns.
    pub fn with_link_filter(mut self, filter_config: LinkFilterConfig) -> Self {
        self.filter_config = filter_config;
        self
    }

    /// Fetch the seeds at depth 0, then run the orchestrator to the
    /// configured depth.
    pub async fn run(self) -> Result<CrawlResult, CrawlError> {
        let link_filter = LinkFilter::new(self.filter_config)?;

        // Validate and normalize seeds before spending any fetches
        let mut seeds = Vec::with_capacity(self.seed_urls.len());
        for raw in &self.seed_urls {
            let parsed =
                url::Url::parse(raw).map_err(|_| CrawlError::InvalidSeed(raw.clone()))?;
            if parsed.scheme() != "http" && parsed.scheme() != "https" {
                return Err(CrawlError::InvalidSeed(raw.clone()));
            }
            seeds.push(link_filter.normalize_url(&parsed).to_string());
        }
        if seeds.is_empty() {
            return Err(CrawlError::EmptySeeds);
        }

        // A browser fetcher built here is also shut down here
        let mut browser: Option<Arc<BrowserFetcher>> = None;
        let fetcher: Arc<dyn Fetcher> = match self.fetcher {
            Some(custom) => custom,
            None if self.config.use_browser => {
                let b = Arc::new(BrowserFetcher::new(
                    self.config.webdriver_url.clone(),
                    self.config.budget.per_page_timeout_ms,
                ));
                browser = Some(Arc::clone(&b));
                b
            }
            None => Arc::new(HttpFetcher::new(self.config.budget.per_page_timeout_ms)),
        };

        let wants_ai = self.config.quality_criterion.is_some()
            || self.config.rank_links
            || self.config.adaptive_stop;
        let relevance: Option<Arc<dyn RelevanceFilter>> = match self.relevance {
            Some(custom) => Some(custom),
            None => match &self.config.llm_url {
                Some(url) => Some(Arc::new(LlmFilter::new(
                    url.clone(),
                    self.config.llm_model.clone(),
                    std::env::var("DEEP_TRAWL_LLM_KEY").ok(),
                ))),
                None if wants_ai => Some(Arc::new(HeuristicFilter::new())),
                None => None,
            },
        };

        ::log::info!("Fetching {} seed pages", seeds.len());
        let seed_pages = crawl::batch::fetch_many(
            Arc::clone(&fetcher),
            seeds,
            0,
            self.config.budget.max_concurrent_fetches,
        )
        .await;

        let options = CrawlOptions {
            quality_criterion: self.config.quality_criterion.clone(),
            rank_links: self.config.rank_links,
            adaptive_stop: self.config.adaptive_stop,
        };
        let orchestrator = CrawlOrchestrator::new(
            self.query,
            self.config.budget,
            fetcher,
            relevance,
            link_filter,
            options,
        );

        let result = orchestrator.run(seed_pages).await;

        if let Some(b) = browser {
            b.shutdown().await;
        }

        result
    }
}
