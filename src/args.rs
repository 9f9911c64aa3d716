use clap::Parser;
use deep_trawl::config::CrawlConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "deep-trawl")]
#[command(about = "Depth-bounded research crawler with AI-assisted link pruning")]
#[command(version)]
pub struct Args {
    /// Research query guiding relevance decisions
    pub query: String,

    /// Seed URLs to expand from (search results, docs roots, ...)
    #[arg(required = true)]
    pub seeds: Vec<String>,

    /// Link-hops to expand past the seed pages
    #[arg(short, long, default_value_t = 2)]
    pub depth: u32,

    /// Pages fetched per depth level
    #[arg(short, long, default_value_t = 5)]
    pub pages_per_depth: usize,

    /// Concurrent fetches within a depth level
    #[arg(short, long, default_value_t = 4)]
    pub concurrency: usize,

    /// Per-page timeout in milliseconds
    #[arg(long, default_value_t = 20_000)]
    pub timeout_ms: u64,

    /// Fetch with plain HTTP instead of a WebDriver browser
    #[arg(long)]
    pub no_browser: bool,

    /// WebDriver endpoint (also settable via WEBDRIVER_URL)
    #[arg(long)]
    pub webdriver_url: Option<String>,

    /// Quality criterion for AI link filtering
    #[arg(long)]
    pub quality: Option<String>,

    /// Rank frontier links by relevance before fetching
    #[arg(long)]
    pub rank: bool,

    /// Let the relevance filter stop the crawl early
    #[arg(long)]
    pub adaptive_stop: bool,

    /// OpenAI-compatible endpoint for the LLM relevance filter
    /// (also settable via DEEP_TRAWL_LLM_URL)
    #[arg(long)]
    pub llm_url: Option<String>,

    /// Model name for the LLM relevance filter
    #[arg(long)]
    pub llm_model: Option<String>,

    /// Write the full crawl result as JSON to this path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// JSON configuration file (CLI flags override it)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Builds the effective configuration: file config (if any), then
    /// environment overrides, then explicit flags.
    pub fn to_config(&self) -> Result<CrawlConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => CrawlConfig::from_file(path)?,
            None => CrawlConfig::default(),
        }
        .with_env_overrides();

        config.budget.max_depth = self.depth;
        config.budget.max_pages_per_depth = self.pages_per_depth;
        config.budget.max_concurrent_fetches = self.concurrency;
        config.budget.per_page_timeout_ms = self.timeout_ms;

        if self.no_browser {
            config.use_browser = false;
        }
        if let Some(url) = &self.webdriver_url {
            config.webdriver_url = url.clone();
        }
        if let Some(criterion) = &self.quality {
            config.quality_criterion = Some(criterion.clone());
        }
        if self.rank {
            config.rank_links = true;
        }
        if self.adaptive_stop {
            config.adaptive_stop = true;
        }
        if let Some(url) = &self.llm_url {
            config.llm_url = Some(url.clone());
        }
        if let Some(model) = &self.llm_model {
            config.llm_model = model.clone();
        }

        Ok(config)
    }
}
