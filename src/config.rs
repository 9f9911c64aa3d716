use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Budget bounding a single crawl. Immutable once the crawl starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlBudget {
    /// How many link-hops past the seed pages to expand
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,

    /// Cap on pages fetched at each depth level
    #[serde(default = "default_max_pages_per_depth")]
    pub max_pages_per_depth: usize,

    /// Cap on simultaneous fetches within a depth level
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,

    /// Per-page navigation/download timeout in milliseconds
    #[serde(default = "default_per_page_timeout_ms")]
    pub per_page_timeout_ms: u64,

    /// Minimum ranked-link score kept when ranking is enabled
    #[serde(default = "default_link_relevance_threshold")]
    pub link_relevance_threshold: f32,
}

impl Default for CrawlBudget {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_pages_per_depth: default_max_pages_per_depth(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
            per_page_timeout_ms: default_per_page_timeout_ms(),
            link_relevance_threshold: default_link_relevance_threshold(),
        }
    }
}

/// Full crawler configuration, loadable from a JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    #[serde(default)]
    pub budget: CrawlBudget,

    /// Use a WebDriver browser for HTML pages (plain HTTP otherwise)
    #[serde(default = "default_use_browser")]
    pub use_browser: bool,

    /// WebDriver endpoint for the browser fetcher
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Free-text criterion for AI link-quality filtering, if any
    #[serde(default)]
    pub quality_criterion: Option<String>,

    /// Ask the relevance filter to rank frontier links
    #[serde(default)]
    pub rank_links: bool,

    /// Ask the relevance filter whether to stop early at each depth
    #[serde(default)]
    pub adaptive_stop: bool,

    /// OpenAI-compatible chat endpoint for the LLM relevance filter
    #[serde(default)]
    pub llm_url: Option<String>,

    /// Model name passed to the LLM endpoint
    #[serde(default = "default_llm_model")]
    pub llm_model: String,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            budget: CrawlBudget::default(),
            use_browser: default_use_browser(),
            webdriver_url: default_webdriver_url(),
            quality_criterion: None,
            rank_links: false,
            adaptive_stop: false,
            llm_url: None,
            llm_model: default_llm_model(),
        }
    }
}

impl CrawlConfig {
    /// Load configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Apply environment overrides (`WEBDRIVER_URL`, `DEEP_TRAWL_LLM_URL`).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("WEBDRIVER_URL") {
            if !url.is_empty() {
                self.webdriver_url = url;
            }
        }
        if let Ok(url) = std::env::var("DEEP_TRAWL_LLM_URL") {
            if !url.is_empty() {
                self.llm_url = Some(url);
            }
        }
        self
    }
}

fn default_max_depth() -> u32 {
    2
}

fn default_max_pages_per_depth() -> usize {
    5
}

fn default_max_concurrent_fetches() -> usize {
    4
}

fn default_per_page_timeout_ms() -> u64 {
    20_000
}

fn default_link_relevance_threshold() -> f32 {
    0.5
}

fn default_use_browser() -> bool {
    true
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_defaults() {
        let budget = CrawlBudget::default();
        assert_eq!(budget.max_depth, 2);
        assert_eq!(budget.max_pages_per_depth, 5);
        assert_eq!(budget.max_concurrent_fetches, 4);
        assert_eq!(budget.per_page_timeout_ms, 20_000);
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: CrawlConfig =
            serde_json::from_str(r#"{"budget": {"max_depth": 3}, "rank_links": true}"#).unwrap();
        assert_eq!(config.budget.max_depth, 3);
        // omitted fields fall back to defaults
        assert_eq!(config.budget.max_pages_per_depth, 5);
        assert!(config.rank_links);
        assert!(config.use_browser);
        assert_eq!(config.webdriver_url, "http://localhost:4444");
    }
}
