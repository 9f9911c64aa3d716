use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

/// Configuration for local (non-AI) frontier link filtering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkFilterConfig {
    /// Regex patterns for URLs to include (if empty, all URLs are included
    /// unless excluded)
    #[serde(default)]
    pub include_patterns: Vec<String>,

    /// Regex patterns for URLs to exclude (these take precedence over
    /// include patterns)
    #[serde(default = "default_exclude_patterns")]
    pub exclude_patterns: Vec<String>,
}

fn default_exclude_patterns() -> Vec<String> {
    vec![
        // Binary assets and styling resources a research crawl never reads
        r"\.(jpg|jpeg|png|gif|webp|css|js|ico|svg|woff|woff2|ttf|eot|zip|tar|gz|mp4|mp3)$"
            .to_string(),
    ]
}

impl Default for LinkFilterConfig {
    fn default() -> Self {
        Self {
            include_patterns: Vec::new(),
            exclude_patterns: default_exclude_patterns(),
        }
    }
}

/// Regex-based link filter applied when computing a depth level's frontier,
/// before any AI-driven pruning.
#[derive(Debug)]
pub struct LinkFilter {
    include_regexes: Vec<Regex>,
    exclude_regexes: Vec<Regex>,
}

impl Default for LinkFilter {
    fn default() -> Self {
        Self::new(LinkFilterConfig::default()).expect("Default regex patterns should be valid")
    }
}

impl LinkFilter {
    /// Create a new link filter from configuration.
    pub fn new(config: LinkFilterConfig) -> Result<Self, regex::Error> {
        let mut include_regexes = Vec::with_capacity(config.include_patterns.len());
        for pattern in &config.include_patterns {
            include_regexes.push(Regex::new(pattern)?);
        }

        let mut exclude_regexes = Vec::with_capacity(config.exclude_patterns.len());
        for pattern in &config.exclude_patterns {
            exclude_regexes.push(Regex::new(pattern)?);
        }

        Ok(Self {
            include_regexes,
            exclude_regexes,
        })
    }

    /// Determine if a URL is worth fetching at all.
    pub fn should_crawl(&self, url: &Url) -> bool {
        // Only web pages; extraction already drops other schemes, but
        // caller-supplied seeds go through here too
        if url.scheme() != "http" && url.scheme() != "https" {
            return false;
        }

        let url_str = url.as_str();

        // Exclusions take precedence
        for regex in &self.exclude_regexes {
            if regex.is_match(url_str) {
                return false;
            }
        }

        // If include patterns are specified, at least one must match
        if !self.include_regexes.is_empty() {
            let mut included = false;
            for regex in &self.include_regexes {
                if regex.is_match(url_str) {
                    included = true;
                    break;
                }
            }
            if !included {
                return false;
            }
        }

        true
    }

    /// Create a normalized version of the URL (removing fragments) used as
    /// the visited-set key.
    pub fn normalize_url(&self, url: &Url) -> Url {
        let mut normalized = url.clone();
        normalized.set_fragment(None);
        normalized
    }
}
