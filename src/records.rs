use serde::{Deserialize, Serialize};

/// Default relevance for a successfully fetched page or unscored link.
pub const RELEVANCE_DEFAULT: f32 = 0.5;

/// Relevance assigned to pages whose fetch failed.
pub const RELEVANCE_FAILED: f32 = 0.1;

/// One outbound link discovered on a page.
///
/// The URL is absolute with any fragment stripped; only http(s) links
/// survive extraction, and a page's link list is unique by URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkRecord {
    /// Absolute link target
    pub url: String,

    /// Visible anchor text (capped)
    pub text: String,

    /// Text of the anchor's parent element (capped)
    pub context: String,

    /// Estimated usefulness to the query, default until scored
    #[serde(default = "default_relevance")]
    pub relevance_score: f32,
}

fn default_relevance() -> f32 {
    RELEVANCE_DEFAULT
}

impl LinkRecord {
    pub fn new(url: String, text: String, context: String) -> Self {
        Self {
            url,
            text,
            context,
            relevance_score: RELEVANCE_DEFAULT,
        }
    }
}

/// Result of fetching one URL. Created by a fetcher and immutable
/// afterwards; a record with `error` set has empty content and links.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    /// Absolute URL, the identity key
    pub url: String,

    /// Page title (empty when unavailable)
    pub title: String,

    /// Extracted plain text, truncated to the content cap
    pub content: String,

    /// Outbound links in document order
    pub links: Vec<LinkRecord>,

    /// Crawl depth at which this page was fetched (0 = seed)
    pub depth: u32,

    /// Estimated usefulness to the query
    pub relevance_score: f32,

    /// Time spent navigating/downloading, in milliseconds
    pub fetch_time_ms: u64,

    /// Time spent extracting content, in milliseconds
    pub processing_time_ms: u64,

    /// Short failure description when the fetch failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PageRecord {
    /// A successfully fetched page.
    pub fn fetched(
        url: String,
        title: String,
        content: String,
        links: Vec<LinkRecord>,
        depth: u32,
        fetch_time_ms: u64,
        processing_time_ms: u64,
    ) -> Self {
        Self {
            url,
            title,
            content,
            links,
            depth,
            relevance_score: RELEVANCE_DEFAULT,
            fetch_time_ms,
            processing_time_ms,
            error: None,
        }
    }

    /// A failed fetch: no content, no links, low relevance.
    pub fn failed(url: String, depth: u32, error: String, fetch_time_ms: u64) -> Self {
        Self {
            url,
            title: String::new(),
            content: String::new(),
            links: Vec::new(),
            depth,
            relevance_score: RELEVANCE_FAILED,
            fetch_time_ms,
            processing_time_ms: 0,
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// One hit from an external search provider, used to seed depth 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default = "default_relevance")]
    pub score: f32,
}

/// Aggregate counts reported to consumers after a crawl.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrawlStats {
    /// Pages kept in the final result, all depths
    pub total_pages: usize,

    /// Links discovered across all kept pages
    pub total_links: usize,

    /// Fetches that failed
    pub error_count: usize,

    /// Pages fetched successfully but dropped for too-short content
    pub skipped_short: usize,
}

/// Everything a crawl produces: the accumulated pages plus summary counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlResult {
    pub pages: Vec<PageRecord>,
    pub stats: CrawlStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_record_has_no_content_or_links() {
        let rec = PageRecord::failed("https://example.com/x".into(), 2, "timeout".into(), 120);
        assert!(rec.error.is_some());
        assert!(rec.content.is_empty());
        assert!(rec.links.is_empty());
        assert_eq!(rec.relevance_score, RELEVANCE_FAILED);
        assert_eq!(rec.depth, 2);
    }

    #[test]
    fn test_fetched_record_defaults() {
        let rec = PageRecord::fetched(
            "https://example.com".into(),
            "Example".into(),
            "body text".into(),
            vec![],
            0,
            50,
            5,
        );
        assert!(rec.is_ok());
        assert_eq!(rec.relevance_score, RELEVANCE_DEFAULT);
    }

    #[test]
    fn test_error_field_omitted_from_json_on_success() {
        let rec = PageRecord::fetched(
            "https://example.com".into(),
            String::new(),
            String::new(),
            vec![],
            0,
            0,
            0,
        );
        let json = serde_json::to_string(&rec).unwrap();
        assert!(!json.contains("\"error\""));
    }
}
