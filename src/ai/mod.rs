pub mod heuristic;
pub mod llm;

use crate::records::LinkRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use heuristic::HeuristicFilter;
pub use llm::LlmFilter;

/// Failure of a relevance-filter call. The orchestrator never surfaces
/// these as crawl failures; each call site has a documented fallback.
#[derive(Debug, Error)]
pub enum AiError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for AiError {
    fn from(e: reqwest::Error) -> Self {
        AiError::Network(e.to_string())
    }
}

impl From<serde_json::Error> for AiError {
    fn from(e: serde_json::Error) -> Self {
        AiError::Parse(e.to_string())
    }
}

/// Whether to keep expanding the crawl, with the filter's reasoning.
/// Returned on the "stop" path too, never raised.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContinueDecision {
    pub should_continue: bool,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub confidence: f32,
}

/// One link scored for crawl priority.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedLink {
    pub url: String,
    pub score: f32,
    #[serde(default)]
    pub reason: String,
}

/// Context handed to `should_continue`.
#[derive(Debug, Clone)]
pub struct ContinueContext<'a> {
    pub query: &'a str,
    pub depth: u32,
    pub max_depth: u32,
    pub pages_collected: usize,
    pub recent_titles: &'a [String],
}

/// Decides which frontier links deserve a fetch and whether the crawl
/// should keep going. Implementations may call an LLM or stay local;
/// every method is allowed to fail and every call site degrades
/// gracefully when it does.
#[async_trait]
pub trait RelevanceFilter: Send + Sync {
    /// Should the crawl expand another depth level?
    async fn should_continue(&self, ctx: ContinueContext<'_>)
    -> Result<ContinueDecision, AiError>;

    /// Order-preserving subset of `links` that satisfy the quality
    /// criterion.
    async fn filter_links(
        &self,
        links: &[LinkRecord],
        quality_criterion: &str,
        query: &str,
    ) -> Result<Vec<LinkRecord>, AiError>;

    /// Links scored for crawl priority, highest first.
    async fn rank_links(
        &self,
        query: &str,
        links: &[LinkRecord],
        context: &str,
    ) -> Result<Vec<RankedLink>, AiError>;
}
