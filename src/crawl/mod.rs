pub mod batch;

use crate::CrawlError;
use crate::ai::{ContinueContext, RelevanceFilter};
use crate::config::CrawlBudget;
use crate::fetch::Fetcher;
use crate::filter::LinkFilter;
use crate::records::{CrawlResult, CrawlStats, LinkRecord, PageRecord};
use std::collections::HashSet;
use std::sync::Arc;
use url::Url;

/// Pages fetched successfully but shorter than this are dropped from the
/// results (a quality signal, not an error).
pub const MIN_KEEP_CONTENT_LEN: usize = 100;

/// Frontier links handed to one AI quality-filter call.
pub const AI_FILTER_CHUNK: usize = 20;

/// Page titles given to the continuation check as recency context.
const RECENT_TITLE_WINDOW: usize = 10;

/// Optional AI-assisted behaviors, all off by default.
#[derive(Debug, Clone, Default)]
pub struct CrawlOptions {
    /// Free-text criterion enabling frontier quality filtering
    pub quality_criterion: Option<String>,

    /// Rank frontier links instead of taking them in discovery order
    pub rank_links: bool,

    /// Ask the relevance filter whether to stop before each level
    pub adaptive_stop: bool,
}

/// Drives a bounded-depth breadth-first expansion over the web graph.
///
/// Depth levels are strictly sequential; fetches within a level run
/// concurrently up to the budget's ceiling. The visited set guarantees
/// each URL is fetched at most once per crawl, and every AI call site
/// degrades to a local fallback on error.
pub struct CrawlOrchestrator {
    query: String,
    budget: CrawlBudget,
    fetcher: Arc<dyn Fetcher>,
    relevance: Option<Arc<dyn RelevanceFilter>>,
    link_filter: LinkFilter,
    options: CrawlOptions,
    visited: HashSet<String>,
}

impl CrawlOrchestrator {
    pub fn new(
        query: String,
        budget: CrawlBudget,
        fetcher: Arc<dyn Fetcher>,
        relevance: Option<Arc<dyn RelevanceFilter>>,
        link_filter: LinkFilter,
        options: CrawlOptions,
    ) -> Self {
        Self {
            query,
            budget,
            fetcher,
            relevance,
            link_filter,
            options,
            visited: HashSet::new(),
        }
    }

    /// Expands from the given depth-0 pages until the depth budget is
    /// exhausted, the frontier dries up, or the relevance filter calls a
    /// stop. Whatever accumulated before an early stop is returned.
    pub async fn run(mut self, seeds: Vec<PageRecord>) -> Result<CrawlResult, CrawlError> {
        if seeds.is_empty() {
            return Err(CrawlError::EmptySeeds);
        }

        let mut stats = CrawlStats::default();
        for seed in &seeds {
            self.visited.insert(seed.url.clone());
            if seed.error.is_some() {
                stats.error_count += 1;
            }
        }

        let mut pages = seeds;

        for depth in 1..=self.budget.max_depth {
            let frontier = self.collect_frontier(&pages, depth - 1);
            if frontier.is_empty() {
                ::log::info!("Depth {}: frontier is empty, crawl complete", depth);
                break;
            }
            ::log::info!("Depth {}: {} candidate links", depth, frontier.len());

            if depth > 1 && !self.check_continue(depth, &pages).await {
                break;
            }

            let frontier = self.quality_filter(frontier).await;
            if frontier.is_empty() {
                ::log::info!("Depth {}: quality filter kept nothing", depth);
                break;
            }

            let selected = self.select(frontier).await;

            // Mark before fetching so nothing can re-select these URLs
            for url in &selected {
                self.visited.insert(url.clone());
            }

            if selected.is_empty() {
                ::log::info!("Depth {}: no links selected, crawl complete", depth);
                break;
            }

            let records = batch::fetch_many(
                Arc::clone(&self.fetcher),
                selected,
                depth,
                self.budget.max_concurrent_fetches,
            )
            .await;

            let mut kept = 0;
            for record in records {
                if record.error.is_some() {
                    stats.error_count += 1;
                } else if record.content.len() < MIN_KEEP_CONTENT_LEN {
                    ::log::debug!("Dropping thin page: {}", record.url);
                    stats.skipped_short += 1;
                } else {
                    kept += 1;
                    pages.push(record);
                }
            }
            ::log::info!("Depth {}: kept {} pages", depth, kept);
        }

        stats.total_pages = pages.len();
        stats.total_links = pages.iter().map(|p| p.links.len()).sum();

        Ok(CrawlResult { pages, stats })
    }

    /// Unvisited links from the previous depth's pages, in discovery
    /// order, deduplicated, with obviously uncrawlable URLs dropped.
    fn collect_frontier(&self, pages: &[PageRecord], prev_depth: u32) -> Vec<LinkRecord> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut frontier = Vec::new();

        for page in pages.iter().filter(|p| p.depth == prev_depth) {
            for link in &page.links {
                if self.visited.contains(&link.url) || seen.contains(link.url.as_str()) {
                    continue;
                }
                match Url::parse(&link.url) {
                    Ok(parsed) if self.link_filter.should_crawl(&parsed) => {}
                    _ => continue,
                }
                seen.insert(link.url.as_str());
                frontier.push(link.clone());
            }
        }

        frontier
    }

    /// Adaptive stop check. Any filter failure falls back to the budget
    /// rule (`depth < max_depth`), which is already satisfied here.
    async fn check_continue(&self, depth: u32, pages: &[PageRecord]) -> bool {
        if !self.options.adaptive_stop {
            return true;
        }
        let Some(filter) = &self.relevance else {
            return true;
        };

        let recent_titles: Vec<String> = pages
            .iter()
            .rev()
            .take(RECENT_TITLE_WINDOW)
            .map(|p| p.title.clone())
            .collect();

        let ctx = ContinueContext {
            query: &self.query,
            depth,
            max_depth: self.budget.max_depth,
            pages_collected: pages.len(),
            recent_titles: &recent_titles,
        };

        match filter.should_continue(ctx).await {
            Ok(decision) => {
                if !decision.should_continue {
                    ::log::info!(
                        "Stopping at depth {} on filter advice: {} (confidence {:.2})",
                        depth,
                        decision.reason,
                        decision.confidence
                    );
                }
                decision.should_continue
            }
            Err(e) => {
                ::log::warn!("Continuation check failed, continuing on budget: {}", e);
                true
            }
        }
    }

    /// AI quality filtering in bounded chunks; a failed chunk passes
    /// through unfiltered.
    async fn quality_filter(&self, frontier: Vec<LinkRecord>) -> Vec<LinkRecord> {
        let Some(criterion) = &self.options.quality_criterion else {
            return frontier;
        };
        let Some(filter) = &self.relevance else {
            return frontier;
        };

        let mut filtered = Vec::with_capacity(frontier.len());
        for chunk in frontier.chunks(AI_FILTER_CHUNK) {
            match filter.filter_links(chunk, criterion, &self.query).await {
                Ok(kept) => filtered.extend(kept),
                Err(e) => {
                    ::log::warn!("Quality filter failed, keeping chunk as-is: {}", e);
                    filtered.extend_from_slice(chunk);
                }
            }
        }
        filtered
    }

    /// Picks the URLs to fetch this level: ranked and thresholded when
    /// ranking is enabled and succeeds, discovery order otherwise, always
    /// truncated to the per-depth page budget.
    async fn select(&self, frontier: Vec<LinkRecord>) -> Vec<String> {
        let cap = self.budget.max_pages_per_depth;

        if self.options.rank_links {
            if let Some(filter) = &self.relevance {
                match filter.rank_links(&self.query, &frontier, "").await {
                    Ok(ranked) => {
                        let known: HashSet<&str> =
                            frontier.iter().map(|l| l.url.as_str()).collect();
                        return ranked
                            .into_iter()
                            .filter(|r| known.contains(r.url.as_str()))
                            .filter(|r| r.score >= self.budget.link_relevance_threshold)
                            .take(cap)
                            .map(|r| r.url)
                            .collect();
                    }
                    Err(e) => {
                        ::log::warn!("Ranking failed, using discovery order: {}", e);
                    }
                }
            }
        }

        frontier.into_iter().take(cap).map(|l| l.url).collect()
    }
}
