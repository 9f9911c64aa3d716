use crate::ai::{AiError, ContinueContext, ContinueDecision, RankedLink, RelevanceFilter};
use crate::records::LinkRecord;
use async_trait::async_trait;
use std::collections::HashSet;

/// Bonus applied when the full query appears verbatim in the link text.
const EXACT_PHRASE_BONUS: f32 = 0.3;

/// Weight of keyword overlap vs. domain authority in the final score.
const OVERLAP_WEIGHT: f32 = 0.7;
const AUTHORITY_WEIGHT: f32 = 0.3;

/// Local relevance filter: keyword overlap plus a small domain-authority
/// table. Used when no LLM endpoint is configured, and as the reference
/// scoring policy for tests.
#[derive(Debug, Default)]
pub struct HeuristicFilter;

impl HeuristicFilter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RelevanceFilter for HeuristicFilter {
    async fn should_continue(
        &self,
        ctx: ContinueContext<'_>,
    ) -> Result<ContinueDecision, AiError> {
        // Purely budget-driven: expand while depth remains
        let should_continue = ctx.depth < ctx.max_depth;
        Ok(ContinueDecision {
            should_continue,
            reason: if should_continue {
                format!("depth {} of {} remaining", ctx.depth, ctx.max_depth)
            } else {
                "depth budget exhausted".to_string()
            },
            confidence: 1.0,
        })
    }

    async fn filter_links(
        &self,
        links: &[LinkRecord],
        _quality_criterion: &str,
        query: &str,
    ) -> Result<Vec<LinkRecord>, AiError> {
        // The free-text criterion needs a language model; locally we keep
        // links with any keyword overlap at all
        Ok(links
            .iter()
            .filter(|link| link_score(link, query) > 0.0)
            .cloned()
            .collect())
    }

    async fn rank_links(
        &self,
        query: &str,
        links: &[LinkRecord],
        _context: &str,
    ) -> Result<Vec<RankedLink>, AiError> {
        let mut ranked: Vec<RankedLink> = links
            .iter()
            .map(|link| RankedLink {
                url: link.url.clone(),
                score: link_score(link, query),
                reason: String::new(),
            })
            .collect();
        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        Ok(ranked)
    }
}

/// Scores a link against the query in [0, 1].
pub fn link_score(link: &LinkRecord, query: &str) -> f32 {
    let haystack = format!("{} {}", link.text, link.context);
    let overlap = keyword_overlap(&haystack, query);
    let authority = domain_authority(&link.url);
    (overlap * OVERLAP_WEIGHT + authority * AUTHORITY_WEIGHT).min(1.0)
}

/// Fraction of query words present in the text, plus an exact-phrase bonus.
fn keyword_overlap(text: &str, query: &str) -> f32 {
    let text_lower = text.to_lowercase();
    let query_lower = query.to_lowercase();

    let query_words: HashSet<&str> = query_lower.split_whitespace().collect();
    if query_words.is_empty() {
        return 0.0;
    }
    let text_words: HashSet<&str> = text_lower.split_whitespace().collect();

    let overlap = query_words.intersection(&text_words).count();
    let base = overlap as f32 / query_words.len() as f32;

    let phrase_bonus = if text_lower.contains(&query_lower) {
        EXACT_PHRASE_BONUS
    } else {
        0.0
    };

    (base + phrase_bonus).min(1.0)
}

/// Rough authority score for well-known publisher domains. The exact
/// weights are tunable, not load-bearing.
fn domain_authority(url: &str) -> f32 {
    let host = url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
        .unwrap_or_default();

    match host.as_str() {
        h if h.ends_with(".gov") => 0.9,
        h if h.ends_with(".edu") => 0.85,
        h if h.contains("wikipedia.org") => 0.85,
        h if h.contains("stackoverflow.com") => 0.8,
        h if h.contains("github.com") => 0.75,
        h if h.contains("mozilla.org") || h.contains("w3.org") => 0.75,
        _ => 0.5,
    }
}
