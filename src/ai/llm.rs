use crate::ai::{AiError, ContinueContext, ContinueDecision, RankedLink, RelevanceFilter};
use crate::records::LinkRecord;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timeout for one relevance call; slower than this and the fallback
/// behavior is the better trade.
const LLM_TIMEOUT_SECS: u64 = 30;

/// Relevance filter backed by an OpenAI-compatible chat-completions
/// endpoint. Responses must decode as the expected JSON shape; anything
/// else is an [`AiError::Parse`] and the caller's fallback applies.
pub struct LlmFilter {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Response shape for `filter_links`: the URLs worth keeping.
#[derive(Debug, Deserialize)]
struct FilterResponse {
    keep: Vec<String>,
}

impl LlmFilter {
    pub fn new(base_url: String, model: String, api_key: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(LLM_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            api_key,
        }
    }

    fn headers(&self) -> Result<HeaderMap, AiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = &self.api_key {
            let value = HeaderValue::from_str(&format!("Bearer {}", key))
                .map_err(|e| AiError::Config(e.to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// One chat round; returns the assistant message content.
    async fn chat(&self, system: &str, user: &str) -> Result<String, AiError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                WireMessage {
                    role: "system",
                    content: system,
                },
                WireMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: 0.0,
        };

        ::log::debug!("Relevance call to {} (model {})", url, self.model);

        let response = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AiError::Api(format!("{}: {}", status, error_text)));
        }

        let chat: ChatResponse = response.json().await?;
        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AiError::Api("empty completion".to_string()))
    }

    /// One chat round decoded strictly into `T` after stripping an
    /// optional markdown fence. No brace-hunting or other repair.
    async fn chat_json<T: for<'de> Deserialize<'de>>(
        &self,
        system: &str,
        user: &str,
    ) -> Result<T, AiError> {
        let raw = self.chat(system, user).await?;
        let cleaned = strip_code_blocks(&raw);
        Ok(serde_json::from_str(cleaned)?)
    }
}

/// Strip a surrounding markdown code fence from a model response.
pub fn strip_code_blocks(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

fn describe_links(links: &[LinkRecord]) -> String {
    links
        .iter()
        .map(|l| format!("- {} | {} | {}", l.url, l.text, l.context))
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl RelevanceFilter for LlmFilter {
    async fn should_continue(
        &self,
        ctx: ContinueContext<'_>,
    ) -> Result<ContinueDecision, AiError> {
        let system = "You judge whether a research crawl has gathered enough material. \
                      Respond with JSON only: \
                      {\"should_continue\": bool, \"reason\": string, \"confidence\": number}";
        let user = format!(
            "Research query: {}\nDepth: {} of {}\nPages collected: {}\nRecent page titles:\n{}",
            ctx.query,
            ctx.depth,
            ctx.max_depth,
            ctx.pages_collected,
            ctx.recent_titles.join("\n"),
        );
        self.chat_json(system, &user).await
    }

    async fn filter_links(
        &self,
        links: &[LinkRecord],
        quality_criterion: &str,
        query: &str,
    ) -> Result<Vec<LinkRecord>, AiError> {
        let system = "You prune low-quality links from a research crawl frontier. \
                      Respond with JSON only: {\"keep\": [urls worth fetching]}";
        let user = format!(
            "Research query: {}\nQuality criterion: {}\nCandidate links (url | anchor | context):\n{}",
            query,
            quality_criterion,
            describe_links(links),
        );
        let response: FilterResponse = self.chat_json(system, &user).await?;

        // Membership test against the original list keeps the input order
        let keep: std::collections::HashSet<&str> =
            response.keep.iter().map(|s| s.as_str()).collect();
        Ok(links
            .iter()
            .filter(|l| keep.contains(l.url.as_str()))
            .cloned()
            .collect())
    }

    async fn rank_links(
        &self,
        query: &str,
        links: &[LinkRecord],
        context: &str,
    ) -> Result<Vec<RankedLink>, AiError> {
        let system = "You rank links by how useful they are to a research query. \
                      Respond with JSON only: \
                      [{\"url\": string, \"score\": number in [0,1], \"reason\": string}]";
        let user = format!(
            "Research query: {}\nContext: {}\nCandidate links (url | anchor | context):\n{}",
            query,
            context,
            describe_links(links),
        );
        let mut ranked: Vec<RankedLink> = self.chat_json(system, &user).await?;
        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        Ok(ranked)
    }
}
