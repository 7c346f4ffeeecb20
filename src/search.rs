//! Web search as grounding context for generation.
//!
//! [`SearchProvider`] abstracts the search backend; [`TavilySearch`] is the
//! HTTP implementation. [`WebSearchClient`] runs one search, joins the result
//! snippets into a context block and hands it to the
//! [`CompletionClient`](crate::generation::CompletionClient).
//!
//! A failed search is reported as [`ClientFailure::Search`]; there is no
//! retry and generation is skipped in that case. An empty result list is not
//! a failure: generation still runs with an empty context.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::config::SearchConfig;
use crate::generation::{ClientFailure, ClientResult, CompletionClient};
use crate::models::RelationType;

/// Prefix of every search failure string.
pub const SEARCH_FAILURE_MARKER: &str = "❌ حدث خطأ أثناء البحث";

/// A single search request, serialized as the Tavily request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchQuery {
    /// Arabic question sent to the search engine.
    pub query: String,
    /// `basic` or `advanced`, from `[search].search_depth`.
    pub search_depth: String,
    /// Always `false`: only the raw snippets are used as context.
    pub include_answer: bool,
    /// Upper bound on returned results, from `[search].max_results`.
    pub max_results: u32,
}

impl SearchQuery {
    /// Natural-language Arabic question asking for `relation` of `word`.
    pub fn for_word(word: &str, relation: RelationType, config: &SearchConfig) -> Self {
        Self {
            query: format!("ما {} كلمة {}", relation.as_str(), word),
            search_depth: config.search_depth.clone(),
            include_answer: false,
            max_results: config.max_results,
        }
    }
}

/// A query-in, snippets-out search backend.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Returns the text content of each result, in provider order.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<String>>;
}

// ============ Web search client ============

#[derive(Clone)]
pub struct WebSearchClient {
    provider: Arc<dyn SearchProvider>,
    completion: CompletionClient,
    config: SearchConfig,
}

impl WebSearchClient {
    pub fn new(
        provider: Arc<dyn SearchProvider>,
        completion: CompletionClient,
        config: SearchConfig,
    ) -> Self {
        Self {
            provider,
            completion,
            config,
        }
    }

    /// Searches the web for `word` and asks the model using the snippets as context.
    pub async fn search_and_generate(&self, word: &str, relation: RelationType) -> ClientResult {
        let query = SearchQuery::for_word(word, relation, &self.config);
        tracing::info!(word, %relation, provider = self.provider.name(), "web searching");

        let snippets = match self.provider.search(&query).await {
            Ok(snippets) => snippets,
            Err(e) => {
                tracing::warn!(provider = self.provider.name(), error = %e, "search failed");
                return Err(ClientFailure::search(&e));
            }
        };

        tracing::debug!(results = snippets.len(), "search finished");
        let context = snippets.join("\n");
        self.completion.complete(word, &context, relation).await
    }
}

// ============ Disabled provider ============

pub struct DisabledSearch;

#[async_trait]
impl SearchProvider for DisabledSearch {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn search(&self, _query: &SearchQuery) -> Result<Vec<String>> {
        bail!("search provider is disabled")
    }
}

// ============ Tavily provider ============

/// Search provider backed by the Tavily `/search` API.
pub struct TavilySearch {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl TavilySearch {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .with_context(|| format!("{} environment variable not set", config.api_key_env))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl SearchProvider for TavilySearch {
    fn name(&self) -> &str {
        "tavily"
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<String>> {
        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .bearer_auth(&self.api_key)
            .json(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            bail!("Tavily API error {}: {}", status, body_text);
        }

        let json: serde_json::Value = response.json().await?;
        Ok(parse_tavily_response(&json))
    }
}

/// Extracts `results[*].content`, skipping results that carry no `content`.
/// A missing `results` array means no results.
fn parse_tavily_response(json: &serde_json::Value) -> Vec<String> {
    json.get("results")
        .and_then(|r| r.as_array())
        .map(|results| {
            results
                .iter()
                .filter_map(|r| r.get("content").and_then(|c| c.as_str()))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Creates the search provider named by `[search].provider`.
pub fn create_search_provider(config: &SearchConfig) -> Result<Arc<dyn SearchProvider>> {
    match config.provider.as_str() {
        "disabled" => Ok(Arc::new(DisabledSearch)),
        "tavily" => Ok(Arc::new(TavilySearch::new(config)?)),
        other => bail!("Unknown search provider: {}", other),
    }
}
