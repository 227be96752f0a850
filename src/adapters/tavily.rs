//! Tavily search API adapter.
//!
//! Requires an API key; only constructed when `TAVILY_API_KEY` is set.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::SearchProvider;
use crate::domain::Source;

/// Tavily search client
#[derive(Debug, Clone)]
pub struct TavilyProvider {
    /// API key sent with every search
    api_key: String,
    /// API base URL (overridable for tests)
    base_url: String,
    /// HTTP client
    client: reqwest::Client,
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    search_depth: &'static str,
    max_results: usize,
    include_answer: bool,
    include_raw_content: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: Option<String>,
    url: Option<String>,
}

impl TavilyProvider {
    /// Create a client against a custom base URL
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create Tavily HTTP client")?;

        Ok(Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn search_url(&self) -> String {
        format!("{}/search", self.base_url)
    }
}

#[async_trait]
impl SearchProvider for TavilyProvider {
    fn name(&self) -> &str {
        "tavily"
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Source>> {
        let request = SearchRequest {
            api_key: &self.api_key,
            query,
            search_depth: "basic",
            max_results,
            include_answer: false,
            include_raw_content: false,
        };

        let response = self
            .client
            .post(self.search_url())
            .json(&request)
            .send()
            .await
            .context("Failed to send Tavily search request")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Tavily API error {}: {}", status.as_u16(), body.trim());
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .context("Failed to parse Tavily response")?;

        let sources: Vec<Source> = parsed
            .results
            .iter()
            .filter_map(|hit| Source::from_hit(hit.title.as_deref(), hit.url.as_deref()))
            .collect();

        debug!(hits = sources.len(), "Tavily search returned");
        Ok(sources)
    }
}
