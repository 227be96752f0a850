//! DuckDuckGo adapter (keyless secondary search backend).
//!
//! Fetches the HTML results page and reads the result title anchors. Result
//! links usually point at the `/l/?uddg=` redirector, which is decoded back
//! to the destination URL.

use std::sync::LazyLock;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

use super::SearchProvider;
use crate::domain::Source;

const USER_AGENT: &str = concat!("eventmail/", env!("CARGO_PKG_VERSION"));

static RESULT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.result:not(.result--ad)").expect("valid selector"));
static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.result__a[href]").expect("valid selector"));

/// DuckDuckGo search client
#[derive(Debug, Clone)]
pub struct DuckDuckGoProvider {
    base_url: String,
    client: reqwest::Client,
}

impl DuckDuckGoProvider {
    /// Create a client against a results-page base URL
    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create DuckDuckGo HTTP client")?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoProvider {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Source>> {
        let response = self
            .client
            .get(format!("{}/", self.base_url))
            .query(&[("q", query)])
            .send()
            .await
            .context("Failed to send DuckDuckGo search request")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("DuckDuckGo returned HTTP {}", status.as_u16());
        }

        let html = response
            .text()
            .await
            .context("Failed to read DuckDuckGo results page")?;

        let sources = parse_results_page(&html, max_results);
        debug!(hits = sources.len(), "DuckDuckGo search returned");
        Ok(sources)
    }
}

/// Organic results in page order, ads skipped
fn parse_results_page(html: &str, max_results: usize) -> Vec<Source> {
    let document = Html::parse_document(html);

    document
        .select(&RESULT_SELECTOR)
        .filter_map(|result| result.select(&TITLE_SELECTOR).next())
        .filter_map(|anchor| {
            let url = anchor.value().attr("href").and_then(result_url)?;
            let title = anchor_text(anchor);
            Source::from_hit(Some(title.as_str()), Some(url.as_str()))
        })
        .take(max_results)
        .collect()
}

fn anchor_text(anchor: ElementRef<'_>) -> String {
    anchor.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}

/// Destination URL of a result link. Redirector links are decoded,
/// non-HTTP links rejected.
fn result_url(href: &str) -> Option<String> {
    let href = href.trim();
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else if href.starts_with('/') {
        format!("https://duckduckgo.com{href}")
    } else {
        href.to_string()
    };

    let parsed = Url::parse(&absolute).ok()?;
    let is_redirect = parsed
        .host_str()
        .is_some_and(|host| host.ends_with("duckduckgo.com"))
        && parsed.path().starts_with("/l/");

    let target = if is_redirect {
        let (_, uddg) = parsed.query_pairs().find(|(key, _)| key == "uddg")?;
        let mut dest = Url::parse(uddg.trim()).ok()?;
        dest.set_fragment(None);
        dest
    } else {
        parsed
    };

    matches!(target.scheme(), "http" | "https").then(|| target.to_string())
}
