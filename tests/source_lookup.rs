//! Source Lookup Integration Tests
//!
//! Tests for provider fallback, backend attribution, deduplication and the
//! HTTP adapters behind the lookup.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use eventmail::adapters::{DuckDuckGoProvider, SearchProvider, TavilyProvider};
use eventmail::{SearchError, Source, SourceLookup};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Scripted provider recording every query it receives
struct ScriptedProvider {
    name: &'static str,
    response: Option<Vec<Source>>,
    calls: AtomicUsize,
    queries: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    fn ok(name: &'static str, sources: Vec<Source>) -> Arc<Self> {
        Arc::new(Self {
            name,
            response: Some(sources),
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        })
    }

    fn failing(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            response: None,
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchProvider for ScriptedProvider {
    fn name(&self) -> &str {
        self.name
    }

    async fn search(&self, query: &str, _max_results: usize) -> Result<Vec<Source>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.to_string());
        match self.response {
            Some(ref sources) => Ok(sources.clone()),
            None => anyhow::bail!("{} is down", self.name),
        }
    }
}

fn sample_sources() -> Vec<Source> {
    vec![
        Source::new("Tech Meetup", "https://example.com/meetup"),
        Source::new("Tech Meetup (mirror)", "  HTTPS://EXAMPLE.COM/MEETUP "),
        Source::new("Startup Weekend", "https://example.com/startup"),
        Source::new("Hackathon", "https://example.com/hack"),
    ]
}

const HINT: &str = "Surat events recent 2025 2024";

#[tokio::test]
async fn test_primary_success_is_used() {
    let primary = ScriptedProvider::ok("tavily", sample_sources());
    let secondary =
        ScriptedProvider::ok("duckduckgo", vec![Source::new("Other", "https://other.example")]);
    let lookup = SourceLookup::new(Some(primary.clone()), secondary.clone(), HINT);

    let result = lookup.search("tech meetups", 6).await.unwrap();

    assert_eq!(result.backend, "tavily");
    assert_eq!(result.sources.len(), 3);
    assert_eq!(result.sources[0].title, "Tech Meetup");
    assert_eq!(primary.calls(), 1);
    assert_eq!(secondary.calls(), 0);
}

#[tokio::test]
async fn test_query_is_augmented_with_hint() {
    let primary = ScriptedProvider::ok("tavily", sample_sources());
    let secondary = ScriptedProvider::ok("duckduckgo", Vec::new());
    let lookup = SourceLookup::new(Some(primary.clone()), secondary, HINT);

    lookup.search("  tech meetups  ", 6).await.unwrap();

    let queries = primary.queries.lock().unwrap();
    assert_eq!(queries.as_slice(), ["tech meetups Surat events recent 2025 2024"]);
}

#[tokio::test]
async fn test_primary_error_falls_back_to_secondary() {
    let primary = ScriptedProvider::failing("tavily");
    let secondary = ScriptedProvider::ok("duckduckgo", sample_sources());
    let lookup = SourceLookup::new(Some(primary.clone()), secondary.clone(), HINT);

    let result = lookup.search("tech", 6).await.unwrap();

    assert_eq!(result.backend, "duckduckgo");
    assert_eq!(result.sources.len(), 3);
    assert_eq!(primary.calls(), 1);
    assert_eq!(secondary.calls(), 1);
}

#[tokio::test]
async fn test_primary_empty_after_dedup_falls_back() {
    // Only blank URLs: empty after dedup
    let primary = ScriptedProvider::ok("tavily", vec![Source::new("Blank", "   ")]);
    let secondary = ScriptedProvider::ok("duckduckgo", sample_sources());
    let lookup = SourceLookup::new(Some(primary.clone()), secondary.clone(), HINT);

    let result = lookup.search("tech", 6).await.unwrap();

    assert_eq!(result.backend, "duckduckgo");
    assert_eq!(primary.calls(), 1);
    assert_eq!(secondary.calls(), 1);
}

#[tokio::test]
async fn test_without_primary_uses_secondary_only() {
    let secondary = ScriptedProvider::ok("duckduckgo", sample_sources());
    let lookup = SourceLookup::new(None, secondary.clone(), HINT);

    let result = lookup.search("tech", 2).await.unwrap();

    assert_eq!(result.backend, "duckduckgo");
    assert_eq!(result.sources.len(), 2);
    assert_eq!(secondary.calls(), 1);
}

#[tokio::test]
async fn test_secondary_failure_is_search_unavailable() {
    let primary = ScriptedProvider::failing("tavily");
    let secondary = ScriptedProvider::failing("duckduckgo");
    let lookup = SourceLookup::new(Some(primary.clone()), secondary.clone(), HINT);

    let err = lookup.search("tech", 6).await.unwrap_err();

    let SearchError::Unavailable { ref source } = err;
    assert!(source.to_string().contains("duckduckgo is down"));
    assert!(err.to_string().starts_with("Web search is currently unavailable"));
    // One-shot: each provider tried exactly once
    assert_eq!(primary.calls(), 1);
    assert_eq!(secondary.calls(), 1);
}

#[tokio::test]
async fn test_secondary_empty_is_not_an_error() {
    let lookup = SourceLookup::new(None, ScriptedProvider::ok("duckduckgo", Vec::new()), HINT);

    let result = lookup.search("tech", 6).await.unwrap();
    assert!(result.sources.is_empty());
    assert_eq!(result.backend, "duckduckgo");
}

#[tokio::test]
async fn test_lookup_is_idempotent_for_fixed_results() {
    let secondary = ScriptedProvider::ok("duckduckgo", sample_sources());
    let lookup = SourceLookup::new(None, secondary, HINT);

    let first = lookup.search("tech meetups", 6).await.unwrap();
    let second = lookup.search("tech meetups", 6).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_tavily_adapter_parses_results() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .and(body_partial_json(json!({
            "api_key": "tvly-test",
            "query": "garba nights",
            "search_depth": "basic",
            "max_results": 5,
            "include_answer": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"title": "Garba Night", "url": "https://example.com/garba"},
                {"title": null, "url": "https://example.com/untitled"},
                {"title": "No URL"}
            ]
        })))
        .mount(&server)
        .await;

    let provider =
        TavilyProvider::with_base_url("tvly-test", server.uri(), Duration::from_secs(5)).unwrap();
    let sources = provider.search("garba nights", 5).await.unwrap();

    assert_eq!(
        sources,
        vec![
            Source::new("Garba Night", "https://example.com/garba"),
            Source::new("https://example.com/untitled", "https://example.com/untitled"),
        ]
    );
}

#[tokio::test]
async fn test_tavily_adapter_surfaces_http_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let provider =
        TavilyProvider::with_base_url("bad-key", server.uri(), Duration::from_secs(5)).unwrap();
    let err = provider.search("garba", 5).await.unwrap_err();
    assert!(err.to_string().contains("401"));
}

fn results_page(results: &[(&str, &str)]) -> String {
    let body: String = results
        .iter()
        .map(|(title, href)| {
            format!(
                r#"<div class="result results_links"><h2 class="result__title"><a class="result__a" href="{href}">{title}</a></h2></div>"#
            )
        })
        .collect();
    format!("<html><body><div id=\"links\">{body}</div></body></html>")
}

#[tokio::test]
async fn test_duckduckgo_adapter_reads_results_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("q", "cricket Surat"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_string(results_page(&[
                    (
                        "Cricket league",
                        "//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fcricket&amp;rut=x",
                    ),
                    ("Stadium", "https://example.com/stadium"),
                ])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let provider = DuckDuckGoProvider::with_base_url(server.uri(), Duration::from_secs(5)).unwrap();
    let sources = provider.search("cricket Surat", 6).await.unwrap();

    assert_eq!(
        sources,
        vec![
            Source::new("Cricket league", "https://example.com/cricket"),
            Source::new("Stadium", "https://example.com/stadium"),
        ]
    );
}

#[tokio::test]
async fn test_duckduckgo_adapter_surfaces_http_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let provider = DuckDuckGoProvider::with_base_url(server.uri(), Duration::from_secs(5)).unwrap();
    let err = provider.search("cricket", 6).await.unwrap_err();
    assert!(err.to_string().contains("403"));
}

#[tokio::test]
async fn test_http_fallback_end_to_end() {
    let tavily = MockServer::start().await;
    let ddg = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&tavily)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(results_page(&[("Textile expo", "https://example.com/expo")])),
        )
        .expect(1)
        .mount(&ddg)
        .await;

    let primary =
        TavilyProvider::with_base_url("tvly-test", tavily.uri(), Duration::from_secs(5)).unwrap();
    let secondary = DuckDuckGoProvider::with_base_url(ddg.uri(), Duration::from_secs(5)).unwrap();
    let lookup = SourceLookup::new(Some(Arc::new(primary)), Arc::new(secondary), HINT);

    let result = lookup.search("expos", 6).await.unwrap();
    assert_eq!(result.backend, "duckduckgo");
    assert_eq!(result.sources, vec![Source::new("Textile expo", "https://example.com/expo")]);
}
