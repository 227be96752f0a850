//! Source lookup across search providers.
//!
//! Provider priority:
//! 1. Primary (keyed, only present when configured)
//! 2. Secondary (keyless)
//!
//! A primary error or an empty post-dedup result falls through to the
//! secondary. A secondary error is surfaced as [`SearchError::Unavailable`].
//! Each provider is attempted at most once per lookup.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use chrono::Datelike;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::adapters::{DuckDuckGoProvider, SearchProvider, TavilyProvider};
use crate::config::Settings;
use crate::domain::Source;

/// Search lookup errors
#[derive(Debug, Error)]
pub enum SearchError {
    /// Every provider failed
    #[error("Web search is currently unavailable. Please try again later, or configure TAVILY_API_KEY.")]
    Unavailable {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Sources plus the backend that actually produced them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupResult {
    pub sources: Vec<Source>,
    pub backend: String,
}

/// Recency/location hint appended to every query
pub fn recency_hint(location: &str, year: i32) -> String {
    format!("{location} events recent {year} {}", year - 1)
}

/// Drop entries with empty or repeated normalized URLs, keeping first-seen
/// order, and stop at `limit` entries.
pub fn dedupe_sources(sources: Vec<Source>, limit: usize) -> Vec<Source> {
    let mut seen = HashSet::new();
    let mut deduped = Vec::new();

    for source in sources {
        if deduped.len() >= limit {
            break;
        }
        let key = source.dedup_key();
        if key.is_empty() || !seen.insert(key) {
            continue;
        }
        deduped.push(source);
    }

    deduped
}

/// Provider chain with fallback
pub struct SourceLookup {
    primary: Option<Arc<dyn SearchProvider>>,
    secondary: Arc<dyn SearchProvider>,
    hint: String,
}

impl SourceLookup {
    /// Create a lookup with an explicit hint
    pub fn new(
        primary: Option<Arc<dyn SearchProvider>>,
        secondary: Arc<dyn SearchProvider>,
        hint: impl Into<String>,
    ) -> Self {
        Self {
            primary,
            secondary,
            hint: hint.into(),
        }
    }

    /// Build the provider chain from settings. The primary is only
    /// constructed when its API key is configured.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let search = &settings.search;

        let primary: Option<Arc<dyn SearchProvider>> = match search.tavily_api_key {
            Some(ref key) => Some(Arc::new(TavilyProvider::with_base_url(
                key.clone(),
                search.tavily_base_url.clone(),
                search.timeout,
            )?)),
            None => None,
        };

        let secondary: Arc<dyn SearchProvider> = Arc::new(DuckDuckGoProvider::with_base_url(
            search.duckduckgo_base_url.clone(),
            search.timeout,
        )?);

        let year = chrono::Utc::now().year();
        Ok(Self::new(primary, secondary, recency_hint(&settings.location, year)))
    }

    /// Query text actually sent to providers
    pub fn augment(&self, query: &str) -> String {
        format!("{} {}", query.trim(), self.hint)
    }

    /// Search for up to `limit` unique sources
    #[instrument(skip(self, query))]
    pub async fn search(&self, query: &str, limit: usize) -> Result<LookupResult, SearchError> {
        let augmented = self.augment(query);

        if let Some(ref primary) = self.primary {
            match primary.search(&augmented, limit).await {
                Ok(hits) => {
                    let sources = dedupe_sources(hits, limit);
                    if !sources.is_empty() {
                        info!(backend = primary.name(), count = sources.len(), "Search succeeded");
                        return Ok(LookupResult {
                            sources,
                            backend: primary.name().to_string(),
                        });
                    }
                    warn!(
                        backend = primary.name(),
                        fallback = self.secondary.name(),
                        "Primary search returned no sources, falling back"
                    );
                }
                Err(e) => {
                    warn!(
                        backend = primary.name(),
                        fallback = self.secondary.name(),
                        error = %e,
                        "Primary search failed, falling back"
                    );
                }
            }
        }

        match self.secondary.search(&augmented, limit).await {
            Ok(hits) => {
                let sources = dedupe_sources(hits, limit);
                info!(backend = self.secondary.name(), count = sources.len(), "Search succeeded");
                Ok(LookupResult {
                    sources,
                    backend: self.secondary.name().to_string(),
                })
            }
            Err(e) => {
                warn!(backend = self.secondary.name(), error = %e, "Secondary search failed");
                Err(SearchError::Unavailable { source: e.into() })
            }
        }
    }
}
