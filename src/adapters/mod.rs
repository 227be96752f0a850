//! Adapter interfaces for external systems.
//!
//! Adapters provide a unified interface for the two kinds of external
//! services the pipeline talks to:
//! - [`SearchProvider`]: web search backends (Tavily, DuckDuckGo)
//! - [`ReplyGenerator`]: generative text backends (OpenAI-compatible chat)

pub mod duckduckgo;
pub mod openai;
pub mod tavily;

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Intent, Source};

pub use duckduckgo::DuckDuckGoProvider;
pub use openai::OpenAiGenerator;
pub use tavily::TavilyProvider;

/// Trait for web search backends
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Backend identifier reported to callers (e.g. "tavily")
    fn name(&self) -> &str;

    /// Run a query and return raw (not yet deduplicated) hits
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Source>>;
}

/// Everything the generator needs to draft one reply
#[derive(Debug, Clone)]
pub struct GenerationRequest<'a> {
    pub body: &'a str,
    pub subject: Option<&'a str>,
    pub sender_email: Option<&'a str>,
    pub sources: &'a [Source],
    pub intent: Intent,
}

/// Output from a successful generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    /// Reply text (never empty)
    pub text: String,

    /// Identifier of the model that produced it
    pub model: String,
}

/// Generation errors
#[derive(Debug, Error)]
pub enum GenerationError {
    /// No credential configured. Callers degrade instead of failing.
    #[error("{0}")]
    NotConfigured(String),

    /// Backend returned no usable text
    #[error("Reply generator returned an empty response")]
    EmptyResponse,

    /// Timeout, transport error, bad status or malformed payload
    #[error("Reply generation failed: {0}")]
    Backend(String),
}

/// Trait for generative reply backends
#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    /// Draft a reply citing the given sources
    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<Generated, GenerationError>;
}
