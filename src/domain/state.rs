//! Request-scoped pipeline state and the patches nodes emit.
//!
//! Nodes never mutate the state directly. Each returns a [`StatePatch`]
//! and the orchestrator folds it in with [`PipelineState::apply`].

use serde::{Deserialize, Serialize};

use super::intent::Intent;
use super::source::Source;

/// Sentinel identifier for "no generator used" / "no search backend".
pub const NONE_BACKEND: &str = "none";

/// Accumulating record threaded through every node of a single run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineState {
    /// User's email body (required, already trimmed)
    pub body: String,

    /// Optional email subject
    pub subject: Option<String>,

    /// Optional sender address, context only
    pub sender_email: Option<String>,

    /// Intent assigned by the classify node
    pub intent: Option<Intent>,

    /// Sources found by the search node, unique by normalized URL
    pub sources: Vec<Source>,

    /// Final reply text
    pub reply_text: Option<String>,

    /// Generator that produced the reply, or [`NONE_BACKEND`]
    pub model: String,

    /// Search provider that produced the sources, or [`NONE_BACKEND`]
    pub search_backend: String,
}

impl PipelineState {
    /// Create a fresh state for an incoming request
    pub fn new(
        body: impl Into<String>,
        subject: Option<String>,
        sender_email: Option<String>,
    ) -> Self {
        Self {
            body: body.into(),
            subject,
            sender_email,
            intent: None,
            sources: Vec::new(),
            reply_text: None,
            model: NONE_BACKEND.to_string(),
            search_backend: NONE_BACKEND.to_string(),
        }
    }

    /// Intent, defaulting to general events before classification
    pub fn intent(&self) -> Intent {
        self.intent.unwrap_or_default()
    }

    /// Merge a node's partial output. Fields absent from the patch keep
    /// their current value.
    pub fn apply(&mut self, patch: StatePatch) {
        if let Some(intent) = patch.intent {
            self.intent = Some(intent);
        }
        if let Some(sources) = patch.sources {
            self.sources = sources;
        }
        if let Some(reply_text) = patch.reply_text {
            self.reply_text = Some(reply_text);
        }
        if let Some(model) = patch.model {
            self.model = model;
        }
        if let Some(backend) = patch.search_backend {
            self.search_backend = backend;
        }
    }
}

/// Partial update produced by a node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatePatch {
    pub intent: Option<Intent>,
    pub sources: Option<Vec<Source>>,
    pub reply_text: Option<String>,
    pub model: Option<String>,
    pub search_backend: Option<String>,
}

impl StatePatch {
    pub fn with_intent(mut self, intent: Intent) -> Self {
        self.intent = Some(intent);
        self
    }

    pub fn with_sources(mut self, sources: Vec<Source>) -> Self {
        self.sources = Some(sources);
        self
    }

    pub fn with_reply(mut self, text: impl Into<String>, model: impl Into<String>) -> Self {
        self.reply_text = Some(text.into());
        self.model = Some(model.into());
        self
    }

    pub fn with_search_backend(mut self, backend: impl Into<String>) -> Self {
        self.search_backend = Some(backend.into());
        self
    }
}
