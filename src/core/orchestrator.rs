//! Main orchestrator for reply pipeline execution.
//!
//! Walks the node graph from [`Node::ENTRY`], merges each node's patch into
//! the request-scoped state, and applies the fallback policy at synthesis.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{debug, error, info, instrument, warn};

use crate::adapters::{GenerationError, GenerationRequest, OpenAiGenerator, ReplyGenerator};
use crate::config::{ReplySettings, Settings};
use crate::domain::{PipelineState, StatePatch, NONE_BACKEND};
use crate::search::SourceLookup;

use super::classifier::IntentClassifier;
use super::pipeline::{generation_source_limit, normalize_whitespace, search_query, Node};
use super::replies;
use super::safety::SafetyGate;

/// Main pipeline orchestrator
pub struct Orchestrator {
    classifier: IntentClassifier,
    lookup: SourceLookup,
    generator: Arc<dyn ReplyGenerator>,
    location: String,
    search_limit: usize,
    reply: ReplySettings,
}

impl Orchestrator {
    /// Create an orchestrator from explicit collaborators
    pub fn new(
        lookup: SourceLookup,
        generator: Arc<dyn ReplyGenerator>,
        location: impl Into<String>,
        search_limit: usize,
        reply: ReplySettings,
    ) -> Self {
        let location = location.into();
        Self {
            classifier: IntentClassifier::new(SafetyGate::default(), location.clone()),
            lookup,
            generator,
            location,
            search_limit,
            reply,
        }
    }

    /// Build the production pipeline from settings
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let lookup =
            SourceLookup::from_settings(settings).context("Failed to build search providers")?;
        let generator =
            OpenAiGenerator::new(&settings.openai, settings.location.clone(), settings.reply)
                .context("Failed to build reply generator")?;

        if !generator.is_configured() {
            warn!("OPENAI_API_KEY is not set; replies will list sources only");
        }

        Ok(Self::new(
            lookup,
            Arc::new(generator),
            settings.location.clone(),
            settings.search.max_results,
            settings.reply,
        ))
    }

    /// Execute the pipeline for one request
    #[instrument(skip(self, state), fields(body_chars = state.body.chars().count()))]
    pub async fn run(&self, mut state: PipelineState) -> Result<PipelineState> {
        let mut node = Some(Node::ENTRY);

        while let Some(current) = node {
            let node_start = Instant::now();
            let patch = match current {
                Node::Classify => self.classify(&state),
                Node::Search => self.search(&state).await?,
                Node::Synthesize => self.synthesize(&state).await?,
            };
            state.apply(patch);

            debug!(
                node = %current,
                duration_ms = node_start.elapsed().as_millis() as u64,
                "Node completed"
            );
            node = current.next(&state);
        }

        info!(
            intent = %state.intent(),
            sources = state.sources.len(),
            search_backend = %state.search_backend,
            model = %state.model,
            "Pipeline completed"
        );
        Ok(state)
    }

    /// Classify node: safety gate then keyword intent
    fn classify(&self, state: &PipelineState) -> StatePatch {
        let classification = self.classifier.classify(&state.body);
        let patch = StatePatch::default().with_intent(classification.intent);

        match classification.refusal {
            Some(refusal) => patch
                .with_reply(refusal, NONE_BACKEND)
                .with_sources(Vec::new())
                .with_search_backend(NONE_BACKEND),
            None => patch,
        }
    }

    /// Search node: the only writer of `sources` and `search_backend`
    async fn search(&self, state: &PipelineState) -> Result<StatePatch> {
        let query = search_query(state, &self.location);
        let result = self.lookup.search(&query, self.search_limit).await?;

        Ok(StatePatch::default()
            .with_sources(result.sources)
            .with_search_backend(result.backend))
    }

    /// Synthesize node: pass-through, guardrails, then generation
    async fn synthesize(&self, state: &PipelineState) -> Result<StatePatch> {
        let intent = state.intent();

        if intent.is_unsafe() {
            if let Some(ref reply) = state.reply_text {
                return Ok(StatePatch::default().with_reply(reply.clone(), state.model.clone()));
            }
        }

        if state.sources.is_empty() {
            info!("No sources found, replying with apology");
            return Ok(StatePatch::default()
                .with_reply(replies::insufficient_sources(&self.location), NONE_BACKEND));
        }

        let limit = generation_source_limit(self.reply.max_items);
        let sources = &state.sources[..state.sources.len().min(limit)];

        let request = GenerationRequest {
            body: &state.body,
            subject: state.subject.as_deref(),
            sender_email: state.sender_email.as_deref(),
            sources,
            intent,
        };

        match self.generator.generate(&request).await {
            Ok(generated) => Ok(StatePatch::default()
                .with_reply(normalize_whitespace(&generated.text), generated.model)),
            Err(GenerationError::NotConfigured(message)) => {
                warn!(%message, "Reply generator not configured, listing sources");
                Ok(StatePatch::default().with_reply(
                    replies::generator_unconfigured(&self.location, sources),
                    NONE_BACKEND,
                ))
            }
            Err(e) => {
                error!(error = %e, "Synthesis failed");
                Err(e.into())
            }
        }
    }
}
