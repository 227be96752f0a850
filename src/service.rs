//! Request boundary around the orchestrator.
//!
//! Validates the incoming request, runs the pipeline, measures latency and
//! renders either a [`ReplyResponse`] or a structured [`ErrorResponse`].

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::config::ReplySettings;
use crate::core::{replies, Orchestrator};
use crate::domain::{PipelineState, Source, NONE_BACKEND};

/// Incoming email-like query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplyRequest {
    /// Optional sender address (personalization only)
    #[serde(default)]
    pub sender_email: Option<String>,

    /// Optional subject line
    #[serde(default)]
    pub subject: Option<String>,

    /// Email body containing the question (required)
    pub body: String,
}

/// Generated reply returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyResponse {
    pub reply_text: String,
    pub sources: Vec<Source>,
    pub model: String,
    pub latency_ms: u64,
}

/// Structured error returned to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short error type identifier
    pub error: String,
    /// Human-friendly message
    pub message: String,
    /// Correlation id
    pub request_id: Option<String>,
}

impl ErrorResponse {
    fn new(error: &str, message: impl Into<String>, request_id: &str) -> Self {
        Self {
            error: error.to_string(),
            message: message.into(),
            request_id: Some(request_id.to_string()),
        }
    }
}

/// Shared entry point for handling reply requests
#[derive(Clone)]
pub struct ReplyService {
    orchestrator: Arc<Orchestrator>,
    location: String,
    reply: ReplySettings,
}

impl ReplyService {
    pub fn new(
        orchestrator: Arc<Orchestrator>,
        location: impl Into<String>,
        reply: ReplySettings,
    ) -> Self {
        Self {
            orchestrator,
            location: location.into(),
            reply,
        }
    }

    /// Handle one request. A fresh UUID is used when no request id is given.
    #[instrument(skip(self, request, request_id), fields(request_id = tracing::field::Empty))]
    pub async fn reply(
        &self,
        request: ReplyRequest,
        request_id: Option<String>,
    ) -> Result<ReplyResponse, ErrorResponse> {
        let request_id = request_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        tracing::Span::current().record("request_id", request_id.as_str());

        let start = Instant::now();

        let body = request.body.trim();
        if body.is_empty() {
            return Err(ErrorResponse::new(
                "validation_error",
                "Field 'body' must be a non-empty string.",
                &request_id,
            ));
        }

        let state = PipelineState::new(body, request.subject, request.sender_email);
        let result = match self.orchestrator.run(state).await {
            Ok(result) => result,
            Err(e) => {
                error!(%request_id, error = ?e, "Reply pipeline failed");
                let message = e.to_string();
                let message = if message.trim().is_empty() {
                    "Reply pipeline failed.".to_string()
                } else {
                    message
                };
                return Err(ErrorResponse::new("pipeline_error", message, &request_id));
            }
        };

        let latency_ms = start.elapsed().as_millis() as u64;

        let reply_text = result
            .reply_text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| replies::try_again(&self.location));

        let model = if result.model.trim().is_empty() {
            NONE_BACKEND.to_string()
        } else {
            result.model
        };

        let mut sources = result.sources;
        sources.truncate(self.reply.max_items);

        info!(%request_id, latency_ms, %model, sources = sources.len(), "Request completed");

        Ok(ReplyResponse {
            reply_text,
            sources,
            model,
            latency_ms,
        })
    }
}
