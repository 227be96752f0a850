//! OpenAI-compatible chat completions adapter for reply generation.
//!
//! The generator is always constructed. When no API key is configured every
//! call fails with [`GenerationError::NotConfigured`] so the pipeline can
//! degrade instead of refusing to start.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::{GenerationError, GenerationRequest, Generated, ReplyGenerator};
use crate::config::{OpenAiSettings, ReplySettings};
use crate::domain::Source;

const TEMPERATURE: f32 = 0.4;

/// Chat completions client
#[derive(Debug, Clone)]
pub struct OpenAiGenerator {
    /// `None` when the API key is unset
    client: Option<reqwest::Client>,
    base_url: String,
    model: String,
    timeout: Duration,
    location: String,
    items: ReplySettings,
}

#[derive(Serialize)]
struct ChatApiRequest<'a> {
    model: &'a str,
    messages: [ApiMessage<'a>; 2],
    temperature: f32,
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatApiResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenAiGenerator {
    /// Create a generator from settings
    pub fn new(
        settings: &OpenAiSettings,
        location: impl Into<String>,
        items: ReplySettings,
    ) -> Result<Self, GenerationError> {
        let client = match settings.api_key {
            Some(ref key) => Some(build_client(key, settings.timeout)?),
            None => None,
        };

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            timeout: settings.timeout,
            location: location.into(),
            items,
        })
    }

    /// Whether an API key was configured
    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    async fn complete(
        &self,
        client: &reqwest::Client,
        body: &ChatApiRequest<'_>,
    ) -> Result<String, GenerationError> {
        let response = client
            .post(self.chat_url())
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    self.timed_out()
                } else {
                    GenerationError::Backend(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(GenerationError::Backend(format!(
                "HTTP {}: {}",
                status.as_u16(),
                text.trim()
            )));
        }

        let parsed: ChatApiResponse = response
            .json()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    self.timed_out()
                } else {
                    GenerationError::Backend(format!("malformed response: {e}"))
                }
            })?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .unwrap_or_default()
            .trim()
            .to_string();

        if text.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(text)
    }

    fn timed_out(&self) -> GenerationError {
        GenerationError::Backend(format!("timeout after {:?}", self.timeout))
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Strict instruction set: cite only given sources, bounded bullets
    pub(crate) fn system_prompt(&self) -> String {
        let min = self.items.min_items.max(1);
        let max = self.items.max_items.max(min);
        format!(
            "You are a helpful assistant that drafts short email replies about recent events in {location}.\n\
             Rules:\n\
             - Use ONLY the provided sources for factual claims.\n\
             - Provide {min}-{max} concise bullet items (or fewer if not enough sources), each with a clickable link.\n\
             - Be friendly and professional.\n\
             - If sources are insufficient or unclear, apologize briefly and suggest what to ask next.\n\
             - Avoid unsafe content, hate, harassment, or explicit content. If asked, refuse politely.\n\
             - Do NOT invent dates, venues, or event details that are not in sources.\n",
            location = self.location,
        )
    }

    pub(crate) fn user_prompt(&self, request: &GenerationRequest<'_>) -> String {
        let min = self.items.min_items.max(1);
        let max = self.items.max_items.max(min);
        let sources = format_sources(request.sources);
        let sources = if sources.is_empty() {
            "(no sources found)".to_string()
        } else {
            sources
        };

        format!(
            "Sender: {sender}\n\
             Subject: {subject}\n\
             Detected intent: {intent}\n\n\
             User email body:\n{body}\n\n\
             Sources:\n{sources}\n\n\
             Now draft the reply. Format:\n\
             Greeting line,\n\
             {min}-{max} bullet items with links,\n\
             Closing line.\n",
            sender = request.sender_email.unwrap_or("unknown"),
            subject = request.subject.unwrap_or(""),
            intent = request.intent,
            body = request.body,
        )
    }
}

fn build_client(api_key: &str, timeout: Duration) -> Result<reqwest::Client, GenerationError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    let auth_value = HeaderValue::from_str(&format!("Bearer {api_key}"))
        .map_err(|_| {
            GenerationError::NotConfigured("OPENAI_API_KEY has an invalid format".to_string())
        })?;
    headers.insert(AUTHORIZATION, auth_value);

    reqwest::Client::builder()
        .timeout(timeout)
        .default_headers(headers)
        .build()
        .map_err(|e| GenerationError::Backend(format!("Failed to create HTTP client: {e}")))
}

/// Numbered source list for the prompt
fn format_sources(sources: &[Source]) -> String {
    sources
        .iter()
        .enumerate()
        .map(|(i, s)| format!("{}. {} - {}", i + 1, s.title, s.url))
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl ReplyGenerator for OpenAiGenerator {
    async fn generate(
        &self,
        request: &GenerationRequest<'_>,
    ) -> Result<Generated, GenerationError> {
        let Some(ref client) = self.client else {
            return Err(GenerationError::NotConfigured(
                "OPENAI_API_KEY is not set. Configure OPENAI_API_KEY (and optionally OPENAI_MODEL) to enable replies."
                    .to_string(),
            ));
        };

        let system = self.system_prompt();
        let user = self.user_prompt(request);
        let body = ChatApiRequest {
            model: &self.model,
            messages: [
                ApiMessage {
                    role: "system",
                    content: &system,
                },
                ApiMessage {
                    role: "user",
                    content: &user,
                },
            ],
            temperature: TEMPERATURE,
        };

        let result = self.complete(client, &body).await;

        match result {
            Ok(text) => {
                debug!(model = %self.model, chars = text.len(), "Reply generated");
                Ok(Generated {
                    text,
                    model: self.model.clone(),
                })
            }
            Err(e) => {
                error!(model = %self.model, error = %e, "Reply generation failed");
                Err(e)
            }
        }
    }
}
