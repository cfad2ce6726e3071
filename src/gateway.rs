// =============================================================================
// gateway.rs - THE ONE DOOR TO THE LANGUAGE MODEL
// =============================================================================
//
// Every live report goes through here exactly once: one chat-completion
// request, one answer. No retries, no backoff. If the provider throws, the
// caller gets a GatewayError and the dashboard shows its generic failure
// message. That is the whole error-recovery policy.
//
// Wire contract (OpenAI-compatible chat completions):
//
//   POST {base_url}/chat/completions
//   { model, messages: [system, user], temperature, max_tokens,
//     response_format?: { type: "json_object" } }
//
//   -> { choices: [ { message: { content: "..." } } ] }
//
// Only choices[0].message.content is ever read.
//
// The HTTP part hides behind the ChatTransport trait so the gateway's
// contract (single attempt, fail fast) can be tested without a network.
// =============================================================================

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

use crate::circuit_breaker::CircuitBreaker;
use crate::metrics::MetricsCollector;
use crate::query::Prompt;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("provider request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("provider response envelope was not valid JSON: {0}")]
    Envelope(#[from] serde_json::Error),
    #[error("provider response contained no completion choice")]
    NoChoice,
    #[error("provider returned an empty completion")]
    EmptyContent,
    #[error("circuit breaker open, provider call skipped")]
    CircuitOpen,
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: String,
}

/// Request body for the chat-completion endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

impl ChatRequest {
    /// Two messages, system then user, plus the prompt's fixed parameters.
    pub fn from_prompt(prompt: &Prompt) -> Self {
        ChatRequest {
            model: prompt.params.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: prompt.system.clone(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.user.clone(),
                },
            ],
            temperature: prompt.params.temperature,
            max_tokens: prompt.params.max_tokens,
            response_format: prompt.params.json_mode.then(|| ResponseFormat {
                kind: "json_object".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: Option<ChoiceMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

impl ChatResponse {
    /// `choices[0].message.content`, or the reason there isn't one.
    pub fn into_content(self) -> Result<String, GatewayError> {
        let first = self.choices.into_iter().next().ok_or(GatewayError::NoChoice)?;
        let content = first
            .message
            .and_then(|m| m.content)
            .ok_or(GatewayError::EmptyContent)?;
        if content.trim().is_empty() {
            return Err(GatewayError::EmptyContent);
        }
        Ok(content)
    }
}

// =============================================================================
// Transport
// =============================================================================

/// Something that can carry one chat request to a provider and bring the
/// envelope back.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, GatewayError>;
}

/// reqwest-backed transport for OpenAI-compatible endpoints.
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HttpTransport {
    /// `base_url` like `https://api.openai.com/v1`, no trailing slash needed.
    pub fn new(base_url: &str, api_key: String, timeout: Duration) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("WatchdogEngine/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key,
        })
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, GatewayError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

// =============================================================================
// Gateway
// =============================================================================

/// Sends prompts to the provider. One attempt per call, always.
pub struct ModelGateway {
    transport: Arc<dyn ChatTransport>,
    breaker: Arc<CircuitBreaker>,
    metrics: Arc<MetricsCollector>,
}

impl ModelGateway {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        breaker: Arc<CircuitBreaker>,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            transport,
            breaker,
            metrics,
        }
    }

    /// Submit the prompt and return the raw text of the first completion.
    pub async fn complete(&self, prompt: &Prompt) -> Result<String, GatewayError> {
        if !self.breaker.allow_request() {
            self.metrics.increment_circuit_rejections();
            return Err(GatewayError::CircuitOpen);
        }

        let request = ChatRequest::from_prompt(prompt);
        debug!(
            kind = %prompt.kind,
            model = %request.model,
            temperature = request.temperature,
            max_tokens = request.max_tokens,
            json_mode = request.response_format.is_some(),
            "Sending prompt to provider"
        );

        let started = Instant::now();
        let result = self.transport.send(&request).await;
        let elapsed = started.elapsed();
        self.metrics.record_gateway_call(elapsed);

        let response = match result {
            Ok(response) => {
                self.breaker.record_success();
                response
            }
            Err(e) => {
                self.breaker.record_failure();
                self.metrics.increment_gateway_failures();
                warn!(kind = %prompt.kind, error = %e, "Provider call failed");
                return Err(e);
            }
        };

        match response.into_content() {
            Ok(content) => {
                debug!(
                    kind = %prompt.kind,
                    bytes = content.len(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Provider answered"
                );
                Ok(content)
            }
            Err(e) => {
                self.metrics.increment_gateway_failures();
                warn!(kind = %prompt.kind, error = %e, "Provider answered with nothing usable");
                Err(e)
            }
        }
    }
}
