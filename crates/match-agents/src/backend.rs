//! Reasoning backend: the shared client behind every LLM-backed agent
//! node. Speaks the OpenAI-compatible chat-completions protocol and
//! returns the model's structured (JSON) payload, with Markdown code
//! fences stripped before parsing.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::config::BackendEndpoint;
use tribunal::NodeError;

/// Error from one backend invocation.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("backend call timed out")]
    Timeout,
    #[error("backend rate limited")]
    RateLimited,
    #[error("backend returned malformed payload: {0}")]
    Invalid(String),
    #[error("backend transport failure: {0}")]
    Transport(String),
}

impl From<BackendError> for NodeError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Timeout => NodeError::Timeout,
            BackendError::RateLimited => NodeError::RateLimited,
            BackendError::Invalid(msg) => NodeError::Invalid(msg),
            BackendError::Transport(msg) => NodeError::Transport(msg),
        }
    }
}

/// Prompt plus decoding settings for one reasoning call.
#[derive(Debug, Clone)]
pub struct PromptRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
}

/// Shared contract for the reasoning service behind all agent nodes.
#[async_trait]
pub trait ReasoningBackend: Send + Sync {
    /// Invoke the backend and return its parsed structured response.
    async fn invoke(&self, request: &PromptRequest) -> Result<Value, BackendError>;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

/// OpenAI-compatible chat-completions client.
pub struct HttpBackend {
    http: reqwest::Client,
    endpoint: BackendEndpoint,
}

impl HttpBackend {
    pub fn new(endpoint: BackendEndpoint, timeout: Duration) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        Ok(Self { http, endpoint })
    }
}

#[async_trait]
impl ReasoningBackend for HttpBackend {
    async fn invoke(&self, request: &PromptRequest) -> Result<Value, BackendError> {
        let body = ChatRequest {
            model: &self.endpoint.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: request.temperature,
        };

        let mut req = self.http.post(&self.endpoint.url).json(&body);
        if let Some(key) = &self.endpoint.api_key {
            req = req.bearer_auth(key);
        }

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                BackendError::Timeout
            } else {
                BackendError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(BackendError::RateLimited);
        }
        if !status.is_success() {
            return Err(BackendError::Transport(format!("status {status}")));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| BackendError::Invalid(e.to_string()))?;
        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| BackendError::Invalid("missing message content".into()))?;
        debug!(model = %self.endpoint.model, chars = content.len(), "backend responded");
        parse_structured(content)
    }
}

/// Strip Markdown code fences and parse the remaining JSON.
pub fn parse_structured(content: &str) -> Result<Value, BackendError> {
    let inner = if let Some(start) = content.find("```json") {
        let rest = &content[start + 7..];
        match rest.find("```") {
            Some(end) => &rest[..end],
            None => rest,
        }
    } else if let Some(start) = content.find("```") {
        let rest = &content[start + 3..];
        match rest.find("```") {
            Some(end) => &rest[..end],
            None => rest,
        }
    } else {
        content
    };
    serde_json::from_str(inner.trim()).map_err(|e| BackendError::Invalid(e.to_string()))
}
