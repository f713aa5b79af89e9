//! OpenRouter API client for chat completions.
//!
//! The extractor relies only on plain text completions: one prompt in, one
//! text response out. No structured function-calling contract is used; the
//! response text is decoded defensively by [`crate::parser`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{ExtractError, Result};

/// OpenRouter chat completions endpoint.
const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// A text-completion backend.
///
/// The seam that lets the fail-over chain and the pipeline be exercised
/// without network access in tests.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Sends the messages to the given model and returns the raw response
    /// text of the first choice.
    async fn complete(&self, model: &str, messages: &[ChatMessage]) -> Result<String>;
}

/// OpenRouter API client.
#[derive(Clone)]
pub struct OpenRouterClient {
    client: reqwest::Client,
    api_key: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenRouterClient {
    /// Creates a new client with the given API key and generation settings.
    pub fn new(api_key: impl Into<String>, max_tokens: u32, temperature: f32) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            max_tokens,
            temperature,
        }
    }
}

#[async_trait]
impl ChatCompletion for OpenRouterClient {
    async fn complete(&self, model: &str, messages: &[ChatMessage]) -> Result<String> {
        let request = ChatRequest {
            model: model.to_string(),
            messages: messages.to_vec(),
            max_tokens: Some(self.max_tokens),
            temperature: Some(self.temperature),
        };

        trace!(model = %model, "Sending chat request");

        let response = self
            .client
            .post(OPENROUTER_API_URL)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("HTTP-Referer", "https://github.com/taskgram/taskgram")
            .header("X-Title", "Taskgram")
            .json(&request)
            .send()
            .await
            .map_err(|e| ExtractError::ModelInvocation(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ExtractError::ModelInvocation(format!(
                "OpenRouter API error {}: {}",
                status, text
            )));
        }

        let response: ChatResponse = response.json().await.map_err(|e| {
            ExtractError::ModelInvocation(format!("failed to decode response: {}", e))
        })?;

        debug!(
            model = %model,
            tokens = response.usage.as_ref().map_or(0, |u| u.total_tokens),
            "Chat response received"
        );

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                ExtractError::ModelInvocation("response contained no message content".to_string())
            })
    }
}

/// Chat completion request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Model identifier.
    pub model: String,

    /// Conversation messages.
    pub messages: Vec<ChatMessage>,

    /// Maximum tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Temperature for generation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// A message in the chat conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender.
    pub role: String,

    /// Text content of the message.
    pub content: String,
}

impl ChatMessage {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Chat completion response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    /// Completion choices.
    pub choices: Vec<ChatChoice>,

    /// Token usage information.
    pub usage: Option<ChatUsage>,
}

/// A choice in the completion response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    /// The message for this choice.
    pub message: ResponseMessage,
}

/// Message in a completion response.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    /// Text content of the response.
    pub content: Option<String>,
}

/// Token usage information.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatUsage {
    /// Total tokens used.
    pub total_tokens: u32,
}
