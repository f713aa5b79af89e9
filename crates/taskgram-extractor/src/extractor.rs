//! The model-backed extractor and its fail-over chain.
//!
//! Model identifiers are tried in order; any invocation failure (not just
//! "model not found") falls through to the next candidate. Only once every
//! candidate has failed does extraction report the soft "unavailable"
//! outcome, which is deliberately `NotATask` rather than an error so the
//! webhook's acknowledgement path stays unconditional.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use tracing::{info, warn};

use crate::client::{ChatCompletion, OpenRouterClient};
use crate::config::ExtractorConfig;
use crate::error::{ExtractError, Result};
use crate::parser::{parse_extraction, ExtractResult};
use crate::prompt::build_messages;

/// Classifies a chat message and extracts a structured task from it.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Extracts a task from `text`.
    ///
    /// `now` and `timezone` seed the model's deadline inference. `text`
    /// must be non-empty; callers validate that before invoking.
    ///
    /// Total model unavailability and undecodable model output are both
    /// soft outcomes (`Ok(ExtractResult::NotATask)`) in the production
    /// implementation; the `Result` return leaves implementations free to
    /// surface hard failures instead.
    async fn extract(
        &self,
        text: &str,
        now: DateTime<FixedOffset>,
        timezone: &str,
    ) -> Result<ExtractResult>;
}

/// Extractor backed by a chat-completion API with model fail-over.
pub struct ModelExtractor<C = OpenRouterClient> {
    client: C,
    models: Vec<String>,
}

impl ModelExtractor<OpenRouterClient> {
    /// Creates an extractor from configuration.
    ///
    /// Fails when the candidate list is empty; a missing API key has
    /// already failed in [`ExtractorConfig::from_env`].
    pub fn new(config: ExtractorConfig) -> Result<Self> {
        if config.models.is_empty() {
            return Err(ExtractError::Configuration(
                "model candidate list is empty".to_string(),
            ));
        }
        let client =
            OpenRouterClient::new(&config.api_key, config.max_tokens, config.temperature);
        Ok(Self {
            client,
            models: config.models,
        })
    }
}

impl<C: ChatCompletion> ModelExtractor<C> {
    /// Creates an extractor over an arbitrary backend (used in tests).
    pub fn with_client(client: C, models: Vec<String>) -> Self {
        Self { client, models }
    }

    /// Tries each candidate model in order, returning the first successful
    /// raw response. Returns `None` with the last error logged when every
    /// candidate failed.
    async fn complete_with_failover(
        &self,
        messages: &[crate::client::ChatMessage],
    ) -> Option<String> {
        let mut last_error = None;

        for model in &self.models {
            match self.client.complete(model, messages).await {
                Ok(raw) => {
                    info!(model = %model, "Model responded");
                    return Some(raw);
                }
                Err(e) => {
                    warn!(model = %model, error = %e, "Model candidate failed, trying next");
                    last_error = Some(e);
                }
            }
        }

        if let Some(e) = last_error {
            warn!(error = %e, "All model candidates failed");
        }
        None
    }
}

#[async_trait]
impl<C: ChatCompletion> Extractor for ModelExtractor<C> {
    async fn extract(
        &self,
        text: &str,
        now: DateTime<FixedOffset>,
        timezone: &str,
    ) -> Result<ExtractResult> {
        let messages = build_messages(text, now, timezone);

        let Some(raw) = self.complete_with_failover(&messages).await else {
            return Ok(ExtractResult::NotATask);
        };

        // The model's output is untrusted; anything that fails validation
        // collapses to the safe default rather than failing the caller.
        match parse_extraction(&raw) {
            Ok(result) => Ok(result),
            Err(e) => {
                warn!(error = %e, "Model output failed validation, treating as not a task");
                Ok(ExtractResult::NotATask)
            }
        }
    }
}
