//! Extractor configuration.

use crate::error::{ExtractError, Result};

/// Environment variable for the OpenRouter API key.
pub const OPENROUTER_API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Environment variable overriding the model candidate list
/// (comma-separated model identifiers, tried in order).
pub const MODELS_ENV: &str = "TASKGRAM_MODELS";

/// Default candidate models, tried in order until one succeeds.
///
/// Cheap, fast models first; the list exists so a single provider outage
/// or model deprecation does not take the pipeline down.
pub const DEFAULT_MODEL_CANDIDATES: &[&str] = &[
    "google/gemini-2.0-flash-001",
    "google/gemini-flash-1.5-8b",
    "anthropic/claude-3.5-haiku",
    "openai/gpt-4o-mini",
];

fn default_max_tokens() -> u32 {
    1024
}

fn default_temperature() -> f32 {
    0.2
}

/// Configuration for the model-backed extractor.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// OpenRouter API key.
    pub api_key: String,

    /// Ordered list of candidate model identifiers.
    pub models: Vec<String>,

    /// Maximum tokens to generate.
    pub max_tokens: u32,

    /// Temperature for generation. Low by default: extraction should be
    /// as deterministic as the model allows.
    pub temperature: f32,
}

impl ExtractorConfig {
    /// Creates a configuration with the given API key and the default
    /// candidate list.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            models: DEFAULT_MODEL_CANDIDATES
                .iter()
                .map(|m| m.to_string())
                .collect(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }

    /// Creates a configuration from environment variables.
    ///
    /// A missing API key is a hard precondition failure, reported
    /// distinctly from any soft extraction outcome.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(OPENROUTER_API_KEY_ENV).map_err(|_| {
            ExtractError::Configuration(format!(
                "missing {} environment variable",
                OPENROUTER_API_KEY_ENV
            ))
        })?;

        let mut config = Self::new(api_key);
        if let Ok(models) = std::env::var(MODELS_ENV) {
            let models: Vec<String> = models
                .split(',')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string)
                .collect();
            if !models.is_empty() {
                config.models = models;
            }
        }
        Ok(config)
    }

    /// Overrides the candidate model list.
    pub fn with_models(mut self, models: Vec<String>) -> Self {
        self.models = models;
        self
    }
}
