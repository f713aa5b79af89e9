//! LLM-backed task extraction for Taskgram.
//!
//! This crate turns a free-form chat message into either "not a task" or a
//! structured task draft, by prompting a generative text model and decoding
//! its JSON response defensively.
//!
//! # Environment Variables
//!
//! Required:
//! - `OPENROUTER_API_KEY`: API key for the model provider
//!
//! Optional:
//! - `TASKGRAM_MODELS`: comma-separated candidate model list, tried in order
//!
//! # Example
//!
//! ```no_run
//! use taskgram_extractor::{Extractor, ExtractorConfig, ModelExtractor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractorConfig::from_env()?;
//!     let extractor = ModelExtractor::new(config)?;
//!
//!     let now = "2024-01-15T10:00:00+06:00".parse()?;
//!     let result = extractor
//!         .extract("Need to prepare the report by tomorrow evening", now, "Asia/Almaty")
//!         .await?;
//!
//!     println!("{:?}", result);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod extractor;
pub mod parser;
pub mod prompt;

pub use client::{ChatCompletion, ChatMessage, OpenRouterClient};
pub use config::{ExtractorConfig, DEFAULT_MODEL_CANDIDATES, MODELS_ENV, OPENROUTER_API_KEY_ENV};
pub use error::{ExtractError, Result};
pub use extractor::{Extractor, ModelExtractor};
pub use parser::{parse_extraction, strip_code_fences, ExtractResult, ParseError, TaskDraft};
