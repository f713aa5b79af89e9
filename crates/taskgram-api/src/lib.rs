//! HTTP surface of Taskgram.
//!
//! This crate wires the extractor and the store into the HTTP routes:
//! - `POST /webhook`: Telegram update intake; acknowledges every delivery
//!   with a 200 and runs the message-to-task pipeline internally
//! - `POST /api/extract`: direct extraction with conventional error
//!   reporting, optionally writing the task
//! - `GET /api/health`: liveness probe
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use taskgram_api::{serve, ApiConfig, AppState};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let state = AppState::new(/* ... */);
//!     let config = ApiConfig::default();
//!
//!     serve(config, state).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod pipeline;
pub mod router;
pub mod state;
pub mod types;

pub use config::ApiConfig;
pub use error::{ApiError, Result};
pub use pipeline::{PipelineError, PipelineOutcome};
pub use router::{create_router, serve};
pub use state::AppState;
