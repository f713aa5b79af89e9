//! Taskgram API server binary.
//!
//! Start the server with:
//! ```bash
//! DATABASE_URL=postgres://... OPENROUTER_API_KEY=xxx cargo run -p taskgram-api
//! ```

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use taskgram_api::{serve, ApiConfig, AppState};
use taskgram_extractor::{ExtractorConfig, ModelExtractor};
use taskgram_store::PgStore;

/// Taskgram API - turn chat messages into tracked tasks
#[derive(Parser, Debug)]
#[command(name = "taskgram-api")]
#[command(about = "Webhook and extraction API for the Taskgram task tracker")]
struct Args {
    /// Host to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to bind to
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Verbose logging (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let _ = dotenvy::dotenv();

    // Initialize logging based on verbosity
    let filter = match args.verbose {
        0 => "taskgram_api=info,taskgram_extractor=info,taskgram_store=info",
        1 => "taskgram_api=debug,taskgram_extractor=debug,taskgram_store=debug",
        2 => "taskgram_api=trace,taskgram_extractor=trace,taskgram_store=trace",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| "DATABASE_URL environment variable is required")?;

    let store = PgStore::connect(&database_url).await?;
    store.migrate().await?;
    tracing::info!("Database ready");

    let extractor = ModelExtractor::new(ExtractorConfig::from_env()?)?;

    let config = ApiConfig::new(args.host, args.port).with_env_timezone();
    tracing::info!(
        timezone = %config.timezone,
        offset_seconds = config.utc_offset.local_minus_utc(),
        "Deadline inference timezone configured"
    );

    let state = AppState::new(config.clone(), Arc::new(store), Arc::new(extractor));

    serve(config, state).await?;
    Ok(())
}
