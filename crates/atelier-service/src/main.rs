//! Main entry point for the atelier service.
//!
//! This binary runs the complete order-processing backend: it loads the
//! configuration, wires the engine with the configured storage backend
//! and assignment strategy, and serves the HTTP API next to the job
//! dispatcher.

use atelier_core::EngineBuilder;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

mod server;

/// Command-line arguments for the atelier service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

/// Main entry point for the atelier service.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging infrastructure
/// 3. Loads configuration from file
/// 4. Builds the engine with all implementations
/// 5. Runs the engine (and the API server, when enabled) until interrupted
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	tracing::info!("Started atelier");

	// Load configuration
	let config = atelier_config::from_file(&args.config)?;
	tracing::info!("Loaded configuration [{}]", config.agency.id);

	// Build the engine with the configured implementations
	let api_config = config.api.clone();
	let engine = Arc::new(EngineBuilder::new(config).build()?);

	let api_enabled = api_config.as_ref().is_some_and(|api| api.enabled);

	if api_enabled {
		let api_config = api_config.expect("api section present when enabled");
		let api_engine = Arc::clone(&engine);

		// Run both the engine and the API server concurrently
		tokio::select! {
			result = engine.run() => {
				tracing::info!("Engine finished");
				result?;
			}
			result = server::start_server(api_config, api_engine) => {
				tracing::info!("API server finished");
				result?;
			}
		}
	} else {
		tracing::info!("Starting engine only");
		engine.run().await?;
	}

	tracing::info!("Stopped atelier");
	Ok(())
}
