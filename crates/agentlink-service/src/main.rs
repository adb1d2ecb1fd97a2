//! Main entry point for the AgentLink service.
//!
//! This binary serves payment-gated market analysis: callers settle a
//! stablecoin invoice on-chain, present the transaction hash, and receive a
//! report backed by live market data and a two-round advisor consensus.

use agentlink_config::Config;
use agentlink_core::{AnalysisEngine, EngineBuilder};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

mod server;

/// Command-line arguments for the AgentLink service.
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

/// Main entry point for the AgentLink service.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging infrastructure
/// 3. Loads configuration from file
/// 4. Builds the analysis engine
/// 5. Serves the HTTP API until interrupted
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

	tracing::info!("Started AgentLink");

	let config = Config::from_file(&args.config).await?;
	tracing::info!("Loaded configuration [{}]", config.service.id);

	let engine = Arc::new(build_engine(config.clone())?);

	server::start_server(config.api.clone(), engine).await?;

	tracing::info!("Stopped AgentLink");
	Ok(())
}

/// Builds the analysis engine from configuration using the default
/// implementations for chain access, market data and completions.
fn build_engine(config: Config) -> Result<AnalysisEngine, Box<dyn std::error::Error>> {
	let engine = EngineBuilder::new(config).build()?;
	Ok(engine)
}
