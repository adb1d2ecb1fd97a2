//! Market data module for the AgentLink service.
//!
//! This module provides interfaces and implementations for fetching token
//! market statistics from public exchange APIs. Sources are tried in the
//! configured order, and a simulated quote can stand in when all of them
//! fail so that a paid request is never left without data.

use agentlink_config::MarketConfig;
use agentlink_types::MarketData;
use async_trait::async_trait;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod coingecko;
	pub mod crypto_com;
}

/// User agent sent to public market data APIs.
pub const USER_AGENT: &str = "AgentLink/1.0";

/// Source label for simulated data.
pub const SIMULATION_SOURCE: &str = "Simulation";

/// Errors that can occur during market data operations.
#[derive(Debug, Error)]
pub enum PriceError {
	/// Error that occurs during network communication with a data source.
	#[error("Network error: {0}")]
	Network(String),
	/// The source answered with an unexpected body.
	#[error("Invalid response: {0}")]
	InvalidResponse(String),
	/// The source has no data for the symbol.
	#[error("Token not supported: {0}")]
	TokenNotSupported(String),
	/// Every source failed and simulation is disabled.
	#[error("Market data unavailable for {0}")]
	Unavailable(String),
	/// Error that occurs when configuration is invalid.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the interface for market data sources.
#[async_trait]
pub trait PriceSourceInterface: Send + Sync {
	/// Short name used in logs.
	fn name(&self) -> &str;

	/// Fetches current statistics for an upper-case ticker symbol.
	async fn fetch(&self, symbol: &str) -> Result<MarketData, PriceError>;
}

/// Builds the HTTP client shared by the built-in sources.
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client, PriceError> {
	reqwest::Client::builder()
		.timeout(timeout)
		.user_agent(USER_AGENT)
		.build()
		.map_err(|e| PriceError::Configuration(format!("Failed to build HTTP client: {}", e)))
}

/// Service that queries market data sources in order.
pub struct MarketDataService {
	sources: Vec<Arc<dyn PriceSourceInterface>>,
	simulation_fallback: bool,
}

impl MarketDataService {
	pub fn new(sources: Vec<Arc<dyn PriceSourceInterface>>, simulation_fallback: bool) -> Self {
		Self {
			sources,
			simulation_fallback,
		}
	}

	/// Creates the sources named in the configuration.
	pub fn from_config(config: &MarketConfig) -> Result<Self, PriceError> {
		use implementations::{coingecko::CoinGeckoSource, crypto_com::CryptoComSource};

		let timeout = Duration::from_secs(config.timeout_seconds);
		let mut sources: Vec<Arc<dyn PriceSourceInterface>> = Vec::new();
		for name in &config.sources {
			let source: Arc<dyn PriceSourceInterface> = match name.as_str() {
				"crypto_com" => Arc::new(CryptoComSource::new(&config.crypto_com_url, timeout)?),
				"coingecko" => Arc::new(CoinGeckoSource::new(&config.coingecko_url, timeout)?),
				other => {
					return Err(PriceError::Configuration(format!(
						"Unknown market source: {}",
						other
					)))
				}
			};
			sources.push(source);
		}

		Ok(Self::new(sources, config.simulation_fallback))
	}

	/// Returns data from the first source that answers.
	///
	/// Source errors are logged and the next source is tried. When all fail,
	/// simulated data is returned if enabled.
	pub async fn fetch(&self, symbol: &str) -> Result<MarketData, PriceError> {
		for source in &self.sources {
			match source.fetch(symbol).await {
				Ok(data) => {
					tracing::info!(
						source = source.name(),
						symbol,
						price = data.price,
						"Market data acquired"
					);
					return Ok(data);
				}
				Err(e) => {
					tracing::warn!(source = source.name(), symbol, error = %e, "Market source failed");
				}
			}
		}

		if self.simulation_fallback {
			tracing::warn!(symbol, "All market sources failed, using simulated data");
			return Ok(simulate());
		}

		Err(PriceError::Unavailable(symbol.to_string()))
	}
}

/// Generates a plausible random quote.
pub fn simulate() -> MarketData {
	let mut rng = rand::thread_rng();
	let price: f64 = rng.gen_range(10_000.0..60_000.0);
	let volume: f64 = rng.gen_range(0.0..10_000_000.0);
	let change: f64 = rng.gen_range(-10.0..10.0);

	MarketData {
		source: SIMULATION_SOURCE.to_string(),
		price: (price * 100.0).round() / 100.0,
		high: None,
		low: None,
		volume: volume.floor(),
		change: (change * 100.0).round() / 100.0,
	}
}

/// Reads a number that a JSON API may encode either as a number or a string.
pub(crate) fn lenient_f64(value: &serde_json::Value) -> Option<f64> {
	match value {
		serde_json::Value::Number(n) => n.as_f64(),
		serde_json::Value::String(s) => s.trim().parse().ok(),
		_ => None,
	}
}
