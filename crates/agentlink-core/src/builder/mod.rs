//! Builder for constructing analysis engines.
//!
//! Components default to the implementations named in configuration. Each
//! can be replaced, which is how tests and alternative deployments inject
//! their own receipt source, completion backend or market feeds.

use crate::audit::AuditLog;
use crate::engine::AnalysisEngine;
use agentlink_chain::implementations::evm::alloy::AlloyReceiptSource;
use agentlink_chain::{ReceiptPoller, ReceiptSource};
use agentlink_config::Config;
use agentlink_consensus::{CompletionInterface, ConsensusEngine, RoundSettings};
use agentlink_payment::PaymentGate;
use agentlink_price::{MarketDataService, PriceSourceInterface};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during engine construction.
#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
}

/// Builder for an [`AnalysisEngine`] with pluggable components.
pub struct EngineBuilder {
	config: Config,
	receipt_source: Option<Arc<dyn ReceiptSource>>,
	completion_client: Option<Arc<dyn CompletionInterface>>,
	market_sources: Option<Vec<Arc<dyn PriceSourceInterface>>>,
}

impl EngineBuilder {
	pub fn new(config: Config) -> Self {
		Self {
			config,
			receipt_source: None,
			completion_client: None,
			market_sources: None,
		}
	}

	/// Uses the given receipt source instead of the configured RPC endpoint.
	pub fn with_receipt_source(mut self, source: Arc<dyn ReceiptSource>) -> Self {
		self.receipt_source = Some(source);
		self
	}

	/// Uses the given completion backend, enabling consensus regardless of
	/// whether an API key is configured.
	pub fn with_completion_client(mut self, client: Arc<dyn CompletionInterface>) -> Self {
		self.completion_client = Some(client);
		self
	}

	/// Uses the given market sources instead of the configured ones.
	pub fn with_market_sources(mut self, sources: Vec<Arc<dyn PriceSourceInterface>>) -> Self {
		self.market_sources = Some(sources);
		self
	}

	pub fn build(self) -> Result<AnalysisEngine, BuilderError> {
		let config = self.config;

		let receipt_source = match self.receipt_source {
			Some(source) => source,
			None => {
				let source = AlloyReceiptSource::new(&config.payment.rpc_url)
					.map_err(|e| BuilderError::Config(e.to_string()))?;
				tracing::info!(component = "chain", rpc_url = %config.payment.rpc_url, "Loaded");
				Arc::new(source)
			}
		};
		let poller = ReceiptPoller::new(
			receipt_source,
			config.payment.polling.max_attempts,
			Duration::from_millis(config.payment.polling.interval_ms),
		);
		let gate = PaymentGate::from_config(&config.payment, poller)
			.map_err(|e| BuilderError::Config(e.to_string()))?;

		let market = match self.market_sources {
			Some(sources) => MarketDataService::new(sources, config.market.simulation_fallback),
			None => MarketDataService::from_config(&config.market)
				.map_err(|e| BuilderError::Config(e.to_string()))?,
		};

		let consensus = match self.completion_client {
			Some(client) => Some(ConsensusEngine::new(
				client,
				config.consensus.advisors.clone(),
				RoundSettings {
					temperature: config.consensus.round_one_temperature,
					max_tokens: config.consensus.max_tokens,
				},
				RoundSettings {
					temperature: config.consensus.round_two_temperature,
					max_tokens: config.consensus.max_tokens,
				},
			)),
			None => ConsensusEngine::from_config(&config.consensus)
				.map_err(|e| BuilderError::Config(e.to_string()))?,
		};
		match &consensus {
			Some(engine) => tracing::info!(
				component = "consensus",
				advisors = engine.advisors().len(),
				"Loaded"
			),
			None => tracing::warn!(
				component = "consensus",
				"No completion API key configured, consensus disabled"
			),
		}

		Ok(AnalysisEngine::new(
			gate,
			market,
			consensus,
			AuditLog::new(config.audit.capacity),
		))
	}
}
