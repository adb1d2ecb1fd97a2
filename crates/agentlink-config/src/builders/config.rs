//! Configuration builder for creating test and development configurations.
//!
//! This module provides utilities for constructing Config instances with
//! sensible defaults, particularly useful for testing scenarios.

use crate::{
	ApiConfig, AuditConfig, Config, ConsensusConfig, MarketConfig, PaymentConfig, PollingConfig,
	ServiceConfig,
};
use agentlink_types::AdvisorProfile;

/// Builder for creating `Config` instances with a fluent API.
///
/// Defaults describe a local test deployment: no completion API key, a
/// single-attempt poller with no wait, and simulated market data only.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
	service_id: String,
	seller_address: String,
	token_address: String,
	amount: String,
	max_attempts: u32,
	interval_ms: u64,
	api_key: Option<String>,
	advisors: Vec<AdvisorProfile>,
	market_sources: Vec<String>,
	audit_capacity: usize,
}

impl Default for ConfigBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigBuilder {
	/// Creates a new `ConfigBuilder` with default values suitable for testing.
	pub fn new() -> Self {
		Self {
			service_id: "agentlink-test".to_string(),
			seller_address: "0x5fbdb2315678afecb367f032d93f642f64180aa3".to_string(),
			token_address: "0xc01efaaf7c5c61bebfaeb358e1161b537b8bc0e0".to_string(),
			amount: "10000".to_string(),
			max_attempts: 1,
			interval_ms: 0,
			api_key: None,
			advisors: crate::default_advisors(),
			market_sources: Vec::new(),
			audit_capacity: 50,
		}
	}

	/// Sets the service ID.
	pub fn service_id(mut self, id: &str) -> Self {
		self.service_id = id.to_string();
		self
	}

	/// Sets the seller wallet.
	pub fn seller_address(mut self, address: &str) -> Self {
		self.seller_address = address.to_string();
		self
	}

	/// Sets the payment token contract.
	pub fn token_address(mut self, address: &str) -> Self {
		self.token_address = address.to_string();
		self
	}

	/// Sets the price in minor units.
	pub fn amount(mut self, amount: &str) -> Self {
		self.amount = amount.to_string();
		self
	}

	/// Sets the receipt polling bounds.
	pub fn polling(mut self, max_attempts: u32, interval_ms: u64) -> Self {
		self.max_attempts = max_attempts;
		self.interval_ms = interval_ms;
		self
	}

	/// Sets the completion API key.
	pub fn api_key(mut self, key: Option<&str>) -> Self {
		self.api_key = key.map(str::to_string);
		self
	}

	/// Replaces the advisor panel.
	pub fn advisors(mut self, advisors: Vec<AdvisorProfile>) -> Self {
		self.advisors = advisors;
		self
	}

	/// Sets the market sources to try.
	pub fn market_sources(mut self, sources: Vec<String>) -> Self {
		self.market_sources = sources;
		self
	}

	/// Sets the audit log capacity.
	pub fn audit_capacity(mut self, capacity: usize) -> Self {
		self.audit_capacity = capacity;
		self
	}

	/// Builds the `Config` with the configured values.
	pub fn build(self) -> Config {
		Config {
			service: ServiceConfig {
				id: self.service_id,
			},
			api: ApiConfig::default(),
			payment: PaymentConfig {
				network: "cronos-testnet".to_string(),
				rpc_url: "http://localhost:8545".to_string(),
				seller_address: self.seller_address,
				token_address: self.token_address,
				currency: "USDC".to_string(),
				amount: self.amount,
				decimals: 6,
				polling: PollingConfig {
					max_attempts: self.max_attempts,
					interval_ms: self.interval_ms,
				},
			},
			consensus: ConsensusConfig {
				api_key: self.api_key,
				advisors: self.advisors,
				..ConsensusConfig::default()
			},
			market: MarketConfig {
				sources: self.market_sources,
				..MarketConfig::default()
			},
			audit: AuditConfig {
				capacity: self.audit_capacity,
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_builder_output_validates() {
		let config = ConfigBuilder::new().build();
		assert!(config.validate().is_ok());
		assert_eq!(config.payment.polling.max_attempts, 1);
		assert!(config.market.sources.is_empty());
	}

	#[test]
	fn test_builder_overrides() {
		let config = ConfigBuilder::new()
			.service_id("custom")
			.amount("5")
			.api_key(Some("key"))
			.audit_capacity(3)
			.build();
		assert_eq!(config.service.id, "custom");
		assert_eq!(config.payment.amount, "5");
		assert_eq!(config.consensus.api_key(), Some("key"));
		assert_eq!(config.audit.capacity, 3);
	}
}
