//! Configuration module for the AgentLink service.
//!
//! This module provides structures and utilities for managing service
//! configuration. It supports loading configuration from TOML files with
//! `${VAR}` / `${VAR:-default}` environment placeholders, and validates the
//! result so that misconfigured payment or panel settings fail at startup
//! rather than on the first paid request.

#[cfg(any(test, feature = "testing"))]
pub mod builders;

use agentlink_types::{parse_address, AdvisorProfile};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Market source names understood by the price crate.
pub const KNOWN_MARKET_SOURCES: [&str; 2] = ["crypto_com", "coingecko"];

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		let message = err.message().to_string();
		ConfigError::Parse(message)
	}
}

/// Main configuration structure for the service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Service identity.
	pub service: ServiceConfig,
	/// HTTP API server settings.
	#[serde(default)]
	pub api: ApiConfig,
	/// Payment gate settings.
	pub payment: PaymentConfig,
	/// Advisor panel and completion API settings.
	#[serde(default)]
	pub consensus: ConsensusConfig,
	/// Market data source settings.
	#[serde(default)]
	pub market: MarketConfig,
	/// Audit log settings.
	#[serde(default)]
	pub audit: AuditConfig,
}

/// Configuration specific to the service instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
	/// Identifier reported in logs and in the `served_by` response field.
	pub id: String,
}

/// Configuration for the HTTP API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Host address to bind the server to.
	#[serde(default = "default_api_host")]
	pub host: String,
	/// Port to bind the server to.
	#[serde(default = "default_api_port")]
	pub port: u16,
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self {
			host: default_api_host(),
			port: default_api_port(),
		}
	}
}

/// Payment gate configuration.
///
/// Describes the single accepted payment: an ERC-20 transfer of at least
/// `amount` minor units of `token_address` to `seller_address`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaymentConfig {
	/// Network label advertised in invoices.
	pub network: String,
	/// JSON-RPC endpoint used to fetch receipts.
	pub rpc_url: String,
	/// Wallet that must receive the payment.
	pub seller_address: String,
	/// ERC-20 contract of the payment token.
	pub token_address: String,
	/// Currency symbol advertised in invoices.
	#[serde(default = "default_currency")]
	pub currency: String,
	/// Minimum payment in minor units, as a decimal string.
	pub amount: String,
	/// Token decimals, used only for display.
	#[serde(default = "default_decimals")]
	pub decimals: u8,
	/// Receipt polling bounds.
	#[serde(default)]
	pub polling: PollingConfig,
}

/// Receipt polling bounds.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PollingConfig {
	/// Number of receipt lookups before giving up.
	#[serde(default = "default_max_attempts")]
	pub max_attempts: u32,
	/// Fixed wait between lookups, in milliseconds.
	#[serde(default = "default_interval_ms")]
	pub interval_ms: u64,
}

impl Default for PollingConfig {
	fn default() -> Self {
		Self {
			max_attempts: default_max_attempts(),
			interval_ms: default_interval_ms(),
		}
	}
}

/// Advisor panel and completion API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConsensusConfig {
	/// OpenAI-compatible chat completion endpoint.
	#[serde(default = "default_completion_url")]
	pub api_url: String,
	/// API key. Consensus is disabled when unset or empty.
	#[serde(default)]
	pub api_key: Option<String>,
	/// Maximum tokens per advisor reply.
	#[serde(default = "default_max_tokens")]
	pub max_tokens: u32,
	/// Sampling temperature for independent analysis.
	#[serde(default = "default_round_one_temperature")]
	pub round_one_temperature: f32,
	/// Sampling temperature for peer review.
	#[serde(default = "default_round_two_temperature")]
	pub round_two_temperature: f32,
	/// Per-call timeout in seconds.
	#[serde(default = "default_completion_timeout")]
	pub timeout_seconds: u64,
	/// Ordered advisor panel.
	#[serde(default = "default_advisors")]
	pub advisors: Vec<AdvisorProfile>,
}

impl ConsensusConfig {
	/// Returns the API key if one is configured and non-empty.
	pub fn api_key(&self) -> Option<&str> {
		self.api_key
			.as_deref()
			.map(str::trim)
			.filter(|key| !key.is_empty())
	}
}

impl Default for ConsensusConfig {
	fn default() -> Self {
		Self {
			api_url: default_completion_url(),
			api_key: None,
			max_tokens: default_max_tokens(),
			round_one_temperature: default_round_one_temperature(),
			round_two_temperature: default_round_two_temperature(),
			timeout_seconds: default_completion_timeout(),
			advisors: default_advisors(),
		}
	}
}

/// Market data source configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MarketConfig {
	/// Sources to try, in order.
	#[serde(default = "default_market_sources")]
	pub sources: Vec<String>,
	/// Per-request timeout in seconds.
	#[serde(default = "default_market_timeout")]
	pub timeout_seconds: u64,
	/// Whether to fall back to simulated data when every source fails.
	#[serde(default = "default_true")]
	pub simulation_fallback: bool,
	/// Base URL of the Crypto.com exchange API.
	#[serde(default = "default_crypto_com_url")]
	pub crypto_com_url: String,
	/// Base URL of the CoinGecko API.
	#[serde(default = "default_coingecko_url")]
	pub coingecko_url: String,
}

impl Default for MarketConfig {
	fn default() -> Self {
		Self {
			sources: default_market_sources(),
			timeout_seconds: default_market_timeout(),
			simulation_fallback: true,
			crypto_com_url: default_crypto_com_url(),
			coingecko_url: default_coingecko_url(),
		}
	}
}

/// Audit log configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuditConfig {
	/// Maximum number of retained entries.
	#[serde(default = "default_audit_capacity")]
	pub capacity: usize,
}

impl Default for AuditConfig {
	fn default() -> Self {
		Self {
			capacity: default_audit_capacity(),
		}
	}
}

fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
	3000
}

fn default_currency() -> String {
	"USDC".to_string()
}

fn default_decimals() -> u8 {
	6
}

fn default_max_attempts() -> u32 {
	5
}

fn default_interval_ms() -> u64 {
	2000
}

fn default_completion_url() -> String {
	"https://api.groq.com/openai/v1/chat/completions".to_string()
}

fn default_max_tokens() -> u32 {
	150
}

fn default_round_one_temperature() -> f32 {
	0.7
}

fn default_round_two_temperature() -> f32 {
	0.8
}

fn default_completion_timeout() -> u64 {
	60
}

/// Returns the default two-member panel.
pub fn default_advisors() -> Vec<AdvisorProfile> {
	vec![
		AdvisorProfile {
			name: "Llama 3.3 70B Strategist".to_string(),
			model: "llama-3.3-70b-versatile".to_string(),
			specialty: "Deep Analysis".to_string(),
			perspective: "long-term".to_string(),
		},
		AdvisorProfile {
			name: "Llama 3.1 8B Tactician".to_string(),
			model: "llama-3.1-8b-instant".to_string(),
			specialty: "Rapid Technical Assessment".to_string(),
			perspective: "short-term".to_string(),
		},
	]
}

fn default_market_sources() -> Vec<String> {
	KNOWN_MARKET_SOURCES.iter().map(|s| s.to_string()).collect()
}

fn default_market_timeout() -> u64 {
	5
}

fn default_true() -> bool {
	true
}

fn default_crypto_com_url() -> String {
	"https://api.crypto.com".to_string()
}

fn default_coingecko_url() -> String {
	"https://api.coingecko.com".to_string()
}

fn default_audit_capacity() -> usize {
	50
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
///
/// Input strings are limited to 1MB to prevent ReDoS attacks.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = input.to_string();
	let mut replacements = Vec::new();

	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name.as_str()) {
			Ok(v) => v,
			Err(_) => match default_value {
				Some(default) => default.to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name.as_str()
					)))
				}
			},
		};

		replacements.push((full_match.start(), full_match.end(), value));
	}

	// Apply replacements in reverse order to maintain positions
	for (start, end, value) in replacements.iter().rev() {
		result.replace_range(start..end, value);
	}

	Ok(result)
}

impl Config {
	/// Loads configuration from a file, resolving environment placeholders.
	pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let content = tokio::fs::read_to_string(path.as_ref()).await?;
		content.parse()
	}

	/// Validates the configuration to ensure all required fields are properly set.
	///
	/// - Service id must be non-empty
	/// - Seller and token addresses must be valid EVM addresses
	/// - Payment amount must be a positive decimal integer
	/// - Polling must make at least one attempt with a sane interval
	/// - The advisor panel must be non-empty with sane temperatures
	/// - Market sources must be known
	/// - Audit capacity must be at least 1
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.service.id.trim().is_empty() {
			return Err(ConfigError::Validation("Service ID cannot be empty".into()));
		}

		self.validate_payment()?;
		self.validate_consensus()?;

		for source in &self.market.sources {
			if !KNOWN_MARKET_SOURCES.contains(&source.as_str()) {
				return Err(ConfigError::Validation(format!(
					"Unknown market source '{}' (expected one of: {})",
					source,
					KNOWN_MARKET_SOURCES.join(", ")
				)));
			}
		}
		if self.market.timeout_seconds == 0 {
			return Err(ConfigError::Validation(
				"market.timeout_seconds must be greater than 0".into(),
			));
		}

		if self.audit.capacity == 0 {
			return Err(ConfigError::Validation(
				"audit.capacity must be at least 1".into(),
			));
		}

		Ok(())
	}

	fn validate_payment(&self) -> Result<(), ConfigError> {
		let payment = &self.payment;

		parse_address(&payment.seller_address)
			.map_err(|e| ConfigError::Validation(format!("payment.seller_address: {}", e)))?;
		parse_address(&payment.token_address)
			.map_err(|e| ConfigError::Validation(format!("payment.token_address: {}", e)))?;

		if payment.rpc_url.trim().is_empty() {
			return Err(ConfigError::Validation(
				"payment.rpc_url cannot be empty".into(),
			));
		}

		let amount = alloy_primitives::U256::from_str_radix(payment.amount.trim(), 10).map_err(
			|e| {
				ConfigError::Validation(format!(
					"payment.amount must be a decimal integer in minor units: {}",
					e
				))
			},
		)?;
		if amount.is_zero() {
			return Err(ConfigError::Validation(
				"payment.amount must be greater than 0".into(),
			));
		}

		if payment.polling.max_attempts == 0 {
			return Err(ConfigError::Validation(
				"payment.polling.max_attempts must be at least 1".into(),
			));
		}
		if payment.polling.interval_ms > 60_000 {
			return Err(ConfigError::Validation(
				"payment.polling.interval_ms cannot exceed 60000".into(),
			));
		}

		Ok(())
	}

	fn validate_consensus(&self) -> Result<(), ConfigError> {
		let consensus = &self.consensus;

		if consensus.advisors.is_empty() {
			return Err(ConfigError::Validation(
				"At least one advisor must be configured".into(),
			));
		}
		for advisor in &consensus.advisors {
			if advisor.name.trim().is_empty() || advisor.model.trim().is_empty() {
				return Err(ConfigError::Validation(
					"Advisors must have a name and a model".into(),
				));
			}
		}

		for (label, value) in [
			("round_one_temperature", consensus.round_one_temperature),
			("round_two_temperature", consensus.round_two_temperature),
		] {
			if !(0.0..=2.0).contains(&value) {
				return Err(ConfigError::Validation(format!(
					"consensus.{} must be between 0 and 2",
					label
				)));
			}
		}

		if consensus.max_tokens == 0 {
			return Err(ConfigError::Validation(
				"consensus.max_tokens must be greater than 0".into(),
			));
		}

		Ok(())
	}
}

/// Parses configuration from a TOML string.
///
/// Environment variables are resolved and the configuration is validated
/// after parsing.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const MINIMAL: &str = r#"
[service]
id = "agentlink-test"

[payment]
network = "cronos-testnet"
rpc_url = "https://evm-t3.cronos.org"
seller_address = "0x5fbdb2315678afecb367f032d93f642f64180aa3"
token_address = "0xc01efAaF7C5C61bEbFAeb358E1161b537b8bC0e0"
amount = "10000"
"#;

	#[test]
	fn test_env_var_resolution() {
		std::env::set_var("AGENTLINK_TEST_HOST", "localhost");
		std::env::set_var("AGENTLINK_TEST_PORT", "8545");

		let input = "url = \"${AGENTLINK_TEST_HOST}:${AGENTLINK_TEST_PORT}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "url = \"localhost:8545\"");

		std::env::remove_var("AGENTLINK_TEST_HOST");
		std::env::remove_var("AGENTLINK_TEST_PORT");
	}

	#[test]
	fn test_env_var_with_default() {
		let input = "value = \"${AGENTLINK_MISSING_VAR:-default_value}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "value = \"default_value\"");
	}

	#[test]
	fn test_missing_env_var_error() {
		let input = "value = \"${AGENTLINK_MISSING_VAR}\"";
		let result = resolve_env_vars(input);
		assert!(result.is_err());
		assert!(result
			.unwrap_err()
			.to_string()
			.contains("AGENTLINK_MISSING_VAR"));
	}

	#[test]
	fn test_minimal_config_uses_defaults() {
		let config: Config = MINIMAL.parse().unwrap();
		assert_eq!(config.service.id, "agentlink-test");
		assert_eq!(config.api.port, 3000);
		assert_eq!(config.api.host, "127.0.0.1");
		// Outbound timeouts are configured per client
		assert_eq!(config.consensus.timeout_seconds, 60);
		assert_eq!(config.market.timeout_seconds, 5);
		assert_eq!(config.payment.currency, "USDC");
		assert_eq!(config.payment.decimals, 6);
		assert_eq!(config.payment.polling.max_attempts, 5);
		assert_eq!(config.payment.polling.interval_ms, 2000);
		assert_eq!(config.consensus.advisors.len(), 2);
		assert_eq!(config.consensus.advisors[0].perspective, "long-term");
		assert_eq!(config.consensus.api_key(), None);
		assert_eq!(config.market.sources, vec!["crypto_com", "coingecko"]);
		assert!(config.market.simulation_fallback);
		assert_eq!(config.audit.capacity, 50);
	}

	#[test]
	fn test_empty_api_key_disables_consensus() {
		let config_str = format!(
			"{}\n[consensus]\napi_key = \"${{AGENTLINK_UNSET_KEY:-}}\"\n",
			MINIMAL
		);
		let config: Config = config_str.parse().unwrap();
		assert_eq!(config.consensus.api_key(), None);
	}

	#[test]
	fn test_custom_panel() {
		let config_str = format!(
			r#"{}
[consensus]
api_key = "secret"
[[consensus.advisors]]
name = "Solo"
model = "some-model"
specialty = "Momentum"
perspective = "short-term"
"#,
			MINIMAL
		);
		let config: Config = config_str.parse().unwrap();
		assert_eq!(config.consensus.api_key(), Some("secret"));
		assert_eq!(config.consensus.advisors.len(), 1);
		assert_eq!(config.consensus.advisors[0].name, "Solo");
	}

	#[test]
	fn test_invalid_seller_rejected() {
		let config_str = MINIMAL.replace(
			"0x5fbdb2315678afecb367f032d93f642f64180aa3",
			"not-an-address",
		);
		let err = Config::from_str(&config_str).unwrap_err();
		assert!(err.to_string().contains("payment.seller_address"));
	}

	#[test]
	fn test_zero_amount_rejected() {
		let config_str = MINIMAL.replace("amount = \"10000\"", "amount = \"0\"");
		let err = Config::from_str(&config_str).unwrap_err();
		assert!(err.to_string().contains("greater than 0"));
	}

	#[test]
	fn test_non_numeric_amount_rejected() {
		let config_str = MINIMAL.replace("amount = \"10000\"", "amount = \"0.01\"");
		assert!(Config::from_str(&config_str).is_err());
	}

	#[test]
	fn test_unknown_market_source_rejected() {
		let config_str = format!("{}\n[market]\nsources = [\"binance\"]\n", MINIMAL);
		let err = Config::from_str(&config_str).unwrap_err();
		assert!(err.to_string().contains("Unknown market source 'binance'"));
	}

	#[test]
	fn test_empty_panel_rejected() {
		let config_str = format!("{}\n[consensus]\nadvisors = []\n", MINIMAL);
		let err = Config::from_str(&config_str).unwrap_err();
		assert!(err.to_string().contains("At least one advisor"));
	}

	#[test]
	fn test_zero_polling_attempts_rejected() {
		let config_str = format!("{}\n[payment.polling]\nmax_attempts = 0\n", MINIMAL);
		let err = Config::from_str(&config_str).unwrap_err();
		assert!(err.to_string().contains("max_attempts"));
	}

	#[tokio::test]
	async fn test_from_file() {
		let temp_dir = tempfile::tempdir().unwrap();
		let path = temp_dir.path().join("config.toml");
		std::fs::write(&path, MINIMAL).unwrap();

		let config = Config::from_file(&path).await.unwrap();
		assert_eq!(config.payment.network, "cronos-testnet");
	}

	#[tokio::test]
	async fn test_from_missing_file() {
		let result = Config::from_file("/nonexistent/agentlink.toml").await;
		assert!(matches!(result, Err(ConfigError::Io(_))));
	}
}
