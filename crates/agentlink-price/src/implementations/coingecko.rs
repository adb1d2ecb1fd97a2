//! CoinGecko simple-price source.

use crate::{http_client, PriceError, PriceSourceInterface};
use agentlink_types::MarketData;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

pub const SOURCE_LABEL: &str = "CoinGecko API";

/// Maps a ticker symbol to its CoinGecko coin id.
///
/// Unknown symbols are tried as their lowercase form.
pub fn coin_id(symbol: &str) -> String {
	match symbol {
		"BTC" => "bitcoin",
		"ETH" => "ethereum",
		"CRO" => "crypto-com-chain",
		"PEPE" => "pepe",
		"SOL" => "solana",
		"BNB" => "binancecoin",
		"ADA" => "cardano",
		"DOT" => "polkadot",
		"MATIC" => "matic-network",
		other => return other.to_lowercase(),
	}
	.to_string()
}

#[derive(Debug, Deserialize)]
struct Quote {
	usd: f64,
	#[serde(default)]
	usd_24h_vol: Option<f64>,
	#[serde(default)]
	usd_24h_change: Option<f64>,
}

pub struct CoinGeckoSource {
	client: reqwest::Client,
	base_url: String,
}

impl CoinGeckoSource {
	pub fn new(base_url: &str, timeout: Duration) -> Result<Self, PriceError> {
		Ok(Self {
			client: http_client(timeout)?,
			base_url: base_url.trim_end_matches('/').to_string(),
		})
	}
}

fn into_market_data(
	symbol: &str,
	id: &str,
	mut quotes: HashMap<String, Quote>,
) -> Result<MarketData, PriceError> {
	let quote = quotes
		.remove(id)
		.ok_or_else(|| PriceError::TokenNotSupported(symbol.to_string()))?;

	Ok(MarketData {
		source: SOURCE_LABEL.to_string(),
		price: quote.usd,
		high: None,
		low: None,
		volume: quote.usd_24h_vol.unwrap_or(0.0),
		change: quote.usd_24h_change.unwrap_or(0.0),
	})
}

#[async_trait]
impl PriceSourceInterface for CoinGeckoSource {
	fn name(&self) -> &str {
		"coingecko"
	}

	async fn fetch(&self, symbol: &str) -> Result<MarketData, PriceError> {
		let id = coin_id(symbol);
		let response = self
			.client
			.get(format!("{}/api/v3/simple/price", self.base_url))
			.query(&[
				("ids", id.as_str()),
				("vs_currencies", "usd"),
				("include_24hr_vol", "true"),
				("include_24hr_change", "true"),
			])
			.send()
			.await
			.map_err(|e| PriceError::Network(format!("CoinGecko request failed: {}", e)))?;

		if !response.status().is_success() {
			return Err(PriceError::Network(format!(
				"CoinGecko returned {}",
				response.status()
			)));
		}

		let quotes: HashMap<String, Quote> = response
			.json()
			.await
			.map_err(|e| PriceError::InvalidResponse(format!("CoinGecko: {}", e)))?;

		into_market_data(symbol, &id, quotes)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_coin_id_table() {
		assert_eq!(coin_id("CRO"), "crypto-com-chain");
		assert_eq!(coin_id("MATIC"), "matic-network");
		assert_eq!(coin_id("DOGE"), "doge");
	}

	#[test]
	fn test_quote_parsing() {
		let quotes: HashMap<String, Quote> = serde_json::from_str(
			r#"{"crypto-com-chain":{"usd":0.0842,"usd_24h_vol":12345678.9,"usd_24h_change":-2.5}}"#,
		)
		.unwrap();
		let data = into_market_data("CRO", "crypto-com-chain", quotes).unwrap();
		assert_eq!(data.source, "CoinGecko API");
		assert_eq!(data.price, 0.0842);
		assert_eq!(data.volume, 12345678.9);
		assert_eq!(data.change, -2.5);
	}

	#[test]
	fn test_unknown_coin_is_unsupported() {
		let quotes: HashMap<String, Quote> = serde_json::from_str("{}").unwrap();
		assert!(matches!(
			into_market_data("ZZZ", "zzz", quotes),
			Err(PriceError::TokenNotSupported(_))
		));
	}
}
