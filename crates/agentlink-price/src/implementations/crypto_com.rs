//! Crypto.com Exchange ticker source.
//!
//! Queries the public `get-ticker` endpoint for the `{SYMBOL}_USDT` pair.

use crate::{http_client, lenient_f64, PriceError, PriceSourceInterface};
use agentlink_types::MarketData;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

pub const SOURCE_LABEL: &str = "Crypto.com Exchange API";

#[derive(Deserialize)]
struct TickerResponse {
	result: Option<TickerResult>,
}

#[derive(Deserialize)]
struct TickerResult {
	#[serde(default)]
	data: Vec<Ticker>,
}

/// Ticker fields use the exchange's one-letter names. Values arrive as
/// strings or numbers depending on API version.
#[derive(Deserialize)]
struct Ticker {
	/// Last traded price.
	#[serde(default)]
	a: serde_json::Value,
	#[serde(default)]
	h: serde_json::Value,
	#[serde(default)]
	l: serde_json::Value,
	#[serde(default)]
	v: serde_json::Value,
	#[serde(default)]
	c: serde_json::Value,
}

pub struct CryptoComSource {
	client: reqwest::Client,
	base_url: String,
}

impl CryptoComSource {
	pub fn new(base_url: &str, timeout: Duration) -> Result<Self, PriceError> {
		Ok(Self {
			client: http_client(timeout)?,
			base_url: base_url.trim_end_matches('/').to_string(),
		})
	}

	fn ticker_url(&self) -> String {
		format!("{}/v2/public/get-ticker", self.base_url)
	}
}

fn into_market_data(symbol: &str, response: TickerResponse) -> Result<MarketData, PriceError> {
	let ticker = response
		.result
		.and_then(|result| result.data.into_iter().next())
		.ok_or_else(|| PriceError::TokenNotSupported(symbol.to_string()))?;

	let price = lenient_f64(&ticker.a)
		.ok_or_else(|| PriceError::InvalidResponse(format!("Missing price for {}", symbol)))?;

	Ok(MarketData {
		source: SOURCE_LABEL.to_string(),
		price,
		high: lenient_f64(&ticker.h),
		low: lenient_f64(&ticker.l),
		volume: lenient_f64(&ticker.v).unwrap_or(0.0),
		change: lenient_f64(&ticker.c).unwrap_or(0.0),
	})
}

#[async_trait]
impl PriceSourceInterface for CryptoComSource {
	fn name(&self) -> &str {
		"crypto_com"
	}

	async fn fetch(&self, symbol: &str) -> Result<MarketData, PriceError> {
		let pair = format!("{}_USDT", symbol);
		let response = self
			.client
			.get(self.ticker_url())
			.query(&[("instrument_name", pair.as_str())])
			.send()
			.await
			.map_err(|e| PriceError::Network(format!("Crypto.com request failed: {}", e)))?;

		if !response.status().is_success() {
			return Err(PriceError::Network(format!(
				"Crypto.com returned {}",
				response.status()
			)));
		}

		let body: TickerResponse = response
			.json()
			.await
			.map_err(|e| PriceError::InvalidResponse(format!("Crypto.com: {}", e)))?;

		into_market_data(symbol, body)
	}
}
