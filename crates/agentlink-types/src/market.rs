//! Market data snapshot types.

use serde::{Deserialize, Serialize};

/// Point-in-time market statistics for one token, as reported by a price source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketData {
	/// Human-readable label of the source that produced the data.
	pub source: String,
	/// Last price in USD.
	pub price: f64,
	/// 24h high, when the source reports it.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub high: Option<f64>,
	/// 24h low, when the source reports it.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub low: Option<f64>,
	/// 24h traded volume.
	pub volume: f64,
	/// 24h change in percent.
	pub change: f64,
}

impl MarketData {
	/// "up" for a non-negative change, "down" otherwise.
	pub fn trend(&self) -> &'static str {
		if self.change >= 0.0 {
			"up"
		} else {
			"down"
		}
	}
}
