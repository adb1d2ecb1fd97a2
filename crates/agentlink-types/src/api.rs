//! API types for the AgentLink HTTP endpoints.
//!
//! These structures define the JSON bodies returned by the analysis endpoint:
//! the 402 payment invoice, the 403 rejection and the 200 analysis report.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{ConsensusOutcome, MarketData, Signal, Vote};

/// One accepted way of paying for a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentScheme {
	/// Network name, e.g. "cronos-testnet".
	pub network: String,
	/// Currency symbol, e.g. "USDC".
	pub currency: String,
	/// Price in the token's minor units, as a decimal string.
	pub amount: String,
	/// Recipient wallet.
	pub to: String,
	/// Token contract address.
	pub token: String,
}

/// Body of the HTTP 402 response.
///
/// The top-level `pay_to`/`currency`/`amount`/`token` fields repeat the first
/// scheme for clients that do not read `schemes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequiredResponse {
	pub error: String,
	pub schemes: Vec<PaymentScheme>,
	pub pay_to: String,
	pub currency: String,
	pub amount: String,
	pub token: String,
}

impl PaymentRequiredResponse {
	/// Builds an invoice offering a single payment scheme.
	pub fn for_scheme(scheme: PaymentScheme) -> Self {
		Self {
			error: "Payment Required".to_string(),
			pay_to: scheme.to.clone(),
			currency: scheme.currency.clone(),
			amount: scheme.amount.clone(),
			token: scheme.token.clone(),
			schemes: vec![scheme],
		}
	}
}

/// Minimal error body, e.g. `{"error": "Invalid Payment"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
	pub error: String,
}

/// Market statistics section of the analysis report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketStats {
	pub price: f64,
	pub volume: f64,
	pub change: f64,
}

impl From<&MarketData> for MarketStats {
	fn from(data: &MarketData) -> Self {
		Self {
			price: data.price,
			volume: data.volume,
			change: data.change,
		}
	}
}

/// Consensus section of the analysis report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusBlock {
	pub signal: Signal,
	/// Agreement rendered as a percentage, or "N/A" when no consensus ran.
	pub agreement: String,
	/// Average confidence rendered as a percentage.
	pub confidence: String,
	/// Vote counts; empty when no consensus ran.
	pub votes: BTreeMap<Signal, u32>,
	pub rounds: u8,
	/// "adjusted" or "consistent"; absent when no consensus ran.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub evolution: Option<String>,
	pub summary: String,
}

impl ConsensusBlock {
	/// Renders a computed outcome.
	pub fn from_outcome(outcome: &ConsensusOutcome, summary: String) -> Self {
		let votes = Signal::ALL
			.iter()
			.map(|signal| (*signal, outcome.votes.get(*signal)))
			.collect();
		Self {
			signal: outcome.signal,
			agreement: format!("{}%", outcome.agreement),
			confidence: format!("{}%", outcome.rounded_confidence()),
			votes,
			rounds: outcome.rounds,
			evolution: Some(
				if outcome.evolved {
					"adjusted"
				} else {
					"consistent"
				}
				.to_string(),
			),
			summary,
		}
	}

	/// Placeholder verdict used when the panel could not deliberate.
	pub fn degraded(summary: String) -> Self {
		Self {
			signal: Signal::Hold,
			agreement: "N/A".to_string(),
			confidence: "0%".to_string(),
			votes: BTreeMap::new(),
			rounds: 0,
			evolution: None,
			summary,
		}
	}
}

/// Per-round vote listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysesByRound {
	pub round_1: Vec<Vote>,
	pub round_2: Vec<Vote>,
}

/// Body of a successful analysis response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
	pub success: bool,
	pub token: String,
	/// Label of the market data source.
	pub source: String,
	pub market_stats: MarketStats,
	pub ai_consensus: ConsensusBlock,
	pub analyses_by_round: AnalysesByRound,
	pub served_by: String,
	/// RFC 3339 timestamp of response assembly.
	pub timestamp: String,
}
