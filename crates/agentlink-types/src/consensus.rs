//! Advisor, vote and consensus types.
//!
//! Votes are produced once per advisor per deliberation round and never
//! mutated. The consensus outcome is derived from the round-2 votes only.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::market::MarketData;

/// Trading signal an advisor can vote for.
///
/// Declaration order is the tie-break order used by the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
	Buy,
	Sell,
	Hold,
}

impl Signal {
	/// All signals in enumeration (tie-break) order.
	pub const ALL: [Signal; 3] = [Signal::Buy, Signal::Sell, Signal::Hold];

	pub fn as_str(&self) -> &'static str {
		match self {
			Signal::Buy => "BUY",
			Signal::Sell => "SELL",
			Signal::Hold => "HOLD",
		}
	}
}

impl fmt::Display for Signal {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Signal {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_uppercase().as_str() {
			"BUY" => Ok(Signal::Buy),
			"SELL" => Ok(Signal::Sell),
			"HOLD" => Ok(Signal::Hold),
			other => Err(format!("Unknown signal: {}", other)),
		}
	}
}

/// Static description of one advisor on the panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisorProfile {
	/// Display name, used as the advisor identity in votes.
	pub name: String,
	/// Model identifier passed to the completion API.
	pub model: String,
	/// Analytical specialty shown in the prompt.
	pub specialty: String,
	/// Time horizon, e.g. "long-term" or "short-term".
	pub perspective: String,
}

/// Whether a vote was read from the reply or filled in with defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteOrigin {
	/// The reply carried a recognizable `SIGNAL:` field.
	Parsed,
	/// The reply could not be parsed; signal and confidence are defaults.
	Defaulted,
}

/// One advisor's vote for one deliberation round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
	/// Round number, 1 or 2.
	pub round: u8,
	/// Advisor name.
	#[serde(rename = "model")]
	pub advisor: String,
	/// Advisor perspective label.
	pub perspective: String,
	pub signal: Signal,
	/// Confidence in percent, 0..=100.
	pub confidence: u8,
	pub reason: String,
	pub origin: VoteOrigin,
}

impl Vote {
	/// Whether this vote contributes its signal to the tally.
	pub fn carries_signal(&self) -> bool {
		self.origin == VoteOrigin::Parsed
	}
}

/// Per-signal counters, used both for vote counts and weighted scores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalTally {
	#[serde(rename = "BUY")]
	pub buy: u32,
	#[serde(rename = "SELL")]
	pub sell: u32,
	#[serde(rename = "HOLD")]
	pub hold: u32,
}

impl SignalTally {
	pub fn get(&self, signal: Signal) -> u32 {
		match signal {
			Signal::Buy => self.buy,
			Signal::Sell => self.sell,
			Signal::Hold => self.hold,
		}
	}

	pub fn add(&mut self, signal: Signal, amount: u32) {
		match signal {
			Signal::Buy => self.buy += amount,
			Signal::Sell => self.sell += amount,
			Signal::Hold => self.hold += amount,
		}
	}

	pub fn total(&self) -> u32 {
		self.buy + self.sell + self.hold
	}
}

/// Result of aggregating a two-round deliberation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusOutcome {
	/// Winning signal.
	pub signal: Signal,
	/// Share of round-2 votes backing the winner, in percent.
	pub agreement: u32,
	/// Mean round-2 confidence.
	pub average_confidence: f64,
	/// Round-2 vote counts per signal.
	pub votes: SignalTally,
	/// Round-2 confidence sums per signal.
	pub weighted_scores: SignalTally,
	/// Number of deliberation rounds run.
	pub rounds: u8,
	/// Whether any advisor changed its signal between rounds.
	pub evolved: bool,
}

impl ConsensusOutcome {
	/// Mean confidence rounded half up to a whole percent.
	pub fn rounded_confidence(&self) -> u32 {
		self.average_confidence.round() as u32
	}

	/// Renders the natural-language verdict for a token.
	pub fn summary(&self, token: &str, market: &MarketData) -> String {
		let emoji = match self.signal {
			Signal::Buy => "🚀",
			Signal::Sell => "📉",
			Signal::Hold => "⏸️",
		};
		let shift = if self.evolved {
			"Positions were refined through peer review."
		} else {
			"Analysis remained consistent."
		};
		format!(
			"{} {} - After {} rounds of deliberation, our AI council reached {}% consensus on {} at ${} ({} {:.2}%). Final confidence: {}%. {}",
			emoji,
			self.signal,
			self.rounds,
			self.agreement,
			token,
			market.price,
			market.trend(),
			market.change.abs(),
			self.rounded_confidence(),
			shift
		)
	}
}
